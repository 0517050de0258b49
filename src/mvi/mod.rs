//! Model-View-Intent primitives.
//!
//! ```text
//! Action ──→ Reducer ──→ State (mutated in place) ──→ View
//!    ↑           │
//!    │           └──→ Procedure ──→ effect task
//!    └───────────────────────────────────┘
//! ```
//!
//! - **State**: an identity-bearing record that owns its broadcast channels
//! - **Reducer**: mutates state and describes follow-up work as a [`Procedure`]
//! - **Channels**: how children talk to parents and navigators

mod channel;
mod identified;
mod lens;
mod procedure;
mod reducer;
mod send;
mod state;

pub use channel::{Channel, Subscription};
pub use identified::{Identified, IdentifiedVec};
pub use lens::Lens;
pub use procedure::{Procedure, RunOp};
pub use reducer::{ActionOf, CommandOf, EventOf, Reducer};
pub use send::Sender;
pub use state::{
    BusinessState, Channels, DismissRouter, DismissType, NavigatableState, NavigationChannels,
    Request, StateRef,
};
