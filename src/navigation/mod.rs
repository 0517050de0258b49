//! Stack-of-stacks navigation with type-erased routing.
//!
//! Screens announce routes on their own channels; the [`Navigator`] they are
//! bound to matches each route against its [`Destinations`] registry, scopes
//! the destination into the requesting screen's slot, and pushes or presents
//! it on the shared [`NavigationManager`].

pub(crate) mod builder;
pub(crate) mod feature;
pub(crate) mod flow;
pub(crate) mod info;
pub(crate) mod manager;
pub(crate) mod registry;
pub(crate) mod route;
pub(crate) mod router;
pub(crate) mod types;

pub use builder::{NavigationFlowBuilder, Screen, ViewDescriptor};
pub use feature::{NavigationAction, NavigationFeature};
pub use flow::{FlowEventHandler, NavigationFlow};
pub use info::NavigatorInfo;
pub use manager::{NavigationManager, SharedManager, StackSnapshot};
pub use registry::{Destination, Destinations};
pub use route::{ErasedRoute, FlowRoute, ScreenRoute};
pub use router::Navigator;
pub use types::{AlertState, Rendered, RouteStyle, ViewBuilder};
