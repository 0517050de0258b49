//! Unidirectional state management and stack-of-stacks navigation.
//!
//! - [`mvi`]: states, reducers, procedures and channels
//! - [`view_model`]: view models and the scoping engine
//! - [`navigation`]: navigators, routes and destination registries
//!
//! Everything runs on the current thread. Effects are spawned with
//! `tokio::task::spawn_local`, so view models that return effects must be
//! driven from inside a `tokio::task::LocalSet`.

pub mod config;
pub mod error;
pub mod logging;
pub mod mvi;
pub mod navigation;
mod runtime;
pub mod view_model;

pub use error::{Cancelled, RouteError};
pub use mvi::{
    BusinessState, Channels, DismissType, Identified, IdentifiedVec, Lens, NavigatableState,
    NavigationChannels, Procedure, Reducer, Sender, StateRef,
};
pub use navigation::{
    FlowRoute, NavigationFeature, NavigationFlow, Navigator, NavigatorInfo, RouteStyle, ScreenRoute,
};
pub use view_model::{AnyViewModel, ViewModel, ViewModelList};
