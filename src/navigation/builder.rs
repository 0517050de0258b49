//! Declarative registration of destination views.
//!
//! ```ignore
//! let flow = NavigationFlow::builder()
//!     .view::<HomeScreen>()
//!     .view::<DetailScreen>()
//!     .on_event(|done: &SettingsDone| Some(FlowOutput::Closed))
//!     .build();
//! ```
//!
//! Registration order is the matching order, for routes and for views.

use std::any::{type_name, Any, TypeId};
use std::rc::Rc;

use super::flow::{FlowEventHandler, NavigationFlow};
use super::registry::{Destination, Destinations};
use super::types::{Rendered, ViewBuilder};
use crate::mvi::NavigatableState;
use crate::view_model::{AnyViewModel, ViewModel};

/// A view type constructed from a view model of one state type.
pub trait Screen: 'static {
    type State: NavigatableState;

    fn make(view_model: ViewModel<Self::State>) -> Self;
}

/// One `(view, destination state)` registration.
#[derive(Clone)]
pub struct ViewDescriptor {
    destination: Destination,
    build: ViewBuilder,
}

impl std::fmt::Debug for ViewDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewDescriptor")
            .field("destination", &self.destination)
            .finish()
    }
}

impl ViewDescriptor {
    pub fn of<V: Screen>() -> Self {
        Self::new::<V::State, V>(type_name::<V>(), V::make)
    }

    /// Register a closure that renders view models of state `S`.
    pub fn new<S, T>(label: &'static str, make: impl Fn(ViewModel<S>) -> T + 'static) -> Self
    where
        S: NavigatableState,
        T: 'static,
    {
        Self {
            destination: Destination::of::<S>(label),
            build: Rc::new(move |view_model: &AnyViewModel| {
                view_model
                    .downcast::<S>()
                    .map(|view_model| Rendered::Node(Box::new(make(view_model))))
            }),
        }
    }

    pub fn state_type(&self) -> TypeId {
        self.destination.state_type()
    }
}

#[derive(Default)]
pub struct NavigationFlowBuilder {
    descriptors: Vec<ViewDescriptor>,
    event_handler: Option<FlowEventHandler>,
}

impl NavigationFlowBuilder {
    pub fn view<V: Screen>(self) -> Self {
        self.descriptor(ViewDescriptor::of::<V>())
    }

    pub fn descriptor(mut self, descriptor: ViewDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Map navigator events of type `E` to the flow's output event `O`.
    /// Handlers registered earlier get the first chance.
    pub fn on_event<E, O>(mut self, handler: impl Fn(&E) -> Option<O> + 'static) -> Self
    where
        E: 'static,
        O: 'static,
    {
        let typed: FlowEventHandler = Rc::new(move |event: Rc<dyn Any>| {
            event
                .downcast_ref::<E>()
                .and_then(&handler)
                .map(|output| Rc::new(output) as Rc<dyn Any>)
        });
        let combined: FlowEventHandler = match self.event_handler.take() {
            Some(previous) => Rc::new(move |event: Rc<dyn Any>| {
                previous(Rc::clone(&event)).or_else(|| typed(event))
            }),
            None => typed,
        };
        self.event_handler = Some(combined);
        self
    }

    pub fn build(self) -> NavigationFlow {
        let mut destinations = Destinations::new();
        let mut builders = Vec::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            destinations.push(descriptor.destination);
            builders.push(descriptor.build);
        }

        let view_builder: ViewBuilder = Rc::new(move |view_model: &AnyViewModel| {
            builders.iter().find_map(|build| build(view_model))
        });
        NavigationFlow::new(destinations, view_builder, self.event_handler)
    }
}
