//! The state that owns a navigation stack.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use super::builder::NavigationFlowBuilder;
use super::feature::NavigationFeature;
use super::info::NavigatorInfo;
use super::manager::{NavigationManager, SharedManager};
use super::registry::Destinations;
use super::types::ViewBuilder;
use crate::mvi::{BusinessState, Channels, NavigatableState, NavigationChannels};
use crate::view_model::AnyViewModel;

/// Maps raw navigator events from the flow's screens to the flow's own event.
pub type FlowEventHandler = Rc<dyn Fn(Rc<dyn Any>) -> Option<Rc<dyn Any>>>;

/// A navigator's state: destination registry, merged view builder, and the
/// (possibly shared) stack.
pub struct NavigationFlow {
    id: String,
    channels: Channels<Self>,
    navigation: NavigationChannels<Self>,
    destinations: Destinations,
    view_builder: ViewBuilder,
    event_handler: Option<FlowEventHandler>,
    root_info: Option<NavigatorInfo>,
    manager: Option<SharedManager>,
}

impl fmt::Debug for NavigationFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationFlow")
            .field("id", &self.id)
            .field("destinations", &self.destinations)
            .field("root", &self.root_info)
            .field("mounted", &self.manager.is_some())
            .finish()
    }
}

impl NavigationFlow {
    /// Create a flow. `NavigationFlow` itself is appended to the registry so
    /// nested flows can always be routed to.
    pub fn new(mut destinations: Destinations, view_builder: ViewBuilder, event_handler: Option<FlowEventHandler>) -> Self {
        destinations.register::<NavigationFlow>("NavigationFlow");
        Self {
            id: Uuid::new_v4().to_string(),
            channels: Channels::default(),
            navigation: NavigationChannels::default(),
            destinations,
            view_builder,
            event_handler,
            root_info: None,
            manager: None,
        }
    }

    pub fn builder() -> NavigationFlowBuilder {
        NavigationFlowBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    pub fn view_builder(&self) -> &ViewBuilder {
        &self.view_builder
    }

    pub fn root_info(&self) -> Option<&NavigatorInfo> {
        self.root_info.as_ref()
    }

    pub fn manager(&self) -> Option<&SharedManager> {
        self.manager.as_ref()
    }

    /// Record the root and create a stack unless one was already adopted.
    pub(crate) fn set_up(&mut self, root: AnyViewModel) {
        let root = NavigatorInfo::new(root);
        self.root_info = Some(root.clone());
        if self.manager.is_none() {
            self.manager = Some(Rc::new(RefCell::new(NavigationManager::new(
                root,
                self.id.clone(),
                Rc::clone(&self.view_builder),
            ))));
        }
    }

    /// Share an outer navigator's stack (pushed nested flows).
    pub(crate) fn adopt(&mut self, manager: SharedManager) {
        self.manager = Some(manager);
    }

    pub(crate) fn handle_sub_event(&self, event: Rc<dyn Any>) -> Option<Rc<dyn Any>> {
        self.event_handler.as_ref().and_then(|handler| handler(event))
    }
}

impl BusinessState for NavigationFlow {
    type Reducer = NavigationFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }

    fn stable_id(&self) -> Option<String> {
        Some(self.id.clone())
    }
}

impl NavigatableState for NavigationFlow {
    type NavigatorEvent = ();

    fn navigation(&self) -> &NavigationChannels<Self> {
        &self.navigation
    }
}
