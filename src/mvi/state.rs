//! State contracts and the channels every state owns.

use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use super::channel::Channel;
use super::lens::Lens;
use super::reducer::{CommandOf, EventOf, Reducer};
use crate::navigation::route::{ErasedRoute, ScreenRoute};
use crate::navigation::RouteStyle;

/// Identity-bearing handle to a state instance.
///
/// Two handles are "the same state" only when they point at the same
/// allocation; the value inside is mutated in place.
pub struct StateRef<S>(Rc<RefCell<S>>);

impl<S> StateRef<S> {
    pub fn new(state: S) -> Self {
        Self(Rc::new(RefCell::new(state)))
    }

    pub fn borrow(&self) -> Ref<'_, S> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.0.borrow_mut()
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, S>, BorrowMutError> {
        self.0.try_borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared allocation. Stable for the instance's lifetime.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<S> Clone for StateRef<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> fmt::Debug for StateRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRef<{}>({:#x})", std::any::type_name::<S>(), self.addr())
    }
}

/// Dismiss intents a state can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissType {
    Dismiss,
    Pop,
    PopToRoot,
    DismissSheet,
    DismissFullCover,
}

/// A dismiss request as it travels upward.
///
/// `Any` is resolved by the nearest navigator: sheet, then full-screen cover,
/// then the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissRouter {
    Direct(DismissType),
    Any,
}

/// Messages a state publishes on its request channel.
#[derive(Debug, Clone)]
pub enum Request<E, C> {
    Event(E),
    Command(C),
}

/// Broadcast channels owned by one state instance.
pub struct Channels<S: BusinessState> {
    requests: Channel<Request<EventOf<S>, CommandOf<S>>>,
    dismiss: Channel<DismissRouter>,
}

impl<S: BusinessState> Default for Channels<S> {
    fn default() -> Self {
        Self {
            requests: Channel::named("requests"),
            dismiss: Channel::named("dismiss"),
        }
    }
}

impl<S: BusinessState> fmt::Debug for Channels<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channels")
            .field("requests", &self.requests)
            .field("dismiss", &self.dismiss)
            .finish()
    }
}

impl<S: BusinessState> Channels<S> {
    pub fn requests(&self) -> &Channel<Request<EventOf<S>, CommandOf<S>>> {
        &self.requests
    }

    pub fn dismiss(&self) -> &Channel<DismissRouter> {
        &self.dismiss
    }
}

/// A state hosted by a view model.
///
/// Implementors declare a `Channels<Self>` field, constructed with the state,
/// and return it from [`BusinessState::channels`].
pub trait BusinessState: Sized + 'static {
    type Reducer: Reducer<State = Self>;

    fn channels(&self) -> &Channels<Self>;

    /// Stable identity used when this state is shown in a navigation stack.
    fn stable_id(&self) -> Option<String> {
        None
    }

    /// Bubble a business event to the parent.
    fn fire_event(&self, event: EventOf<Self>) {
        self.channels().requests.send(Request::Event(event));
    }

    /// Ask this state's own reducer to handle `command`.
    fn send_command(&self, command: CommandOf<Self>) {
        self.channels().requests.send(Request::Command(command));
    }

    /// Ambiguous dismiss, resolved by the nearest navigator.
    fn request_dismiss(&self) {
        self.channels().dismiss.send(DismissRouter::Any);
    }

    fn dismiss(&self, kind: DismissType) {
        self.channels().dismiss.send(DismissRouter::Direct(kind));
    }
}

/// Route and navigator-event channels of a [`NavigatableState`].
pub struct NavigationChannels<S: NavigatableState> {
    route: Channel<ErasedRoute<S>>,
    navigator_events: Channel<S::NavigatorEvent>,
}

impl<S: NavigatableState> Default for NavigationChannels<S> {
    fn default() -> Self {
        Self {
            route: Channel::named("route"),
            navigator_events: Channel::named("navigator_events"),
        }
    }
}

impl<S: NavigatableState> fmt::Debug for NavigationChannels<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationChannels")
            .field("route", &self.route)
            .field("navigator_events", &self.navigator_events)
            .finish()
    }
}

impl<S: NavigatableState> NavigationChannels<S> {
    pub fn route(&self) -> &Channel<ErasedRoute<S>> {
        &self.route
    }

    pub fn navigator_events(&self) -> &Channel<S::NavigatorEvent> {
        &self.navigator_events
    }
}

/// A state that can ask its navigator to present destinations.
pub trait NavigatableState: BusinessState {
    /// Raw events for composite navigation flows. Use `()` when unused.
    type NavigatorEvent: Clone + 'static;

    fn navigation(&self) -> &NavigationChannels<Self>;

    /// Announce a route without knowing who will handle it.
    fn route(&self, route: impl Into<ErasedRoute<Self>>) {
        self.navigation().route.send(route.into());
    }

    /// Route into `slot` with no event mapping.
    fn route_to<C>(&self, slot: Lens<Self, Option<StateRef<C>>>, reducer: C::Reducer, style: RouteStyle)
    where
        C: NavigatableState,
    {
        self.route(ScreenRoute::new(slot, reducer, style));
    }

    fn fire_navigator_event(&self, event: Self::NavigatorEvent) {
        self.navigation().navigator_events.send(event);
    }

    fn pop(&self) {
        self.dismiss(DismissType::Pop);
    }

    fn pop_to_root(&self) {
        self.dismiss(DismissType::PopToRoot);
    }

    fn dismiss_sheet(&self) {
        self.dismiss(DismissType::DismissSheet);
    }

    fn dismiss_full_cover(&self) {
        self.dismiss(DismissType::DismissFullCover);
    }
}
