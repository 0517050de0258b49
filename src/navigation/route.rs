//! Type-erased route requests.
//!
//! A state announces "present this optional slot of mine" by sending an
//! [`ErasedRoute`] on its route channel. The route remembers the concrete
//! destination type as a `TypeId`; the navigator matches it against its
//! registry and, on a hit, lets the route materialize its own child since
//! only the route still knows the concrete `(parent, child)` pair.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::rc::Rc;

use super::feature::NavigationFeature;
use super::flow::NavigationFlow;
use super::router::Navigator;
use super::types::RouteStyle;
use crate::error::RouteError;
use crate::mvi::{ActionOf, EventOf, Lens, NavigatableState, StateRef};
use crate::view_model::{AnyViewModel, EventMapper, ViewModel};

/// A materialized destination, ready to be pushed or presented.
pub(crate) struct Presentation {
    pub(crate) view_model: AnyViewModel,
    pub(crate) style: RouteStyle,
}

pub(crate) trait RoutePayload<P: NavigatableState> {
    fn as_any(&self) -> &dyn Any;

    fn materialize(&self, navigator: &Navigator, source: &ViewModel<P>) -> Result<Presentation, RouteError>;
}

/// A route request with its concrete types erased.
pub struct ErasedRoute<P: NavigatableState> {
    target: TypeId,
    target_name: &'static str,
    slot: &'static str,
    style: RouteStyle,
    payload: Rc<dyn RoutePayload<P>>,
}

impl<P: NavigatableState> Clone for ErasedRoute<P> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            target_name: self.target_name,
            slot: self.slot,
            style: self.style,
            payload: Rc::clone(&self.payload),
        }
    }
}

impl<P: NavigatableState> fmt::Debug for ErasedRoute<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedRoute")
            .field("target", &self.target_name)
            .field("slot", &self.slot)
            .field("style", &self.style)
            .finish()
    }
}

impl<P: NavigatableState> ErasedRoute<P> {
    /// State type the registry must contain for this route to resolve.
    pub fn target(&self) -> TypeId {
        self.target
    }

    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    pub fn slot(&self) -> &'static str {
        self.slot
    }

    pub fn style(&self) -> RouteStyle {
        self.style
    }

    /// Recover the concrete screen route, if `C` is its destination type.
    pub fn typed<C: NavigatableState>(&self) -> Option<&ScreenRoute<P, C>> {
        self.payload.as_any().downcast_ref::<ScreenRoute<P, C>>()
    }

    /// Recover the concrete flow route, if `R` is its nested root type.
    pub fn flow_typed<R: NavigatableState>(&self) -> Option<&FlowRoute<P, R>> {
        self.payload.as_any().downcast_ref::<FlowRoute<P, R>>()
    }

    pub(crate) fn unregistered(&self) -> RouteError {
        RouteError::Unregistered {
            target: self.target_name,
            slot: self.slot,
        }
    }

    pub(crate) fn materialize(&self, navigator: &Navigator, source: &ViewModel<P>) -> Result<Presentation, RouteError> {
        self.payload.materialize(navigator, source)
    }
}

/// Route into an optional slot holding a screen state.
pub struct ScreenRoute<P: NavigatableState, C: NavigatableState> {
    slot: Lens<P, Option<StateRef<C>>>,
    mapper: Option<EventMapper<C, P>>,
    reducer: Rc<C::Reducer>,
    style: RouteStyle,
}

impl<P: NavigatableState, C: NavigatableState> ScreenRoute<P, C> {
    pub fn new(slot: Lens<P, Option<StateRef<C>>>, reducer: C::Reducer, style: RouteStyle) -> Self {
        Self {
            slot,
            mapper: None,
            reducer: Rc::new(reducer),
            style,
        }
    }

    /// Map the destination's events to actions of the routing state.
    pub fn on_event(mut self, mapper: impl Fn(EventOf<C>) -> Option<ActionOf<P>> + 'static) -> Self {
        self.mapper = Some(Rc::new(mapper));
        self
    }

    pub fn slot(&self) -> &Lens<P, Option<StateRef<C>>> {
        &self.slot
    }

    pub fn style(&self) -> RouteStyle {
        self.style
    }
}

impl<P: NavigatableState, C: NavigatableState> RoutePayload<P> for ScreenRoute<P, C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn materialize(&self, navigator: &Navigator, source: &ViewModel<P>) -> Result<Presentation, RouteError> {
        let child = navigator.navigator_scope(source, self.slot, self.mapper.clone(), Rc::clone(&self.reducer))?;
        Ok(Presentation {
            view_model: child.erase(),
            style: self.style,
        })
    }
}

impl<P: NavigatableState, C: NavigatableState> From<ScreenRoute<P, C>> for ErasedRoute<P> {
    fn from(route: ScreenRoute<P, C>) -> Self {
        Self {
            target: TypeId::of::<C>(),
            target_name: type_name::<C>(),
            slot: route.slot.name(),
            style: route.style,
            payload: Rc::new(route),
        }
    }
}

/// Route into an optional slot holding a nested [`NavigationFlow`] whose root
/// is `R`.
pub struct FlowRoute<P: NavigatableState, R: NavigatableState> {
    slot: Lens<P, Option<StateRef<NavigationFlow>>>,
    mapper: Option<EventMapper<NavigationFlow, P>>,
    root_state: StateRef<R>,
    root_reducer: Rc<R::Reducer>,
    style: RouteStyle,
}

impl<P: NavigatableState, R: NavigatableState> FlowRoute<P, R> {
    pub fn new(
        slot: Lens<P, Option<StateRef<NavigationFlow>>>,
        root_state: StateRef<R>,
        root_reducer: R::Reducer,
        style: RouteStyle,
    ) -> Self {
        Self {
            slot,
            mapper: None,
            root_state,
            root_reducer: Rc::new(root_reducer),
            style,
        }
    }

    /// Map the flow's raw events to actions of the routing state.
    pub fn on_event(mut self, mapper: impl Fn(Rc<dyn Any>) -> Option<ActionOf<P>> + 'static) -> Self {
        self.mapper = Some(Rc::new(mapper));
        self
    }

    /// Map flow events of type `O` (as produced by the flow's event handler).
    pub fn on_output<O: 'static>(self, mapper: impl Fn(&O) -> Option<ActionOf<P>> + 'static) -> Self {
        self.on_event(move |event| event.downcast_ref::<O>().and_then(&mapper))
    }

    pub fn root_state(&self) -> &StateRef<R> {
        &self.root_state
    }

    pub fn style(&self) -> RouteStyle {
        self.style
    }
}

impl<P: NavigatableState, R: NavigatableState> RoutePayload<P> for FlowRoute<P, R> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn materialize(&self, navigator: &Navigator, source: &ViewModel<P>) -> Result<Presentation, RouteError> {
        let flow_state = source
            .with_state(|state| self.slot.get(state).clone())
            .ok_or(RouteError::EmptySlot {
                slot: self.slot.name(),
            })?;
        if !flow_state.borrow().destinations().contains(TypeId::of::<R>()) {
            return Err(RouteError::Unregistered {
                target: type_name::<R>(),
                slot: self.slot.name(),
            });
        }

        let flow = navigator.navigator_scope(
            source,
            self.slot,
            self.mapper.clone(),
            Rc::new(NavigationFeature),
        )?;
        let root = flow.bind_root_view(self.root_state.clone(), Rc::clone(&self.root_reducer));

        match self.style {
            RouteStyle::Push => navigator.rekey_cleanup(&flow.id(), root.id())?,
            RouteStyle::Sheet | RouteStyle::FullScreenCover => navigator.close_with(&flow, self.style)?,
        }

        Ok(Presentation {
            view_model: flow.erase(),
            style: self.style,
        })
    }
}

impl<P: NavigatableState, R: NavigatableState> From<FlowRoute<P, R>> for ErasedRoute<P> {
    fn from(route: FlowRoute<P, R>) -> Self {
        Self {
            target: TypeId::of::<NavigationFlow>(),
            target_name: type_name::<NavigationFlow>(),
            slot: route.slot.name(),
            style: route.style,
            payload: Rc::new(route),
        }
    }
}
