//! Navigator wiring: binding screens to their navigator, resolving routes,
//! and the entry points the rendering layer calls.

use std::any::{type_name, TypeId};
use std::rc::Rc;

use super::feature::{NavigationAction, NavigationFeature};
use super::flow::NavigationFlow;
use super::info::NavigatorInfo;
use super::manager::{resolve_view, SharedManager, StackSnapshot};
use super::route::ErasedRoute;
use super::types::{Rendered, RouteStyle};
use crate::error::RouteError;
use crate::mvi::{DismissRouter, DismissType, Lens, NavigatableState, StateRef, Subscription};
use crate::runtime;
use crate::view_model::{cache_key, EventMapper, ViewModel, Wiring};

/// A view model hosting a [`NavigationFlow`].
pub type Navigator = ViewModel<NavigationFlow>;

const ROOT_KEY: &str = "Root";

/// Router subscriptions follow the view model, not its id, so a rebound
/// screen replaces its wiring instead of doubling it.
fn router_key(addr: usize) -> String {
    format!("router:{addr:#x}")
}

impl ViewModel<NavigationFlow> {
    /// Create a navigator for `flow` and bind `root_state` as its root screen.
    pub fn mount<R: NavigatableState>(
        flow: NavigationFlow,
        root_state: StateRef<R>,
        root_reducer: R::Reducer,
    ) -> (Navigator, ViewModel<R>) {
        let navigator = ViewModel::new(flow, NavigationFeature);
        let root = navigator.bind_root_view(root_state, Rc::new(root_reducer));
        (navigator, root)
    }

    /// Bind the root screen. The root talks only to the navigator, so no event
    /// mapping is installed.
    pub fn bind_root_view<R: NavigatableState>(&self, state: StateRef<R>, reducer: Rc<R::Reducer>) -> ViewModel<R> {
        let root = self.scope_keyed(ROOT_KEY, state, None, reducer, Wiring::ROUTED);
        self.bind_router(&root);
        self.update(|flow| flow.set_up(root.erase()));
        root
    }

    /// Subscribe to a screen's navigator events, routes and dismiss requests.
    fn bind_router<C: NavigatableState>(&self, screen: &ViewModel<C>) {
        if TypeId::of::<C>() == TypeId::of::<NavigationFlow>() {
            return;
        }

        let state = screen.state();
        let state = state.borrow();

        let navigator = self.downgrade();
        let events = state.navigation().navigator_events().subscribe(move |event| {
            if let Some(navigator) = navigator.upgrade() {
                navigator.send(NavigationAction::SubEvent(Rc::new(event)));
            }
        });

        let navigator = self.downgrade();
        let source = screen.downgrade();
        let routes = state.navigation().route().subscribe(move |route| {
            if let (Some(navigator), Some(source)) = (navigator.upgrade(), source.upgrade()) {
                navigator.handle_present(&source, route);
            }
        });

        let navigator = self.downgrade();
        let dismiss = state.channels().dismiss().subscribe(move |request| {
            if let Some(navigator) = navigator.upgrade() {
                navigator.resolve_dismiss(request);
            }
        });

        drop(state);
        tracing::debug!(
            screen = type_name::<C>(),
            navigator = %self.id(),
            "Bound screen to navigator"
        );
        self.replace_subscriptions(router_key(screen.addr()), vec![events, routes, dismiss]);
    }

    fn handle_present<P: NavigatableState>(&self, source: &ViewModel<P>, route: ErasedRoute<P>) {
        let destination = self.with_state(|flow| {
            flow.destinations()
                .match_route(route.target())
                .map(|destination| destination.label())
        });
        let Some(label) = destination else {
            tracing::warn!(error = %route.unregistered(), "Dropping route");
            return;
        };

        tracing::debug!(destination = label, slot = route.slot(), style = ?route.style(), "Route matched");
        let presentation = match route.materialize(self, source) {
            Ok(presentation) => presentation,
            Err(error) => {
                tracing::warn!(%error, "Dropping route");
                return;
            }
        };

        let view_model = presentation.view_model;
        self.send(match presentation.style {
            RouteStyle::Push => NavigationAction::Push(view_model),
            RouteStyle::Sheet => NavigationAction::PresentSheet(view_model),
            RouteStyle::FullScreenCover => NavigationAction::PresentFullScreenCover(view_model),
        });
    }

    /// Scope a routed child into `source`'s slot and register its cleanup.
    pub(crate) fn navigator_scope<P, C>(
        &self,
        source: &ViewModel<P>,
        slot: Lens<P, Option<StateRef<C>>>,
        mapper: Option<EventMapper<C, P>>,
        reducer: Rc<C::Reducer>,
    ) -> Result<ViewModel<C>, RouteError>
    where
        P: NavigatableState,
        C: NavigatableState,
    {
        let manager = self.manager().ok_or(RouteError::NotMounted)?;
        let state = source
            .with_state(|parent| slot.get(parent).clone())
            .ok_or(RouteError::EmptySlot { slot: slot.name() })?;

        let key = cache_key::<C::Reducer>(slot.name());
        let child = source.scope_keyed(&key, state, mapper, reducer, Wiring::ROUTED);
        self.bind_router(&child);

        // A slot routed twice leaves one view model behind several entries.
        // Only the departure of the last of them releases it.
        let source = source.downgrade();
        let navigator = self.downgrade();
        let child_addr = child.addr();
        let subscriptions_key = router_key(child_addr);
        let child_id = child.id();
        manager.borrow_mut().register_cleanup(child_id.clone(), move || {
            let navigator = navigator.upgrade();
            if let Some(manager) = navigator.as_ref().and_then(|navigator| navigator.manager()) {
                let presented = manager.borrow().presents_elsewhere(child_addr, &child_id);
                if presented {
                    tracing::debug!(slot = slot.name(), "Child still presented; keeping it");
                    return;
                }
            }
            if let Some(source) = source.upgrade() {
                source.update(|parent| *slot.get_mut(parent) = None);
                source.forget_child(&key);
            }
            if let Some(navigator) = navigator {
                navigator.drop_subscriptions(&subscriptions_key);
            }
        });

        Ok(child)
    }

    /// Move the cleanup registered for `from` so it runs when `to` departs.
    pub(crate) fn rekey_cleanup(&self, from: &str, to: String) -> Result<(), RouteError> {
        let manager = self.manager().ok_or(RouteError::NotMounted)?;
        manager.borrow_mut().rekey_cleanup(from, to);
        Ok(())
    }

    /// When the presented flow's root asks to be dismissed, close the slot it
    /// is presented in.
    pub(crate) fn close_with(&self, flow: &Navigator, style: RouteStyle) -> Result<(), RouteError> {
        let nested = flow.manager().ok_or(RouteError::NotMounted)?;
        let navigator = self.downgrade();
        let subscription = nested.borrow().on_dismiss(move || {
            if let Some(navigator) = navigator.upgrade() {
                navigator.send(match style {
                    RouteStyle::FullScreenCover => NavigationAction::DismissFullScreenCover,
                    _ => NavigationAction::DismissSheet,
                });
            }
        });
        self.replace_subscriptions(router_key(flow.addr()), vec![subscription]);
        Ok(())
    }

    fn resolve_dismiss(&self, request: DismissRouter) {
        let action = match request {
            DismissRouter::Direct(DismissType::Dismiss) => NavigationAction::Dismiss,
            DismissRouter::Direct(DismissType::Pop) => NavigationAction::Pop,
            DismissRouter::Direct(DismissType::PopToRoot) => NavigationAction::PopToRoot,
            DismissRouter::Direct(DismissType::DismissSheet) => NavigationAction::DismissSheet,
            DismissRouter::Direct(DismissType::DismissFullCover) => NavigationAction::DismissFullScreenCover,
            DismissRouter::Any => {
                let Some(manager) = self.manager() else {
                    return;
                };
                let manager = manager.borrow();
                if manager.sheet().is_some() {
                    NavigationAction::DismissSheet
                } else if manager.full_screen_cover().is_some() {
                    NavigationAction::DismissFullScreenCover
                } else if manager.can_pop() {
                    NavigationAction::Pop
                } else {
                    NavigationAction::Dismiss
                }
            }
        };
        self.send(action);
    }

    /// The stack this navigator drives, once mounted.
    pub fn manager(&self) -> Option<SharedManager> {
        self.with_state(|flow| flow.manager().cloned())
    }

    /// Report ids that left the rendered stack. Each id's cleanup runs once.
    pub fn handle_view_popper<I, T>(&self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let Some(manager) = self.manager() else {
            return;
        };
        runtime::transaction(|| manager.borrow_mut().run_cleanups(ids));
    }

    /// Apply a flattened path changed by the user (for example a swipe back).
    pub fn set_path(&self, path: Vec<NavigatorInfo>) {
        let Some(manager) = self.manager() else {
            return;
        };
        runtime::transaction(|| manager.borrow_mut().set_path(path));
    }

    pub fn set_sheet(&self, sheet: Option<NavigatorInfo>) {
        let Some(manager) = self.manager() else {
            return;
        };
        runtime::transaction(|| manager.borrow_mut().set_sheet(sheet));
    }

    pub fn set_full_screen_cover(&self, cover: Option<NavigatorInfo>) {
        let Some(manager) = self.manager() else {
            return;
        };
        runtime::transaction(|| manager.borrow_mut().set_full_screen_cover(cover));
    }

    pub fn path(&self) -> Vec<NavigatorInfo> {
        let Some(manager) = self.manager() else {
            return Vec::new();
        };
        let path = manager.borrow().path().to_vec();
        path
    }

    pub fn sheet(&self) -> Option<NavigatorInfo> {
        let manager = self.manager()?;
        let sheet = manager.borrow().sheet().cloned();
        sheet
    }

    pub fn full_screen_cover(&self) -> Option<NavigatorInfo> {
        let manager = self.manager()?;
        let cover = manager.borrow().full_screen_cover().cloned();
        cover
    }

    /// Resolve an entry to a node. Nested flows render with their own navigator.
    pub fn build_view(&self, info: &NavigatorInfo) -> Rendered {
        if let Some(nested) = info.view_model().downcast::<NavigationFlow>() {
            return Rendered::Navigator(nested);
        }
        let Some(manager) = self.manager() else {
            return Rendered::Empty;
        };
        let builders = manager.borrow().view_builders();
        resolve_view(&builders, info)
    }

    /// Called when the root segment is dismissed; the host closes this surface.
    pub fn on_dismiss(&self, f: impl Fn() + 'static) -> Option<Subscription> {
        let manager = self.manager()?;
        let subscription = manager.borrow().on_dismiss(f);
        Some(subscription)
    }

    pub fn snapshot(&self) -> Option<StackSnapshot> {
        let manager = self.manager()?;
        let snapshot = manager.borrow().snapshot();
        Some(snapshot)
    }
}
