//! The scoping engine.
//!
//! Child view models are cached per parent under a string key: the lens name
//! plus the child reducer's type for field slices, the state address for
//! value-identity scopes, and `"{key}#{id:?}"` for collection members. A hit
//! with the same state instance returns the cached handle untouched; a hit
//! with a different instance rebinds the child in place, gives it a fresh id,
//! and replaces its subscriptions.

use std::any::{type_name, TypeId};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use super::ViewModel;
use crate::mvi::{
    ActionOf, BusinessState, CommandOf, EventOf, Identified, IdentifiedVec, Lens, Request, StateRef,
};

/// Maps a child's business event to an optional parent action.
pub type EventMapper<C, P> = Rc<dyn Fn(EventOf<C>) -> Option<ActionOf<P>>>;

/// How a child is connected to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wiring {
    forward_dismiss: bool,
}

impl Wiring {
    /// Plain decomposition: dismiss requests bubble through the parent.
    pub(crate) const SCOPED: Wiring = Wiring {
        forward_dismiss: true,
    };
    /// Presented by a navigator, which listens to the child's dismiss channel itself.
    pub(crate) const ROUTED: Wiring = Wiring {
        forward_dismiss: false,
    };
}

pub(crate) fn cache_key<R>(name: &str) -> String {
    format!("{}_{}", name, type_name::<R>())
}

fn is_unit<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<()>()
}

/// Child view models scoped from an [`IdentifiedVec`].
///
/// The container itself is cached: as long as membership (by id, in order) is
/// unchanged, repeated scoping returns the same allocation.
pub struct ViewModelList<C: BusinessState>(Rc<[ViewModel<C>]>);

impl<C: BusinessState> Clone for ViewModelList<C> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C: BusinessState> Deref for ViewModelList<C> {
    type Target = [ViewModel<C>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C: BusinessState> fmt::Debug for ViewModelList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<C: BusinessState> ViewModelList<C> {
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

struct CachedList<C: BusinessState + Identified> {
    ids: Vec<C::Id>,
    list: ViewModelList<C>,
}

impl<C: BusinessState + Identified> Clone for CachedList<C> {
    fn clone(&self) -> Self {
        Self {
            ids: self.ids.clone(),
            list: self.list.clone(),
        }
    }
}

impl<P: BusinessState> ViewModel<P> {
    /// Scope a child from a field holding its state.
    pub fn scope<C: BusinessState>(&self, lens: Lens<P, StateRef<C>>, reducer: C::Reducer) -> ViewModel<C> {
        let key = cache_key::<C::Reducer>(lens.name());
        let state = self.with_state(|parent| lens.get(parent).clone());
        self.scope_keyed(&key, state, None, Rc::new(reducer), Wiring::SCOPED)
    }

    /// Like [`ViewModel::scope`], mapping the child's events to parent actions.
    pub fn scope_with<C, F>(&self, lens: Lens<P, StateRef<C>>, mapper: F, reducer: C::Reducer) -> ViewModel<C>
    where
        C: BusinessState,
        F: Fn(EventOf<C>) -> Option<ActionOf<P>> + 'static,
    {
        let key = cache_key::<C::Reducer>(lens.name());
        let state = self.with_state(|parent| lens.get(parent).clone());
        self.scope_keyed(&key, state, Some(Rc::new(mapper)), Rc::new(reducer), Wiring::SCOPED)
    }

    /// Scope an optional slot. Returns `None`, and releases any cached child,
    /// while the slot is empty.
    pub fn scope_optional<C: BusinessState>(
        &self,
        lens: Lens<P, Option<StateRef<C>>>,
        reducer: C::Reducer,
    ) -> Option<ViewModel<C>> {
        self.scope_optional_keyed(lens, None, reducer)
    }

    pub fn scope_optional_with<C, F>(
        &self,
        lens: Lens<P, Option<StateRef<C>>>,
        mapper: F,
        reducer: C::Reducer,
    ) -> Option<ViewModel<C>>
    where
        C: BusinessState,
        F: Fn(EventOf<C>) -> Option<ActionOf<P>> + 'static,
    {
        self.scope_optional_keyed(lens, Some(Rc::new(mapper)), reducer)
    }

    fn scope_optional_keyed<C: BusinessState>(
        &self,
        lens: Lens<P, Option<StateRef<C>>>,
        mapper: Option<EventMapper<C, P>>,
        reducer: C::Reducer,
    ) -> Option<ViewModel<C>> {
        let key = cache_key::<C::Reducer>(lens.name());
        let Some(state) = self.with_state(|parent| lens.get(parent).clone()) else {
            self.forget_child(&key);
            return None;
        };
        Some(self.scope_keyed(&key, state, mapper, Rc::new(reducer), Wiring::SCOPED))
    }

    /// Scope a state instance that is not reachable through a lens. The
    /// instance's address is the cache key.
    pub fn scope_state<C, F>(&self, state: StateRef<C>, mapper: F, reducer: C::Reducer) -> ViewModel<C>
    where
        C: BusinessState,
        F: Fn(EventOf<C>) -> Option<ActionOf<P>> + 'static,
    {
        let key = format!("{:#x}", state.addr());
        self.scope_keyed(&key, state, Some(Rc::new(mapper)), Rc::new(reducer), Wiring::SCOPED)
    }

    /// Scope every element of an identified collection.
    pub fn scope_each<C>(&self, lens: Lens<P, IdentifiedVec<C>>, reducer: C::Reducer) -> ViewModelList<C>
    where
        C: BusinessState + Identified,
    {
        self.scope_each_keyed(lens, None, Rc::new(reducer))
    }

    pub fn scope_each_with<C, F>(
        &self,
        lens: Lens<P, IdentifiedVec<C>>,
        mapper: F,
        reducer: C::Reducer,
    ) -> ViewModelList<C>
    where
        C: BusinessState + Identified,
        F: Fn(EventOf<C>) -> Option<ActionOf<P>> + 'static,
    {
        self.scope_each_keyed(lens, Some(Rc::new(mapper)), Rc::new(reducer))
    }

    fn scope_each_keyed<C>(
        &self,
        lens: Lens<P, IdentifiedVec<C>>,
        mapper: Option<EventMapper<C, P>>,
        reducer: Rc<C::Reducer>,
    ) -> ViewModelList<C>
    where
        C: BusinessState + Identified,
    {
        let key = cache_key::<C::Reducer>(lens.name());
        let items: Vec<StateRef<C>> = self.with_state(|parent| lens.get(parent).iter().cloned().collect());
        let ids: Vec<C::Id> = items.iter().map(|item| item.borrow().id()).collect();

        let members: Vec<ViewModel<C>> = items
            .into_iter()
            .zip(&ids)
            .map(|(state, id)| {
                self.scope_keyed(
                    &format!("{key}#{id:?}"),
                    state,
                    mapper.clone(),
                    Rc::clone(&reducer),
                    Wiring::SCOPED,
                )
            })
            .collect();

        if let Some(previous) = self.cached::<CachedList<C>>(&key) {
            if previous.ids == ids {
                tracing::trace!(key, "Collection membership unchanged");
                return previous.list;
            }
            for removed in previous.ids.iter().filter(|id| !ids.contains(id)) {
                self.forget_child(&format!("{key}#{removed:?}"));
            }
        }

        let list = ViewModelList(members.into());
        self.cache(
            &key,
            CachedList {
                ids,
                list: list.clone(),
            },
        );
        list
    }

    /// Return the child cached under `key`, creating or rebinding it as needed.
    pub(crate) fn scope_keyed<C: BusinessState>(
        &self,
        key: &str,
        state: StateRef<C>,
        mapper: Option<EventMapper<C, P>>,
        reducer: Rc<C::Reducer>,
        wiring: Wiring,
    ) -> ViewModel<C> {
        if let Some(child) = self.cached::<ViewModel<C>>(key) {
            if child.replace_state(state) {
                tracing::debug!(key, child = type_name::<C>(), "Scoped state replaced, rewiring");
                self.wire_child(key, &child, mapper, wiring);
            } else {
                tracing::trace!(key, "Scope cache hit");
            }
            return child;
        }

        let child = ViewModel::from_parts(state, reducer);
        self.wire_child(key, &child, mapper, wiring);
        self.cache(key, child.clone());
        tracing::debug!(key, parent = type_name::<P>(), child = type_name::<C>(), "Scoped new child");
        child
    }

    fn wire_child<C: BusinessState>(
        &self,
        key: &str,
        child: &ViewModel<C>,
        mapper: Option<EventMapper<C, P>>,
        wiring: Wiring,
    ) {
        let mut subscriptions = Vec::new();
        let state = child.state();
        let state = state.borrow();

        if !is_unit::<EventOf<C>>() || !is_unit::<CommandOf<C>>() {
            let parent = self.downgrade();
            let target = child.downgrade();
            subscriptions.push(state.channels().requests().subscribe(move |request| match request {
                Request::Event(event) => {
                    let (Some(parent), Some(mapper)) = (parent.upgrade(), mapper.as_ref()) else {
                        return;
                    };
                    if let Some(action) = mapper(event) {
                        parent.send(action);
                    }
                }
                Request::Command(command) => {
                    if let Some(child) = target.upgrade() {
                        child.dispatch(command);
                    }
                }
            }));
        }

        if wiring.forward_dismiss {
            let parent = self.downgrade();
            subscriptions.push(state.channels().dismiss().subscribe(move |request| {
                if let Some(parent) = parent.upgrade() {
                    parent.with_state(|state| state.channels().dismiss().send(request));
                }
            }));
        }

        drop(state);
        self.replace_subscriptions(key.to_string(), subscriptions);
    }
}
