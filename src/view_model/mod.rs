//! View models: the sole owners of one state and one reducer.
//!
//! A [`ViewModel`] runs its reducer, executes the returned [`Procedure`]s on
//! local tasks, and derives child view models from slices of its state (see
//! the `scope` family of methods). Children are owned by the parent's cache and
//! released explicitly, either when a scope call finds the slot empty or when a
//! navigator reports that a presented child left the stack.

mod effects;
mod erased;
mod scope;

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::config;
use crate::mvi::{ActionOf, BusinessState, CommandOf, Lens, Procedure, Reducer, StateRef, Subscription};
use crate::runtime;

pub use erased::AnyViewModel;
pub use scope::{EventMapper, ViewModelList};
pub(crate) use scope::{cache_key, Wiring};

pub(crate) struct Inner<S: BusinessState> {
    id: RefCell<String>,
    state: RefCell<StateRef<S>>,
    reducer: Rc<S::Reducer>,
    effects: RefCell<HashMap<Uuid, AbortHandle>>,
    children: RefCell<HashMap<String, Box<dyn Any>>>,
    subscriptions: RefCell<HashMap<String, Vec<Subscription>>>,
}

impl<S: BusinessState> Drop for Inner<S> {
    fn drop(&mut self) {
        for (_, handle) in self.effects.get_mut().drain() {
            handle.abort();
        }
        if config::diagnostics().log_lifecycle {
            tracing::debug!(
                state = type_name::<S>(),
                id = %self.id.get_mut(),
                "ViewModel released"
            );
        }
    }
}

/// Owner of one state instance.
///
/// Cloning produces another handle to the same view model; equality is
/// handle identity.
pub struct ViewModel<S: BusinessState> {
    inner: Rc<Inner<S>>,
}

impl<S: BusinessState> Clone for ViewModel<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: BusinessState> PartialEq for ViewModel<S> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<S: BusinessState> Eq for ViewModel<S> {}

impl<S: BusinessState> fmt::Debug for ViewModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("state", &type_name::<S>())
            .field("id", &*self.inner.id.borrow())
            .finish()
    }
}

/// Non-owning handle used by subscriptions and cleanup closures.
pub(crate) struct WeakViewModel<S: BusinessState> {
    inner: Weak<Inner<S>>,
}

impl<S: BusinessState> Clone for WeakViewModel<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: BusinessState> WeakViewModel<S> {
    pub(crate) fn upgrade(&self) -> Option<ViewModel<S>> {
        self.inner.upgrade().map(|inner| ViewModel { inner })
    }
}

impl<S: BusinessState> ViewModel<S> {
    /// Create a root view model owning `state`.
    pub fn new(state: S, reducer: S::Reducer) -> Self {
        Self::from_parts(StateRef::new(state), Rc::new(reducer))
    }

    pub fn from_parts(state: StateRef<S>, reducer: Rc<S::Reducer>) -> Self {
        let id = Uuid::new_v4().to_string();
        if config::diagnostics().log_lifecycle {
            tracing::debug!(state = type_name::<S>(), id = %id, "ViewModel created");
        }
        Self {
            inner: Rc::new(Inner {
                id: RefCell::new(id),
                state: RefCell::new(state),
                reducer,
                effects: RefCell::new(HashMap::new()),
                children: RefCell::new(HashMap::new()),
                subscriptions: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Display identity. Regenerated whenever the backing state is replaced.
    pub fn id(&self) -> String {
        self.inner.id.borrow().clone()
    }

    pub fn state(&self) -> StateRef<S> {
        self.inner.state.borrow().clone()
    }

    pub fn reducer(&self) -> Rc<S::Reducer> {
        Rc::clone(&self.inner.reducer)
    }

    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read the state. Channel emissions made inside `f` are delivered after
    /// the borrow is released.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        runtime::transaction(|| {
            let state = self.state();
            let result = f(&state.borrow());
            result
        })
    }

    /// Mutate the state directly, outside the reducer.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        runtime::transaction(|| {
            let state = self.state();
            let result = f(&mut state.borrow_mut());
            result
        })
    }

    pub fn get<C: Clone>(&self, lens: &Lens<S, C>) -> C {
        self.with_state(|state| lens.get(state).clone())
    }

    pub fn set<C>(&self, lens: &Lens<S, C>, value: C) {
        self.update(|state| *lens.get_mut(state) = value);
    }

    /// Run the reducer for `action`, then execute its procedure.
    ///
    /// # Panics
    ///
    /// A procedure that needs a task is spawned with `spawn_local`, which
    /// panics when called inside a tokio runtime but outside a `LocalSet`.
    /// With no runtime at all the effect is dropped with a warning.
    pub fn send(&self, action: ActionOf<S>) {
        runtime::transaction(|| {
            let state = self.state();
            let procedure = self.inner.reducer.reduce(&mut state.borrow_mut(), action);
            self.execute(procedure);
        });
    }

    /// Run the reducer's command handler for `command`. Effects follow the
    /// same rules as [`ViewModel::send`].
    pub fn dispatch(&self, command: CommandOf<S>) {
        runtime::transaction(|| {
            let state = self.state();
            let procedure = self
                .inner
                .reducer
                .reduce_command(&mut state.borrow_mut(), command);
            self.execute(procedure);
        });
    }

    fn execute(&self, procedure: Procedure<ActionOf<S>>) {
        if procedure.is_none() {
            return;
        }
        if procedure.is_dismiss() {
            self.with_state(|state| state.request_dismiss());
            return;
        }
        self.spawn_effect(procedure);
    }

    pub fn erase(&self) -> AnyViewModel {
        AnyViewModel::new(self.clone())
    }

    pub(crate) fn downgrade(&self) -> WeakViewModel<S> {
        WeakViewModel {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Number of child view models and collections currently cached.
    pub fn cached_child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Point this view model at `state`. Returns whether the identity changed.
    fn replace_state(&self, state: StateRef<S>) -> bool {
        if self.inner.state.borrow().ptr_eq(&state) {
            return false;
        }
        *self.inner.state.borrow_mut() = state;
        *self.inner.id.borrow_mut() = Uuid::new_v4().to_string();
        true
    }

    fn cached<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.inner
            .children
            .borrow()
            .get(key)
            .and_then(|entry| entry.downcast_ref::<T>())
            .cloned()
    }

    fn cache<T: 'static>(&self, key: &str, value: T) {
        let previous = self
            .inner
            .children
            .borrow_mut()
            .insert(key.to_string(), Box::new(value));
        drop(previous);
    }

    /// Drop the cached child under `key` together with its subscriptions.
    pub(crate) fn forget_child(&self, key: &str) {
        let child = self.inner.children.borrow_mut().remove(key);
        let subscriptions = self.inner.subscriptions.borrow_mut().remove(key);
        if child.is_some() {
            tracing::trace!(parent = type_name::<S>(), key, "Released cached child");
        }
        drop(subscriptions);
        drop(child);
    }

    pub(crate) fn replace_subscriptions(&self, key: String, subscriptions: Vec<Subscription>) {
        let previous = self
            .inner
            .subscriptions
            .borrow_mut()
            .insert(key, subscriptions);
        drop(previous);
    }

    pub(crate) fn drop_subscriptions(&self, key: &str) {
        let previous = self.inner.subscriptions.borrow_mut().remove(key);
        drop(previous);
    }
}
