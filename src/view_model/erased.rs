//! Type-erased view model handles.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::rc::Rc;

use super::ViewModel;
use crate::mvi::BusinessState;

trait ErasedViewModel {
    fn id(&self) -> String;
    fn state_type_id(&self) -> TypeId;
    fn state_type_name(&self) -> &'static str;
    fn addr(&self) -> usize;
    fn stable_id(&self) -> Option<String>;
    fn as_any(&self) -> &dyn Any;
}

impl<S: BusinessState> ErasedViewModel for ViewModel<S> {
    fn id(&self) -> String {
        ViewModel::id(self)
    }

    fn state_type_id(&self) -> TypeId {
        TypeId::of::<S>()
    }

    fn state_type_name(&self) -> &'static str {
        type_name::<S>()
    }

    fn addr(&self) -> usize {
        ViewModel::addr(self)
    }

    fn stable_id(&self) -> Option<String> {
        self.with_state(|state| state.stable_id())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A view model of any state type.
///
/// This is what navigation stacks and view builders traffic in; recover the
/// concrete handle with [`AnyViewModel::downcast`].
#[derive(Clone)]
pub struct AnyViewModel(Rc<dyn ErasedViewModel>);

impl AnyViewModel {
    pub(crate) fn new<S: BusinessState>(view_model: ViewModel<S>) -> Self {
        Self(Rc::new(view_model))
    }

    pub fn id(&self) -> String {
        self.0.id()
    }

    pub fn state_type_id(&self) -> TypeId {
        self.0.state_type_id()
    }

    pub fn state_type_name(&self) -> &'static str {
        self.0.state_type_name()
    }

    /// Address of the underlying view model; identical for every handle to it.
    pub fn addr(&self) -> usize {
        self.0.addr()
    }

    pub fn stable_id(&self) -> Option<String> {
        self.0.stable_id()
    }

    pub fn is<S: BusinessState>(&self) -> bool {
        self.state_type_id() == TypeId::of::<S>()
    }

    pub fn downcast<S: BusinessState>(&self) -> Option<ViewModel<S>> {
        self.0.as_any().downcast_ref::<ViewModel<S>>().cloned()
    }
}

impl fmt::Debug for AnyViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyViewModel")
            .field("state", &self.state_type_name())
            .field("id", &self.id())
            .finish()
    }
}
