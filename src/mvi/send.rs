//! The callback an effect uses to feed actions back into its view model.

use std::fmt;
use std::rc::Rc;

/// Delivers actions (and dismiss requests) back to the owning view model.
///
/// Cloneable and cheap. Once the view model is gone every call is a no-op.
pub struct Sender<A> {
    deliver: Rc<dyn Fn(A)>,
    dismiss: Rc<dyn Fn()>,
}

impl<A> Clone for Sender<A> {
    fn clone(&self) -> Self {
        Self {
            deliver: Rc::clone(&self.deliver),
            dismiss: Rc::clone(&self.dismiss),
        }
    }
}

impl<A> fmt::Debug for Sender<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sender")
    }
}

impl<A: 'static> Sender<A> {
    pub fn new(deliver: impl Fn(A) + 'static, dismiss: impl Fn() + 'static) -> Self {
        Self {
            deliver: Rc::new(deliver),
            dismiss: Rc::new(dismiss),
        }
    }

    /// Feed one action back. The reducer runs before this returns.
    pub fn send(&self, action: A) {
        (self.deliver)(action);
    }

    /// Ask the owner to forward a dismiss request through its state.
    pub fn dismiss(&self) {
        (self.dismiss)();
    }
}
