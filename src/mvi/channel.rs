//! Per-state broadcast channels.
//!
//! A channel is owned by the state record that declares it. Emissions are
//! delivered through the runtime queue, so a reducer that fires an event only
//! reaches subscribers after its own transaction has closed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config;
use crate::runtime;

type Subscriber<T> = Rc<dyn Fn(T)>;

struct Inner<T> {
    label: &'static str,
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(u64, Subscriber<T>)>>,
}

/// Broadcast channel. Cloning yields another handle to the same channel.
pub struct Channel<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::named("channel")
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("label", &self.inner.label)
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Channel<T> {
    /// Create a channel with a label used in diagnostics.
    pub fn named(label: &'static str) -> Self {
        Self {
            inner: Rc::new(Inner {
                label,
                next_id: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a subscriber. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, subscriber: impl Fn(T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
            }
        })
    }

    /// Broadcast a value to every subscriber registered at delivery time.
    pub fn send(&self, value: T) {
        let inner = Rc::clone(&self.inner);
        runtime::enqueue(move || {
            let subscribers: Vec<Subscriber<T>> = inner
                .subscribers
                .borrow()
                .iter()
                .map(|(_, subscriber)| Rc::clone(subscriber))
                .collect();

            if config::diagnostics().trace_channels {
                tracing::trace!(
                    channel = inner.label,
                    subscribers = subscribers.len(),
                    "Delivering channel value"
                );
            }

            for subscriber in subscribers {
                subscriber(value.clone());
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

/// RAII guard returned by [`Channel::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
