//! Effect execution and the per-view-model task table.

use std::any::type_name;

use uuid::Uuid;

use super::ViewModel;
use crate::mvi::{ActionOf, BusinessState, Procedure, Sender};

impl<S: BusinessState> ViewModel<S> {
    /// Spawn `procedure` on the current `LocalSet` and track it until it ends.
    ///
    /// Without a tokio runtime the effect is logged and dropped. Inside a
    /// runtime, a missing `LocalSet` still panics in `spawn_local`.
    pub(crate) fn spawn_effect(&self, procedure: Procedure<ActionOf<S>>) {
        if !procedure.needs_task() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(state = type_name::<S>(), "No async runtime, dropping effect");
            return;
        }

        let id = Uuid::new_v4();
        let owner = self.downgrade();
        let future = procedure.drive(self.sender());

        let handle = tokio::task::spawn_local(async move {
            future.await;
            if let Some(view_model) = owner.upgrade() {
                view_model.inner.effects.borrow_mut().remove(&id);
            }
        });

        tracing::trace!(state = type_name::<S>(), effect = %id, "Effect started");
        self.inner
            .effects
            .borrow_mut()
            .insert(id, handle.abort_handle());
    }

    /// A [`Sender`] that feeds actions back into this view model.
    pub(crate) fn sender(&self) -> Sender<ActionOf<S>> {
        let deliver = self.downgrade();
        let dismiss = self.downgrade();
        Sender::new(
            move |action| {
                if let Some(view_model) = deliver.upgrade() {
                    view_model.send(action);
                }
            },
            move || {
                if let Some(view_model) = dismiss.upgrade() {
                    view_model.with_state(|state| state.request_dismiss());
                }
            },
        )
    }

    /// Abort every in-flight effect.
    pub fn cancel_effects(&self) {
        let handles: Vec<_> = self.inner.effects.borrow_mut().drain().collect();
        if !handles.is_empty() {
            tracing::debug!(
                state = type_name::<S>(),
                count = handles.len(),
                "Cancelling effects"
            );
        }
        for (_, handle) in handles {
            handle.abort();
        }
    }

    /// Number of effects still running.
    pub fn effect_count(&self) -> usize {
        self.inner.effects.borrow().len()
    }
}
