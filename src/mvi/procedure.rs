//! Declarative effect descriptions.
//!
//! A [`Procedure`] is a plain value returned by a reducer. It performs nothing
//! by itself; the owning view model hands it to [`Procedure::drive`] on a local
//! task.

use std::fmt;
use std::future::Future;

use futures_core::future::LocalBoxFuture;
use tokio::task::JoinSet;

use super::send::Sender;
use crate::config;
use crate::error::Cancelled;

type Body<A> = Box<dyn FnOnce(Sender<A>) -> LocalBoxFuture<'static, anyhow::Result<()>>>;
type Handler<A> = Box<dyn FnOnce(anyhow::Error, Sender<A>) -> LocalBoxFuture<'static, ()>>;

/// One asynchronous unit with its optional error handler.
pub struct RunOp<A> {
    body: Body<A>,
    handler: Option<Handler<A>>,
}

enum Operation<A> {
    None,
    Dismiss,
    Run(RunOp<A>),
    Merge(Vec<Procedure<A>>),
    Sequence(Vec<Procedure<A>>),
}

/// What a reducer asks the runtime to do after a state transition.
#[must_use = "a Procedure does nothing unless returned from a reducer"]
pub struct Procedure<A> {
    op: Operation<A>,
}

impl<A> fmt::Debug for Procedure<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            Operation::None => f.write_str("Procedure::None"),
            Operation::Dismiss => f.write_str("Procedure::Dismiss"),
            Operation::Run(op) => f
                .debug_struct("Procedure::Run")
                .field("catch", &op.handler.is_some())
                .finish(),
            Operation::Merge(branches) => f.debug_tuple("Procedure::Merge").field(branches).finish(),
            Operation::Sequence(steps) => f.debug_tuple("Procedure::Sequence").field(steps).finish(),
        }
    }
}

impl<A: 'static> Procedure<A> {
    pub fn none() -> Self {
        Self { op: Operation::None }
    }

    /// Forward a dismiss request through the owning state.
    pub fn dismiss() -> Self {
        Self {
            op: Operation::Dismiss,
        }
    }

    /// Schedule `body` as a cancellable local task.
    ///
    /// Returning [`Cancelled`] is never treated as a failure. Any other error
    /// goes to the handler attached with [`Procedure::catch`].
    pub fn run<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Sender<A>) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        Self {
            op: Operation::Run(RunOp {
                body: Box::new(move |sender| Box::pin(body(sender))),
                handler: None,
            }),
        }
    }

    /// Attach an error handler to a `run` procedure.
    pub fn catch<H, Fut>(self, handler: H) -> Self
    where
        H: FnOnce(anyhow::Error, Sender<A>) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        match self.op {
            Operation::Run(mut op) => {
                op.handler = Some(Box::new(move |error, sender| Box::pin(handler(error, sender))));
                Self {
                    op: Operation::Run(op),
                }
            }
            other => {
                tracing::debug!("catch() applies only to run procedures; handler dropped");
                Self { op: other }
            }
        }
    }

    /// An effect that immediately feeds `action` back.
    pub fn send(action: A) -> Self {
        Self::run(move |sender| async move {
            sender.send(action);
            Ok(())
        })
    }

    /// Run every procedure concurrently and wait for all of them.
    pub fn merge(procedures: impl IntoIterator<Item = Procedure<A>>) -> Self {
        Self {
            op: Operation::Merge(procedures.into_iter().collect()),
        }
    }

    /// Run procedures strictly one after another.
    ///
    /// A `dismiss` step ends the sequence: the steps after it never run.
    pub fn sequence(procedures: impl IntoIterator<Item = Procedure<A>>) -> Self {
        Self {
            op: Operation::Sequence(procedures.into_iter().collect()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.op, Operation::None)
    }

    pub fn is_dismiss(&self) -> bool {
        matches!(self.op, Operation::Dismiss)
    }

    /// Whether executing this procedure needs a task at all.
    pub(crate) fn needs_task(&self) -> bool {
        !matches!(self.op, Operation::None | Operation::Dismiss)
    }

    pub(crate) fn drive(self, sender: Sender<A>) -> LocalBoxFuture<'static, ()> {
        Box::pin(async move {
            match self.op {
                Operation::None => {}
                Operation::Dismiss => sender.dismiss(),
                Operation::Run(op) => op.execute(sender).await,
                Operation::Merge(branches) => {
                    let mut set = JoinSet::new();
                    for branch in branches {
                        set.spawn_local(branch.drive(sender.clone()));
                    }
                    while let Some(joined) = set.join_next().await {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                tracing::error!(error = %e, "Merged effect branch panicked");
                            }
                        }
                    }
                }
                Operation::Sequence(steps) => {
                    let total = steps.len();
                    for (index, step) in steps.into_iter().enumerate() {
                        if step.is_dismiss() {
                            let skipped = total - index - 1;
                            if skipped > 0 {
                                tracing::warn!(skipped, "Dismiss inside sequence, remaining steps skipped");
                            }
                            sender.dismiss();
                            return;
                        }
                        step.drive(sender.clone()).await;
                    }
                }
            }
        })
    }
}

impl<A: 'static> RunOp<A> {
    async fn execute(self, sender: Sender<A>) {
        let Err(error) = (self.body)(sender.clone()).await else {
            return;
        };

        if error.chain().any(|cause| cause.is::<Cancelled>()) {
            tracing::trace!("Effect cancelled");
            return;
        }

        match self.handler {
            Some(handler) => handler(error, sender).await,
            None => {
                if config::diagnostics().warn_unhandled_effect_errors {
                    tracing::warn!(error = %error, "Unhandled effect error");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_sender(log: &Rc<RefCell<Vec<String>>>) -> Sender<String> {
        let actions = Rc::clone(log);
        let dismissals = Rc::clone(log);
        Sender::new(
            move |action| actions.borrow_mut().push(action),
            move || dismissals.borrow_mut().push("dismiss".to_string()),
        )
    }

    #[test]
    fn inspection_helpers() {
        assert!(Procedure::<()>::none().is_none());
        assert!(Procedure::<()>::dismiss().is_dismiss());
        assert!(!Procedure::send(()).is_none());
        assert!(!Procedure::<()>::dismiss().needs_task());
    }

    #[tokio::test]
    async fn sequence_stops_at_dismiss() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let procedure = Procedure::sequence([
            Procedure::send("first".to_string()),
            Procedure::dismiss(),
            Procedure::send("never".to_string()),
        ]);

        let local = tokio::task::LocalSet::new();
        local.run_until(procedure.drive(recording_sender(&log))).await;

        assert_eq!(*log.borrow(), vec!["first", "dismiss"]);
    }

    #[tokio::test]
    async fn cancellation_is_not_an_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handled = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&handled);
        let procedure = Procedure::run(|_| async { Err(Cancelled.into()) }).catch(move |_, _| async move {
            *counter.borrow_mut() += 1;
        });

        let local = tokio::task::LocalSet::new();
        local.run_until(procedure.drive(recording_sender(&log))).await;

        assert_eq!(*handled.borrow(), 0);
        assert!(log.borrow().is_empty());
    }

    #[tokio::test]
    async fn handler_receives_the_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let procedure = Procedure::run(|_| async { Err(anyhow::anyhow!("boom")) })
            .catch(|error, sender: Sender<String>| async move { sender.send(format!("caught {error}")) });

        let local = tokio::task::LocalSet::new();
        local.run_until(procedure.drive(recording_sender(&log))).await;

        assert_eq!(*log.borrow(), vec!["caught boom"]);
    }
}
