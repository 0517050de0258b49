//! The single designated execution context.
//!
//! View models, states and channels live on one thread. Every `send` and
//! `dispatch` runs as a transaction; channel deliveries and cleanup closures
//! issued while a transaction is open are queued and drained, in FIFO order,
//! once the outermost transaction closes. No reducer ever observes another
//! reducer's state mid-mutation.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

type Job = Box<dyn FnOnce()>;

#[derive(Default)]
struct MainContext {
    depth: Cell<usize>,
    draining: Cell<bool>,
    queue: RefCell<VecDeque<Job>>,
}

thread_local! {
    static MAIN: MainContext = MainContext::default();
}

/// Run `f` as one serialized unit of work.
///
/// Jobs enqueued while `f` runs are delivered after it returns.
pub(crate) fn transaction<R>(f: impl FnOnce() -> R) -> R {
    MAIN.with(|ctx| ctx.depth.set(ctx.depth.get() + 1));
    let result = {
        let _depth = scopeguard::guard((), |_| {
            MAIN.with(|ctx| ctx.depth.set(ctx.depth.get().saturating_sub(1)));
        });
        f()
    };
    drain();
    result
}

/// Queue a job. Runs immediately when no transaction is open.
pub(crate) fn enqueue(job: impl FnOnce() + 'static) {
    MAIN.with(|ctx| ctx.queue.borrow_mut().push_back(Box::new(job)));
    drain();
}

fn drain() {
    let idle = MAIN.with(|ctx| ctx.depth.get() == 0 && !ctx.draining.get());
    if !idle {
        return;
    }

    MAIN.with(|ctx| ctx.draining.set(true));
    let _draining = scopeguard::guard((), |_| {
        MAIN.with(|ctx| ctx.draining.set(false));
    });

    // Jobs may enqueue more jobs; keep going until the queue settles.
    while let Some(job) = MAIN.with(|ctx| ctx.queue.borrow_mut().pop_front()) {
        job();
    }
}
