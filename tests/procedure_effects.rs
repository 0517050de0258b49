//! Effect execution on a `LocalSet`: ordering, errors and cancellation.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::LocalSet;
use tokio::time::{sleep, timeout};
use waypoint::mvi::DismissRouter;
use waypoint::{BusinessState, Cancelled, Channels, Procedure, Reducer, ViewModel};

struct EffectState {
    channels: Channels<Self>,
    log: Vec<String>,
}

impl BusinessState for EffectState {
    type Reducer = EffectFeature;

    fn channels(&self) -> &Channels<Self> {
        &self.channels
    }
}

enum EffectAction {
    Merge,
    Sequence,
    FailHandled,
    FailUnhandled,
    Cancel,
    Long,
    DismissMidway,
    Record(String),
}

struct EffectFeature;

fn record(label: &str) -> EffectAction {
    EffectAction::Record(label.to_string())
}

fn delayed(ms: u64, label: &'static str) -> Procedure<EffectAction> {
    Procedure::run(move |sender| async move {
        sleep(Duration::from_millis(ms)).await;
        sender.send(record(label));
        Ok(())
    })
}

impl Reducer for EffectFeature {
    type State = EffectState;
    type Action = EffectAction;
    type Event = ();
    type Command = ();

    fn reduce(&self, state: &mut EffectState, action: EffectAction) -> Procedure<EffectAction> {
        match action {
            EffectAction::Merge => Procedure::merge([delayed(100, "slow"), delayed(10, "fast")]),
            EffectAction::Sequence => Procedure::sequence([delayed(100, "slow"), delayed(10, "fast")]),
            EffectAction::FailHandled => Procedure::run(|_| async { Err(anyhow!("boom")) })
                .catch(|error, sender| async move { sender.send(EffectAction::Record(format!("caught {error}"))) }),
            EffectAction::FailUnhandled => Procedure::run(|_| async { Err(anyhow!("nobody listens")) }),
            EffectAction::Cancel => Procedure::run(|_| async { Err(Cancelled.into()) })
                .catch(|_, sender| async move { sender.send(record("handler")) }),
            EffectAction::Long => delayed(10_000, "late"),
            EffectAction::DismissMidway => Procedure::sequence([
                Procedure::send(record("before")),
                Procedure::dismiss(),
                Procedure::send(record("after")),
            ]),
            EffectAction::Record(label) => {
                state.log.push(label);
                Procedure::none()
            }
        }
    }
}

fn view_model() -> ViewModel<EffectState> {
    ViewModel::new(
        EffectState {
            channels: Channels::default(),
            log: Vec::new(),
        },
        EffectFeature,
    )
}

async fn settle(view_model: &ViewModel<EffectState>) {
    timeout(Duration::from_secs(5), async {
        while view_model.effect_count() > 0 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("effects should finish");
}

fn log(view_model: &ViewModel<EffectState>) -> Vec<String> {
    view_model.with_state(|state| state.log.clone())
}

#[tokio::test]
async fn merged_branches_run_concurrently() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();
            let started = tokio::time::Instant::now();

            view_model.send(EffectAction::Merge);
            settle(&view_model).await;

            assert_eq!(log(&view_model), ["fast", "slow"]);
            assert!(started.elapsed() < Duration::from_millis(190));
        })
        .await;
}

#[tokio::test]
async fn sequence_steps_run_in_order() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();
            let started = tokio::time::Instant::now();

            view_model.send(EffectAction::Sequence);
            settle(&view_model).await;

            assert_eq!(log(&view_model), ["slow", "fast"]);
            assert!(started.elapsed() >= Duration::from_millis(110));
        })
        .await;
}

#[tokio::test]
async fn errors_reach_the_handler_once() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();

            view_model.send(EffectAction::FailHandled);
            settle(&view_model).await;

            assert_eq!(log(&view_model), ["caught boom"]);
        })
        .await;
}

#[tokio::test]
async fn unhandled_errors_are_swallowed() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();

            view_model.send(EffectAction::FailUnhandled);
            settle(&view_model).await;

            assert!(log(&view_model).is_empty());
        })
        .await;
}

#[tokio::test]
async fn cancellation_skips_the_handler() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();

            view_model.send(EffectAction::Cancel);
            settle(&view_model).await;

            assert!(log(&view_model).is_empty());
        })
        .await;
}

#[tokio::test]
async fn cancel_effects_aborts_running_tasks() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();
            view_model.send(EffectAction::Long);
            view_model.send(EffectAction::Long);
            assert_eq!(view_model.effect_count(), 2);

            view_model.cancel_effects();
            sleep(Duration::from_millis(20)).await;

            assert_eq!(view_model.effect_count(), 0);
            assert!(log(&view_model).is_empty());
        })
        .await;
}

#[tokio::test]
async fn dropping_the_view_model_aborts_its_effects() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();
            let state = view_model.state();
            view_model.send(EffectAction::Merge);

            drop(view_model);
            sleep(Duration::from_millis(150)).await;

            assert!(state.borrow().log.is_empty());
        })
        .await;
}

#[tokio::test]
async fn dismiss_ends_a_sequence() {
    LocalSet::new()
        .run_until(async {
            let view_model = view_model();
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            let _subscription = view_model.with_state(|state| {
                state
                    .channels()
                    .dismiss()
                    .subscribe(move |request| sink.borrow_mut().push(request))
            });

            view_model.send(EffectAction::DismissMidway);
            settle(&view_model).await;

            assert_eq!(log(&view_model), ["before"]);
            assert_eq!(*seen.borrow(), vec![DismissRouter::Any]);
        })
        .await;
}

#[test]
fn effects_without_a_runtime_are_dropped() {
    let view_model = view_model();

    view_model.send(EffectAction::Long);
    view_model.send(EffectAction::Record("sync".to_string()));

    assert_eq!(view_model.effect_count(), 0);
    assert_eq!(log(&view_model), ["sync"]);
}
