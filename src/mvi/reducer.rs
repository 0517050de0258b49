//! Reducer trait.

use super::procedure::Procedure;
use super::state::BusinessState;

/// Turns `(State, Action)` into an in-place state mutation plus a [`Procedure`].
///
/// The reducer is the only place where state transitions happen. It mutates the
/// state through the given reference so the state's identity survives every
/// action.
pub trait Reducer: 'static {
    /// The state type this reducer operates on.
    type State: 'static;

    /// Messages driven by the owning view or fed back by effects.
    type Action: 'static;

    /// Business events bubbled up to the parent. Use `()` for leaf reducers.
    type Event: Clone + 'static;

    /// Messages the child raises for its own reducer through the request channel.
    type Command: Clone + 'static;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Procedure<Self::Action>;

    fn reduce_command(
        &self,
        state: &mut Self::State,
        command: Self::Command,
    ) -> Procedure<Self::Action> {
        let _ = (state, command);
        Procedure::none()
    }
}

pub type ActionOf<S> = <<S as BusinessState>::Reducer as Reducer>::Action;
pub type EventOf<S> = <<S as BusinessState>::Reducer as Reducer>::Event;
pub type CommandOf<S> = <<S as BusinessState>::Reducer as Reducer>::Command;
