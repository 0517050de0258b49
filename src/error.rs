use thiserror::Error;

/// Returned by an effect body to signal cancellation. Never reaches a
/// `catch` handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("effect cancelled")]
pub struct Cancelled;

/// Why a route request was dropped. Logged, never returned to the caller of
/// `route`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no destination registered for '{target}' (slot '{slot}')")]
    Unregistered {
        target: &'static str,
        slot: &'static str,
    },

    #[error("slot '{slot}' is empty")]
    EmptySlot { slot: &'static str },

    #[error("navigator is not mounted")]
    NotMounted,
}
