//! Fallback handling.
//!
//! Every condition where an operation cannot proceed as requested is reported
//! through one handler. The reason tells the handler which condition fired.

use std::fmt::{self, Debug};

/// Where an unregistered state was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateRole {
    /// Source state of a transition being registered.
    Source,
    /// Destination state of a transition being registered.
    Destination,
    /// Target of a reset.
    Reset,
}

impl fmt::Display for StateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRole::Source => f.write_str("source"),
            StateRole::Destination => f.write_str("destination"),
            StateRole::Reset => f.write_str("reset target"),
        }
    }
}

/// Why the fallback was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason<S, I> {
    /// A transition or reset referenced a state that was never registered.
    UnknownState { state: S, role: StateRole },
    /// No transition is registered for the current state and input.
    NoTransition { state: S, input: I },
}

impl<S, I> FallbackReason<S, I> {
    /// Returns true if this reason is an invalid state reference.
    pub fn is_unknown_state(&self) -> bool {
        matches!(self, FallbackReason::UnknownState { .. })
    }

    /// Returns true if this reason is an unmatched step.
    pub fn is_no_transition(&self) -> bool {
        matches!(self, FallbackReason::NoTransition { .. })
    }
}

impl<S: Debug, I: Debug> fmt::Display for FallbackReason<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::UnknownState { state, role } => {
                write!(f, "{} state {:?} is not in the state list", role, state)
            }
            FallbackReason::NoTransition { state, input } => {
                write!(f, "no transition from state {:?} on input {:?}", state, input)
            }
        }
    }
}

/// Handler invoked in place of a normal transition.
///
/// Implemented for any `Fn(&FallbackReason<S, I>)` closure. A handler that
/// does not care about the reason simply ignores its argument.
pub trait Fallback<S, I>: Send + Sync {
    fn on_fallback(&self, reason: &FallbackReason<S, I>);
}

impl<S, I, F> Fallback<S, I> for F
where
    F: Fn(&FallbackReason<S, I>) + Send + Sync,
{
    fn on_fallback(&self, reason: &FallbackReason<S, I>) {
        self(reason)
    }
}
