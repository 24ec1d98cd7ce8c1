//! Transition table storage.
//!
//! The table holds the registered-states set and the `(state, input)` map.
//! It does no locking of its own; [`crate::TransitionEngine`] wraps it.

use crate::fallback::{FallbackReason, StateRole};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;

/// Side-effecting action attached to a transition.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Value side of a table entry.
#[derive(Clone)]
pub struct Transition<S> {
    /// State the machine moves to.
    pub to: S,

    /// Action invoked after the move.
    pub callback: Callback,
}

impl<S: Debug> Debug for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// Registered states plus transitions keyed by `(source, input)`.
pub struct TransitionTable<S, I> {
    states: HashSet<S>,
    transitions: HashMap<(S, I), Transition<S>>,
}

impl<S, I> Default for TransitionTable<S, I> {
    fn default() -> Self {
        Self {
            states: HashSet::new(),
            transitions: HashMap::new(),
        }
    }
}

impl<S, I> TransitionTable<S, I>
where
    S: Eq + Hash + Clone + Debug,
    I: Eq + Hash + Debug,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a state. Returns false if it was already registered.
    pub fn add_state(&mut self, state: S) -> bool {
        self.states.insert(state)
    }

    /// Returns true if the state is registered.
    pub fn contains_state(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Iterates over registered states in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.iter()
    }

    /// Checks that `state` is registered, producing the fallback reason if not.
    pub fn require_state(&self, state: &S, role: StateRole) -> Result<(), FallbackReason<S, I>> {
        if self.states.contains(state) {
            Ok(())
        } else {
            Err(FallbackReason::UnknownState {
                state: state.clone(),
                role,
            })
        }
    }

    /// Inserts a transition, overwriting any entry for the same `(from, input)`.
    ///
    /// The source is validated before the destination. Returns the destination
    /// of the replaced entry, if any.
    pub fn insert(
        &mut self,
        from: S,
        to: S,
        input: I,
        callback: Callback,
    ) -> Result<Option<S>, FallbackReason<S, I>> {
        self.require_state(&from, StateRole::Source)?;
        self.require_state(&to, StateRole::Destination)?;

        let replaced = self
            .transitions
            .insert((from, input), Transition { to, callback });
        Ok(replaced.map(|t| t.to))
    }

    /// Returns the transition stored under `key`.
    pub fn get(&self, key: &(S, I)) -> Option<&Transition<S>> {
        self.transitions.get(key)
    }

    /// Looks up the transition for `(state, input)`.
    pub fn lookup(&self, state: &S, input: &I) -> Option<&Transition<S>>
    where
        I: Clone,
    {
        self.get(&(state.clone(), input.clone()))
    }

    /// Returns true if a transition exists for `(state, input)`.
    pub fn contains_transition(&self, state: &S, input: &I) -> bool
    where
        I: Clone,
    {
        self.lookup(state, input).is_some()
    }

    /// Number of registered transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

impl<S: Debug, I: Debug> Debug for TransitionTable<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .finish()
    }
}
