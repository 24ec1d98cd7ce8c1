//! Transition engine - registered states, transitions, and step execution
//! behind a single engine-wide lock.

use crate::config::{EngineConfig, InvokePolicy};
use crate::error::EngineError;
use crate::fallback::{Fallback, FallbackReason, StateRole};
use crate::table::TransitionTable;
use parking_lot::{Mutex, MutexGuard};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Result of an operation that completed without a contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S, I> {
    /// The operation took effect.
    ///
    /// For a step, `from` is the state before the transition. For a reset it
    /// is the previous state, if the engine had one. For a registration it is
    /// the transition's source.
    Applied { from: Option<S>, to: S },
    /// The fallback was invoked instead.
    FellBack(FallbackReason<S, I>),
}

impl<S, I> Outcome<S, I> {
    /// Returns true if the operation took effect.
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    /// Returns true if the fallback was invoked.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::FellBack(_))
    }
}

struct Inner<S, I> {
    table: TransitionTable<S, I>,
    current: Option<S>,
    fallback: Option<Arc<dyn Fallback<S, I>>>,
}

/// A thread-safe finite state machine.
///
/// Every operation runs under one engine-wide lock, so concurrent calls are
/// linearizable. With the default [`InvokePolicy::HoldLock`] the lock is also
/// held while a callback or the fallback runs: a callback must not call back
/// into the same engine, or it will deadlock. [`InvokePolicy::ReleaseLock`]
/// lifts that restriction at the cost of callbacks no longer being serialized
/// with other operations.
///
/// Invalid state references and unmatched inputs are reported through the
/// fallback installed with [`TransitionEngine::set_fallback`]. If none is
/// installed, those operations return [`EngineError::FallbackUnset`].
pub struct TransitionEngine<S, I> {
    inner: Mutex<Inner<S, I>>,
    config: EngineConfig,
}

impl<S, I> Default for TransitionEngine<S, I>
where
    S: Eq + Hash + Clone + Debug,
    I: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, I> TransitionEngine<S, I>
where
    S: Eq + Hash + Clone + Debug,
    I: Eq + Hash + Debug,
{
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                table: TransitionTable::new(),
                current: None,
                fallback: None,
            }),
            config,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a state. Registering the same state again is a no-op.
    pub fn add_state(&self, state: S) {
        let mut inner = self.inner.lock();
        tracing::debug!("[{}] Adding state {:?}", self.config.name, state);
        if !inner.table.add_state(state) {
            tracing::trace!("[{}] State already registered", self.config.name);
        }
    }

    /// Installs the fallback, replacing any previous one.
    pub fn set_fallback<F>(&self, fallback: F)
    where
        F: Fn(&FallbackReason<S, I>) + Send + Sync + 'static,
    {
        self.set_fallback_handler(fallback);
    }

    /// Installs a [`Fallback`] implementation, replacing any previous one.
    pub fn set_fallback_handler<H>(&self, handler: H)
    where
        H: Fallback<S, I> + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.fallback.replace(Arc::new(handler)).is_some() {
            tracing::debug!("[{}] Replaced fallback", self.config.name);
        }
    }

    /// Registers a transition from `from` to `to` on `input`.
    ///
    /// Both states must already be registered; otherwise nothing is stored and
    /// the fallback is invoked. A later registration for the same `(from,
    /// input)` pair replaces the earlier one.
    pub fn add_transition<F>(
        &self,
        from: S,
        to: S,
        input: I,
        callback: F,
    ) -> Result<Outcome<S, I>, EngineError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        tracing::debug!(
            "[{}] Adding transition {:?} --{:?}--> {:?}",
            self.config.name,
            from,
            input,
            to
        );

        let applied = Outcome::Applied {
            from: Some(from.clone()),
            to: to.clone(),
        };
        match inner.table.insert(from, to, input, Arc::new(callback)) {
            Ok(replaced) => {
                if let Some(previous) = replaced {
                    tracing::debug!(
                        "[{}] Overwrote transition previously targeting {:?}",
                        self.config.name,
                        previous
                    );
                }
                Ok(applied)
            }
            Err(reason) => self.fall_back(inner, reason),
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Sets the current state directly. No callback is invoked.
    ///
    /// If `state` is not registered the fallback is invoked and the current
    /// state is left unchanged.
    pub fn reset(&self, state: S) -> Result<Outcome<S, I>, EngineError> {
        let mut inner = self.inner.lock();
        if let Err(reason) = inner.table.require_state(&state, StateRole::Reset) {
            return self.fall_back(inner, reason);
        }

        tracing::debug!("[{}] Reset to {:?}", self.config.name, state);
        let from = inner.current.replace(state.clone());
        Ok(Outcome::Applied { from, to: state })
    }

    /// Feeds one input to the machine.
    ///
    /// If a transition matches the current state and `input`, the current
    /// state is updated and then the transition's callback is invoked once.
    /// Otherwise the fallback is invoked once and the state is unchanged.
    pub fn step(&self, input: I) -> Result<Outcome<S, I>, EngineError> {
        let mut inner = self.inner.lock();
        let current = inner.current.clone().ok_or(EngineError::NotInitialized)?;
        let key = (current, input);

        let found = inner
            .table
            .get(&key)
            .map(|t| (t.to.clone(), t.callback.clone()));

        match found {
            Some((to, callback)) => {
                tracing::debug!(
                    "[{}] Step {:?} --{:?}--> {:?}",
                    self.config.name,
                    key.0,
                    key.1,
                    to
                );
                inner.current = Some(to.clone());

                tracing::trace!("[{}] Invoking transition callback", self.config.name);
                self.invoke(inner, &*callback);

                let (from, _) = key;
                Ok(Outcome::Applied {
                    from: Some(from),
                    to,
                })
            }
            None => {
                let (state, input) = key;
                self.fall_back(inner, FallbackReason::NoTransition { state, input })
            }
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> Result<S, EngineError> {
        self.inner
            .lock()
            .current
            .clone()
            .ok_or(EngineError::NotInitialized)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns true once a reset has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().current.is_some()
    }

    /// Returns true if the state is registered.
    pub fn is_registered(&self, state: &S) -> bool {
        self.inner.lock().table.contains_state(state)
    }

    /// Returns true if a transition is registered for `(state, input)`.
    pub fn has_transition(&self, state: &S, input: &I) -> bool
    where
        I: Clone,
    {
        self.inner.lock().table.contains_transition(state, input)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.inner.lock().table.state_count()
    }

    /// Number of registered transitions.
    pub fn transition_count(&self) -> usize {
        self.inner.lock().table.transition_count()
    }

    /// Returns true if a fallback is installed.
    pub fn has_fallback(&self) -> bool {
        self.inner.lock().fallback.is_some()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Reports `reason` through the fallback.
    fn fall_back(
        &self,
        inner: MutexGuard<'_, Inner<S, I>>,
        reason: FallbackReason<S, I>,
    ) -> Result<Outcome<S, I>, EngineError> {
        tracing::warn!("[{}] FAILURE, {}", self.config.name, reason);

        let Some(fallback) = inner.fallback.clone() else {
            tracing::error!("[{}] No fallback installed", self.config.name);
            return Err(EngineError::FallbackUnset {
                reason: reason.to_string(),
            });
        };

        self.invoke(inner, || fallback.on_fallback(&reason));
        Ok(Outcome::FellBack(reason))
    }

    /// Runs `action` according to the configured invoke policy.
    fn invoke(&self, guard: MutexGuard<'_, Inner<S, I>>, action: impl FnOnce()) {
        match self.config.invoke_policy {
            InvokePolicy::HoldLock => {
                action();
                drop(guard);
            }
            InvokePolicy::ReleaseLock => {
                drop(guard);
                action();
            }
        }
    }
}
