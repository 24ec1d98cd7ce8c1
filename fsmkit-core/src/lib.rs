//! # fsmkit-core
//!
//! Generic, thread-safe finite state machine engine.
//!
//! This crate provides:
//! - Runtime registration of states and input-triggered transitions
//! - A single fallback channel for invalid state references and unmatched inputs
//! - Step execution under one engine-wide lock
//! - YAML/environment configuration for engine instances
//!
//! ```
//! use fsmkit_core::TransitionEngine;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let engine = TransitionEngine::<&str, &str>::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//!
//! engine.set_fallback(|reason| eprintln!("fallback: {}", reason));
//! engine.add_state("a");
//! engine.add_state("b");
//!
//! let counter = fired.clone();
//! engine
//!     .add_transition("a", "b", "go", move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//!
//! engine.reset("a").unwrap();
//! engine.step("go").unwrap();
//!
//! assert_eq!(engine.state().unwrap(), "b");
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod table;

pub use config::{ConfigError, EngineConfig, InvokePolicy};
pub use engine::{Outcome, TransitionEngine};
pub use error::EngineError;
pub use fallback::{Fallback, FallbackReason, StateRole};
pub use table::{Callback, Transition, TransitionTable};
