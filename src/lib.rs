//! TuneUp
//!
//! In-process step profiler. Records a hierarchical timing trace of nested
//! steps during one unit of work (e.g. one web request), tags every step
//! with a layer (model, view or controller) and breaks down each step's
//! time across those layers.
//!
//! ## Getting Started
//!
//! ```
//! use tuneup_core::aggregator::layer_portions;
//! use tuneup_core::recorder::ambient;
//! use tuneup_core::trace::Step;
//!
//! let (trace, users) = ambient::record(|| {
//!     ambient::step(Step::controller("UsersController#index"), || {
//!         let users = ambient::step(Step::model("User Load"), || vec!["ada", "grace"]);
//!         ambient::step(Step::view("Render users/index"), || users.len());
//!         users
//!     })
//! });
//!
//! assert_eq!(users.len(), 2);
//! let portions = layer_portions(&trace, trace.root()).unwrap();
//! assert!((portions.sum() - 1.0).abs() < 1e-9);
//! ```
//!
//! The `tuneup` binary records a simulated request and inspects
//! exported profiles:
//!
//! ```bash
//! tuneup demo --summary
//! tuneup validate --file tuneup-profile.json
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod recorder;
pub mod trace;
pub mod utils;

pub use recorder::{ambient, Recorder, StepGuard};
pub use trace::{Layer, LayerPortions, NodeId, Step, Trace, TraceBuilder};
pub use utils::{AggregateError, AggregationConfig, CalculationError, UnclassifiedPolicy};
