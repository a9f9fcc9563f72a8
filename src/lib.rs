// src/lib.rs
// Public library surface for integration tests (and potential reuse).

// Core pipeline: signal → registry → normalizer → aggregate/verdict → explain → assessment
pub mod aggregate;
pub mod assessment;
pub mod engine;
pub mod error;
pub mod explain;
pub mod normalizer;
pub mod registry;
pub mod signal;
pub mod verdict;

// Start-up configuration
pub mod config;

// Serving layer (HTTP + Prometheus); the core above never touches these.
pub mod api;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{AggregationResult, Confidence};
pub use crate::api::router;
pub use crate::assessment::TrustAssessment;
pub use crate::config::EngineConfig;
pub use crate::engine::TrustEngine;
pub use crate::error::ValidationError;
pub use crate::normalizer::{NormalizedSignal, SignalStatus};
pub use crate::registry::{NormalizationRule, SignalRegistry};
pub use crate::signal::{Modality, Polarity, SignalBundle, SignalEntry};
pub use crate::verdict::{Verdict, VerdictBands};
