//! # Trust Engine
//! Pure, testable pipeline that maps `SignalBundle` → `TrustAssessment`.
//! No I/O, no clock, no shared mutable state; safe to share behind an `Arc`.
//!
//! Order: normalize → aggregate (includes verdict bands) → explain → assemble.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::aggregate::aggregate;
use crate::assessment::TrustAssessment;
use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::explain::explain;
use crate::normalizer::normalize;
use crate::registry::SignalRegistry;
use crate::signal::{Modality, SignalBundle};

#[derive(Debug, Clone)]
pub struct TrustEngine {
    registry: Arc<SignalRegistry>,
    config: EngineConfig,
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self {
            registry: Arc::new(SignalRegistry::builtin()),
            config: EngineConfig::default(),
        }
    }
}

impl TrustEngine {
    pub fn new(registry: SignalRegistry, config: EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }

    /// Registry and config resolved from files/env (see `config` and `registry`).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(SignalRegistry::load_default(), EngineConfig::from_env()?)
    }

    pub fn registry(&self) -> &SignalRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline. Never fails: per-signal problems end up in `details`.
    pub fn assess(&self, bundle: &SignalBundle) -> TrustAssessment {
        let signals = normalize(bundle, &self.registry);
        let result = aggregate(&signals, &self.config);
        let explanation = explain(&signals, &result, &self.config);
        let out = TrustAssessment::assemble(bundle, signals, &result, explanation);

        // Never log raw values; fingerprint + counts only.
        debug!(
            target: "trust",
            id = %out.details.fingerprint,
            modality = %bundle.modality(),
            signals = bundle.len(),
            usable = result.usable_signals,
            excluded = out.excluded().count(),
            ai_probability = result.ai_probability,
            verdict = %result.verdict,
            confidence = ?result.confidence,
            "assessment complete"
        );

        out
    }

    /// Validate a wire-shaped bundle, then assess it.
    pub fn assess_json(
        &self,
        modality: Modality,
        body: &Value,
    ) -> Result<TrustAssessment, ValidationError> {
        let bundle = SignalBundle::from_json(modality, body)?;
        Ok(self.assess(&bundle))
    }
}
