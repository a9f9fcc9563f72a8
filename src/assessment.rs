//! assessment.rs — outward-facing result shape.
//!
//! Thin packaging of what the pipeline computed. Field names follow the wire
//! contract (`trust_score`, `deepfake_probability`, `verdict`, `explanation`,
//! `details`). Nothing here depends on the clock, so identical input always
//! serializes to identical bytes.

use serde::Serialize;

use crate::aggregate::{AggregationResult, Confidence};
use crate::explain::{ContributionStatement, Direction, Explanation, Strength};
use crate::normalizer::{NormalizedSignal, SignalStatus};
use crate::signal::{Modality, SignalBundle};
use crate::verdict::Verdict;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustAssessment {
    pub trust_score: u8,
    /// `ai_probability` rounded to 4 decimal places.
    pub deepfake_probability: f64,
    pub verdict: Verdict,
    pub explanation: ExplanationOut,
    pub details: Details,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationOut {
    pub summary: String,
    pub factors: Vec<Factor>,
}

/// One ranked factor as the caller sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub signal: String,
    /// Normalized value in `[0, 1]`.
    pub strength: f64,
    pub level: Strength,
    pub direction: Direction,
    pub contribution: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Details {
    pub modality: Modality,
    pub fingerprint: String,
    pub confidence: Confidence,
    pub usable_signals: usize,
    pub signals: Vec<NormalizedSignal>,
}

impl TrustAssessment {
    pub fn assemble(
        bundle: &SignalBundle,
        signals: Vec<NormalizedSignal>,
        result: &AggregationResult,
        explanation: Explanation,
    ) -> Self {
        let factors = explanation.statements.into_iter().map(Factor::from).collect();

        Self {
            trust_score: result.trust_score,
            deepfake_probability: round4(result.ai_probability),
            verdict: result.verdict,
            explanation: ExplanationOut {
                summary: explanation.summary_text,
                factors,
            },
            details: Details {
                modality: bundle.modality(),
                fingerprint: bundle.fingerprint(),
                confidence: result.confidence,
                usable_signals: result.usable_signals,
                signals,
            },
        }
    }

    /// Signals that did not take part in aggregation, by status.
    pub fn excluded(&self) -> impl Iterator<Item = &NormalizedSignal> {
        self.details.signals.iter().filter(|s| !s.is_usable())
    }

    pub fn status_of(&self, name: &str) -> Option<SignalStatus> {
        self.details
            .signals
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }
}

impl From<ContributionStatement> for Factor {
    fn from(c: ContributionStatement) -> Self {
        Self {
            signal: c.signal_name,
            strength: round4(c.normalized_value),
            level: c.strength,
            direction: c.direction,
            contribution: round4(c.contribution_weight),
            text: c.rendered_text,
        }
    }
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
