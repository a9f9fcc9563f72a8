//! # Aggregator
//! Weighted mean of polarity-normalized evidence over usable signals.
//!
//! `ai_probability = Σ(wᵢ · effᵢ) / Σwᵢ`, where `effᵢ` is the value for
//! `supports_synthetic` signals and `1 − value` otherwise. Dropped or
//! zero-weight signals simply leave the sum; the division renormalizes.
//! No usable signals at all → neutral 0.5 with low confidence.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::normalizer::{NormalizedSignal, NEUTRAL};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregationResult {
    pub ai_probability: f64,
    pub trust_score: u8,
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub usable_signals: usize,
}

/// `round(100 × (1 − p))`, kept inside `0..=100`.
pub fn trust_score(ai_probability: f64) -> u8 {
    (100.0 * (1.0 - ai_probability)).round().clamp(0.0, 100.0) as u8
}

/// Largest weight among usable signals, or 0 when there are none.
///
/// Sums run over `w / max` so that caller overrides near `f64::MAX` cannot
/// overflow to `inf`; the weighted mean is unchanged by the rescale.
pub(crate) fn max_usable_weight(signals: &[NormalizedSignal]) -> f64 {
    signals
        .iter()
        .filter(|s| s.is_usable())
        .map(|s| s.weight)
        .fold(0.0, f64::max)
}

pub fn aggregate(signals: &[NormalizedSignal], config: &EngineConfig) -> AggregationResult {
    let scale = max_usable_weight(signals);
    let mut num = 0.0f64;
    let mut den = 0.0f64;
    let mut usable = 0usize;

    for s in signals.iter().filter(|s| s.is_usable()) {
        let w = s.weight / scale;
        num += w * s.effective_value();
        den += w;
        usable += 1;
    }

    let p = if usable == 0 || den <= 0.0 {
        None
    } else {
        Some(num / den).filter(|p| p.is_finite())
    };
    let ai_probability = p.map_or(NEUTRAL, |p| p.clamp(0.0, 1.0));

    let confidence = if p.is_none() || usable < config.min_usable_signals {
        Confidence::Low
    } else {
        Confidence::Normal
    };

    AggregationResult {
        ai_probability,
        trust_score: trust_score(ai_probability),
        verdict: config.bands.classify(ai_probability),
        confidence,
        usable_signals: usable,
    }
}
