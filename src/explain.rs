//! # Explanation Generator
//!
//! Ranks usable signals by how far they pull away from neutral and renders a
//! short, deterministic rationale.
//!
//! `contributionᵢ = wᵢ · |effᵢ − 0.5| / Σw`. Ties break on ascending signal
//! name so two runs over the same input always list factors identically.

use serde::Serialize;
use std::cmp::Ordering;

use crate::aggregate::{max_usable_weight, AggregationResult, Confidence};
use crate::config::EngineConfig;
use crate::normalizer::{NormalizedSignal, NEUTRAL};

/// Which way a factor pushes the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Synthetic,
    Authentic,
    Neutral,
}

impl Direction {
    fn of(effective: f64) -> Self {
        if effective > NEUTRAL {
            Direction::Synthetic
        } else if effective < NEUTRAL {
            Direction::Authentic
        } else {
            Direction::Neutral
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Direction::Synthetic => "toward synthetic or manipulated content",
            Direction::Authentic => "toward authentic content",
            Direction::Neutral => "in neither direction",
        }
    }
}

/// Coarse label for distance from neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    fn of(effective: f64) -> Self {
        let d = (effective - NEUTRAL).abs();
        if d >= 0.35 {
            Strength::Strong
        } else if d >= 0.15 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
        }
    }
}

/// One ranked factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionStatement {
    pub signal_name: String,
    pub normalized_value: f64,
    pub contribution_weight: f64,
    pub strength: Strength,
    pub direction: Direction,
    pub rendered_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub summary_text: String,
    pub statements: Vec<ContributionStatement>,
}

/// Weighted distance from neutral, relative to the total usable weight.
///
/// `scale` divides every weight first (see `aggregate`), and `total_weight`
/// is the sum of the scaled weights.
pub fn contribution(signal: &NormalizedSignal, scale: f64, total_weight: f64) -> f64 {
    if scale <= 0.0 || total_weight <= 0.0 {
        return 0.0;
    }
    (signal.weight / scale) * (signal.effective_value() - NEUTRAL).abs() / total_weight
}

pub fn explain(
    signals: &[NormalizedSignal],
    result: &AggregationResult,
    config: &EngineConfig,
) -> Explanation {
    let usable: Vec<&NormalizedSignal> = signals.iter().filter(|s| s.is_usable()).collect();
    let scale = max_usable_weight(signals);
    let total_weight: f64 = usable.iter().map(|s| s.weight / scale).sum();

    if usable.is_empty() || !(total_weight > 0.0 && total_weight.is_finite()) {
        return Explanation {
            summary_text: format!(
                "Insufficient evidence: no usable signals were provided, so the result is a neutral default (AI probability {:.4}, verdict {}).",
                result.ai_probability, result.verdict
            ),
            statements: Vec::new(),
        };
    }

    let mut ranked: Vec<(&NormalizedSignal, f64)> = usable
        .into_iter()
        .map(|s| (s, contribution(s, scale, total_weight)))
        .collect();

    // Stable sort; explicit secondary key keeps ties deterministic.
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.name.cmp(&b.0.name))
    });

    let statements = ranked
        .into_iter()
        .take(config.max_factors)
        .map(|(s, c)| render(s, c))
        .collect();

    Explanation {
        summary_text: summary(result, config),
        statements,
    }
}

fn render(s: &NormalizedSignal, contribution: f64) -> ContributionStatement {
    let eff = s.effective_value();
    let strength = Strength::of(eff);
    let direction = Direction::of(eff);
    let rendered_text = format!(
        "{} ({}) scored {:.2}: {} evidence {} (contribution {:.3}).",
        s.label,
        s.name,
        s.value,
        strength.as_str(),
        direction.phrase(),
        contribution
    );
    ContributionStatement {
        signal_name: s.name.clone(),
        normalized_value: s.value,
        contribution_weight: contribution,
        strength,
        direction,
        rendered_text,
    }
}

fn summary(result: &AggregationResult, config: &EngineConfig) -> String {
    let mut out = format!(
        "Verdict: {} (AI probability {:.4}, trust score {}/100) from {} usable {}.",
        result.verdict,
        result.ai_probability,
        result.trust_score,
        result.usable_signals,
        plural(result.usable_signals)
    );
    if result.confidence == Confidence::Low {
        out.push_str(&format!(
            " Confidence is low: only {} usable {}, at least {} needed.",
            result.usable_signals,
            plural(result.usable_signals),
            config.min_usable_signals
        ));
    }
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "signal"
    } else {
        "signals"
    }
}
