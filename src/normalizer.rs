//! Normalizer: bundle entries → uniform `(value, weight, polarity)` triples.
//!
//! Never fails. Unknown names become weight-0 placeholders, wrong-shape values
//! become `invalid`, out-of-domain values are clamped and flagged.
//! A signal reached a second time through an alias or a case/separator
//! variant is `invalid` too: one measurement gets one vote.

use serde::Serialize;
use std::collections::HashSet;

use crate::registry::SignalRegistry;
use crate::signal::{Modality, Polarity, RawValue, SignalBundle, SignalEntry};

/// Neutral value used for signals that cannot vote.
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Ok,
    /// Raw value was outside its declared domain and was pulled to the nearest bound.
    Clamped,
    /// Missing or wrong-shape value; excluded from aggregation.
    Invalid,
    /// Name not in the registry; excluded from aggregation.
    Unrecognized,
}

impl SignalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalStatus::Ok => "ok",
            SignalStatus::Clamped => "clamped",
            SignalStatus::Invalid => "invalid",
            SignalStatus::Unrecognized => "unrecognized",
        }
    }

    /// `ok` and `clamped` signals may vote.
    pub fn can_vote(self) -> bool {
        matches!(self, SignalStatus::Ok | SignalStatus::Clamped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSignal {
    /// Name exactly as the analyzer sent it.
    pub name: String,
    /// Registry name, when it differs from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    pub label: String,
    pub status: SignalStatus,
    pub value: f64,
    pub weight: f64,
    pub polarity: Polarity,
    pub raw: RawValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NormalizedSignal {
    /// Usable = votable status and a positive weight.
    pub fn is_usable(&self) -> bool {
        self.status.can_vote() && self.weight > 0.0
    }

    /// Value expressed as evidence of synthetic/malicious content.
    pub fn effective_value(&self) -> f64 {
        self.polarity.effective(self.value)
    }

    fn placeholder(entry: &SignalEntry, status: SignalStatus, label: String) -> Self {
        Self {
            name: entry.name.clone(),
            canonical: None,
            label,
            status,
            value: NEUTRAL,
            weight: 0.0,
            polarity: entry.polarity.unwrap_or(Polarity::SupportsSynthetic),
            raw: entry.value.clone(),
            units: entry.units.clone(),
            modality: entry.modality,
            note: None,
        }
    }
}

/// Normalize every entry of `bundle`, preserving input order.
pub fn normalize(bundle: &SignalBundle, registry: &SignalRegistry) -> Vec<NormalizedSignal> {
    let mut seen: HashSet<String> = HashSet::new();
    bundle
        .entries()
        .iter()
        .map(|e| {
            let mut s = normalize_entry(e, registry);
            if s.status != SignalStatus::Unrecognized {
                let canonical = s.canonical.as_deref().unwrap_or(&s.name).to_string();
                if !seen.insert(canonical.clone()) {
                    s.status = SignalStatus::Invalid;
                    s.value = NEUTRAL;
                    s.note = Some(format!("duplicate of `{canonical}` earlier in the bundle"));
                }
            }
            s
        })
        .collect()
}

fn normalize_entry(entry: &SignalEntry, registry: &SignalRegistry) -> NormalizedSignal {
    let Some((canonical, rule)) = registry.resolve(&entry.name) else {
        let mut s =
            NormalizedSignal::placeholder(entry, SignalStatus::Unrecognized, entry.name.clone());
        s.note = Some("not in signal registry".to_string());
        return s;
    };

    let canonical = (canonical != entry.name).then(|| canonical.to_string());
    let weight = entry.weight.unwrap_or(rule.weight);
    let polarity = entry.polarity.unwrap_or(rule.polarity);
    let modality = entry.modality.or(rule.modality);

    match rule.domain.apply(&entry.value) {
        Ok(mapped) => NormalizedSignal {
            name: entry.name.clone(),
            canonical,
            label: rule.label.clone(),
            status: if mapped.clamped {
                SignalStatus::Clamped
            } else {
                SignalStatus::Ok
            },
            value: mapped.value,
            weight,
            polarity,
            raw: entry.value.clone(),
            units: entry.units.clone(),
            modality,
            note: None,
        },
        Err(reason) => NormalizedSignal {
            canonical,
            weight,
            polarity,
            modality,
            note: Some(reason),
            ..NormalizedSignal::placeholder(entry, SignalStatus::Invalid, rule.label.clone())
        },
    }
}
