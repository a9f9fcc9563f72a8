//! # Signal bundle
//!
//! The input side of the pipeline: one bundle per request, produced by an
//! external analyzer for a single modality.
//!
//! - Entries keep caller order so every downstream listing is stable.
//! - Shape problems in the bundle itself are rejected with a `ValidationError`.
//! - Shape problems in a single `value` are *not* rejected here; the normalizer
//!   marks that signal `invalid` and moves on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{json_kind, ValidationError};

/// Content modality the bundle was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Image,
    Text,
    Email,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Image, Modality::Text, Modality::Email];

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Image => "image",
            Modality::Text => "text",
            Modality::Email => "email",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Modality::Image),
            "text" => Ok(Modality::Text),
            "email" => Ok(Modality::Email),
            other => Err(ValidationError::UnknownModality(other.to_string())),
        }
    }
}

/// Which way a high normalized value points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    SupportsSynthetic,
    SupportsAuthentic,
}

impl Polarity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "supports_synthetic" => Some(Polarity::SupportsSynthetic),
            "supports_authentic" => Some(Polarity::SupportsAuthentic),
            _ => None,
        }
    }

    /// Express `value` as evidence of synthetic/malicious content.
    pub fn effective(self, value: f64) -> f64 {
        match self {
            Polarity::SupportsSynthetic => value,
            Polarity::SupportsAuthentic => 1.0 - value,
        }
    }
}

/// Raw value exactly as the analyzer sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Bool(bool),
    /// No `value` key (or `null`).
    Missing,
    /// Anything else (string, array, object); kept verbatim for details.
    Other(Value),
}

impl RawValue {
    fn from_json(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => RawValue::Missing,
            Some(Value::Bool(b)) => RawValue::Bool(*b),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(RawValue::Number)
                .unwrap_or_else(|| RawValue::Other(Value::Number(n.clone()))),
            Some(other) => RawValue::Other(other.clone()),
        }
    }
}

/// One named measurement with optional per-call overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEntry {
    pub name: String,
    pub value: RawValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
}

impl SignalEntry {
    pub fn new(name: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            value,
            weight: None,
            polarity: None,
            units: None,
            modality: None,
        }
    }

    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, RawValue::Number(value))
    }

    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, RawValue::Bool(value))
    }

    pub fn weighted(mut self, w: f64) -> Self {
        self.weight = Some(w);
        self
    }

    pub fn polarity(mut self, p: Polarity) -> Self {
        self.polarity = Some(p);
        self
    }

    pub fn units(mut self, u: impl Into<String>) -> Self {
        self.units = Some(u.into());
        self
    }

    fn check(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(w) = self.weight {
            if !w.is_finite() {
                return Err(ValidationError::InvalidWeight {
                    name: self.name.clone(),
                    reason: "must be a finite number".into(),
                });
            }
            if w < 0.0 {
                return Err(ValidationError::InvalidWeight {
                    name: self.name.clone(),
                    reason: format!("must be >= 0, got {w}"),
                });
            }
        }
        Ok(())
    }
}

/// All signals one analyzer produced for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalBundle {
    modality: Modality,
    entries: Vec<SignalEntry>,
}

impl SignalBundle {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            entries: Vec::new(),
        }
    }

    /// Builder-style `push`.
    pub fn with(mut self, entry: SignalEntry) -> Result<Self, ValidationError> {
        self.push(entry)?;
        Ok(self)
    }

    pub fn push(&mut self, entry: SignalEntry) -> Result<(), ValidationError> {
        entry.check()?;
        if self.entries.iter().any(|e| e.name == entry.name) {
            return Err(ValidationError::DuplicateSignal(entry.name));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Parse the wire shape: `{ "<name>": { "value": .., "weight"?: .., "polarity"?: .. } | <number> }`.
    pub fn from_json(modality: Modality, body: &Value) -> Result<Self, ValidationError> {
        let map = body
            .as_object()
            .ok_or_else(|| ValidationError::NotAnObject(json_kind(body)))?;

        let mut bundle = Self::new(modality);
        for (name, v) in map {
            let entry = match v {
                Value::Number(_) | Value::Bool(_) => {
                    SignalEntry::new(name.clone(), RawValue::from_json(Some(v)))
                }
                Value::Object(obj) => parse_entry(name, obj)?,
                other => {
                    return Err(ValidationError::MalformedEntry {
                        name: name.clone(),
                        kind: json_kind(other),
                    })
                }
            };
            bundle.push(entry)?;
        }
        Ok(bundle)
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn entries(&self) -> &[SignalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Short stable id for logs and details: first 6 bytes of SHA-256 over the
    /// canonical serialization, hex encoded.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        let mut out = String::with_capacity(12);
        for b in digest.iter().take(6) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }
}

fn parse_entry(name: &str, obj: &Map<String, Value>) -> Result<SignalEntry, ValidationError> {
    let mut entry = SignalEntry::new(name, RawValue::from_json(obj.get("value")));

    entry.weight = match obj.get("weight") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(ValidationError::InvalidWeight {
                name: name.to_string(),
                reason: format!("expected a number, got {}", json_kind(other)),
            })
        }
    };

    entry.polarity = match obj.get("polarity") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(Polarity::parse(s).ok_or_else(|| {
            ValidationError::InvalidPolarity {
                name: name.to_string(),
                value: s.clone(),
            }
        })?),
        Some(other) => {
            return Err(ValidationError::InvalidPolarity {
                name: name.to_string(),
                value: other.to_string(),
            })
        }
    };

    entry.modality = match obj.get("modality") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.parse::<Modality>().map_err(|_| {
            ValidationError::InvalidModality {
                name: name.to_string(),
                value: s.clone(),
            }
        })?),
        Some(other) => {
            return Err(ValidationError::InvalidModality {
                name: name.to_string(),
                value: other.to_string(),
            })
        }
    };

    entry.units = obj.get("units").and_then(Value::as_str).map(str::to_string);

    Ok(entry)
}
