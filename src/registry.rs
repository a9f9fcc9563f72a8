//! # Signal Registry
//!
//! Maps every known signal name to a [`NormalizationRule`]: how to turn the raw
//! value into `[0.0, 1.0]`, how much it weighs by default, and which way it points.
//!
//! - Built-in seed comes from the closed per-modality enums below.
//! - An optional JSON file can override or extend the seed (plus aliases).
//! - Case-insensitive lookup; `-`, spaces, `.` and `/` are read as `_`.
//! - Lookup order: aliases → exact canonical name → not found.
//!
//! Loaded once at start-up and never mutated afterwards.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::error::json_kind;
use crate::signal::{Modality, Polarity, RawValue};
use crate::signal::Polarity::{SupportsAuthentic as Authentic, SupportsSynthetic as Synthetic};

pub const DEFAULT_SIGNALS_PATH: &str = "config/signals.json";
pub const ENV_SIGNALS_PATH: &str = "TRUST_SIGNALS_PATH";

/// Declared domain of a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Continuous score, rescaled linearly from `[min, max]`.
    Score { min: f64, max: f64 },
    /// `true` = 1.0, `false` = 0.0. Numbers are read as a probability.
    Boolean,
    /// Non-negative count, saturating at `max`.
    Count { max: f64 },
}

impl Default for ValueDomain {
    fn default() -> Self {
        ValueDomain::Score { min: 0.0, max: 1.0 }
    }
}

/// Outcome of mapping a well-shaped raw value into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapped {
    pub value: f64,
    pub clamped: bool,
}

impl ValueDomain {
    /// Map `raw` into `[0, 1]`. `Err` carries a short reason when the value has
    /// the wrong shape for this domain.
    pub fn apply(&self, raw: &RawValue) -> Result<Mapped, String> {
        match (self, raw) {
            (_, RawValue::Missing) => Err("missing value".to_string()),
            (_, RawValue::Other(v)) => Err(format!("expected a number, got {}", json_kind(v))),
            (_, RawValue::Number(x)) if !x.is_finite() => Err("not a finite number".to_string()),

            (ValueDomain::Boolean, RawValue::Bool(b)) => Ok(Mapped {
                value: if *b { 1.0 } else { 0.0 },
                clamped: false,
            }),
            (ValueDomain::Boolean, RawValue::Number(x)) => Ok(clamp_into(*x, 0.0, 1.0, |c| c)),

            (_, RawValue::Bool(_)) => Err("expected a number, got a boolean".to_string()),

            (ValueDomain::Score { min, max }, RawValue::Number(x)) => {
                let (lo, hi) = (*min, *max);
                Ok(clamp_into(*x, lo, hi, |c| rescale(c, lo, hi)))
            }
            (ValueDomain::Count { max }, RawValue::Number(x)) => {
                let hi = *max;
                Ok(clamp_into(*x, 0.0, hi, |c| rescale(c, 0.0, hi)))
            }
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        match *self {
            ValueDomain::Score { min, max } => {
                if !(min.is_finite() && max.is_finite() && min < max) {
                    bail!("score domain needs finite min < max, got [{min}, {max}]");
                }
            }
            ValueDomain::Count { max } => {
                if !(max.is_finite() && max > 0.0) {
                    bail!("count domain needs a finite max > 0, got {max}");
                }
            }
            ValueDomain::Boolean => {}
        }
        Ok(())
    }
}

fn clamp_into(x: f64, lo: f64, hi: f64, map: impl Fn(f64) -> f64) -> Mapped {
    let c = x.clamp(lo, hi);
    Mapped {
        value: map(c).clamp(0.0, 1.0),
        clamped: c != x,
    }
}

fn rescale(x: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span <= 0.0 {
        0.0
    } else {
        (x - lo) / span
    }
}

/// How one signal is normalized and how much it counts by default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationRule {
    pub domain: ValueDomain,
    pub weight: f64,
    pub polarity: Polarity,
    /// Human label used in explanations.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
}

impl NormalizationRule {
    fn new(domain: ValueDomain, weight: f64, polarity: Polarity, label: &str) -> Self {
        Self {
            domain,
            weight,
            polarity,
            label: label.to_string(),
            modality: None,
        }
    }

    fn check(&self, name: &str) -> anyhow::Result<()> {
        self.domain
            .check()
            .with_context(|| format!("signal `{name}`"))?;
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            bail!("signal `{name}`: weight must be finite and >= 0, got {}", self.weight);
        }
        Ok(())
    }
}

/// Shared capability of every known per-modality signal.
pub trait Normalizable {
    fn name(&self) -> &'static str;
    fn modality(&self) -> Modality;
    fn rule(&self) -> NormalizationRule;
}

fn score01(weight: f64, polarity: Polarity, label: &str) -> NormalizationRule {
    NormalizationRule::new(ValueDomain::default(), weight, polarity, label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSignal {
    NoiseArtifact,
    MetadataMismatch,
    FaceSymmetryAnomaly,
    CompressionInconsistency,
    ElaHotspots,
    ExifPresent,
}

impl ImageSignal {
    pub const ALL: [ImageSignal; 6] = [
        ImageSignal::NoiseArtifact,
        ImageSignal::MetadataMismatch,
        ImageSignal::FaceSymmetryAnomaly,
        ImageSignal::CompressionInconsistency,
        ImageSignal::ElaHotspots,
        ImageSignal::ExifPresent,
    ];
}

impl Normalizable for ImageSignal {
    fn name(&self) -> &'static str {
        match self {
            ImageSignal::NoiseArtifact => "noise_artifact",
            ImageSignal::MetadataMismatch => "metadata_mismatch",
            ImageSignal::FaceSymmetryAnomaly => "face_symmetry_anomaly",
            ImageSignal::CompressionInconsistency => "compression_inconsistency",
            ImageSignal::ElaHotspots => "ela_hotspots",
            ImageSignal::ExifPresent => "exif_present",
        }
    }

    fn modality(&self) -> Modality {
        Modality::Image
    }

    fn rule(&self) -> NormalizationRule {
        match self {
            ImageSignal::NoiseArtifact => score01(0.40, Synthetic, "Noise artifacts"),
            ImageSignal::MetadataMismatch => score01(0.30, Synthetic, "Metadata mismatch"),
            ImageSignal::FaceSymmetryAnomaly => score01(0.30, Synthetic, "Facial symmetry anomaly"),
            ImageSignal::CompressionInconsistency => {
                score01(0.20, Synthetic, "Compression inconsistency")
            }
            ImageSignal::ElaHotspots => NormalizationRule::new(
                ValueDomain::Count { max: 20.0 },
                0.20,
                Synthetic,
                "Error-level analysis hotspots",
            ),
            ImageSignal::ExifPresent => NormalizationRule::new(
                ValueDomain::Boolean,
                0.10,
                Authentic,
                "Camera EXIF data present",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSignal {
    ClassifierAiProbability,
    Perplexity,
    Burstiness,
    RepetitionRatio,
    AiPhraseHits,
}

impl TextSignal {
    pub const ALL: [TextSignal; 5] = [
        TextSignal::ClassifierAiProbability,
        TextSignal::Perplexity,
        TextSignal::Burstiness,
        TextSignal::RepetitionRatio,
        TextSignal::AiPhraseHits,
    ];
}

impl Normalizable for TextSignal {
    fn name(&self) -> &'static str {
        match self {
            TextSignal::ClassifierAiProbability => "classifier_ai_probability",
            TextSignal::Perplexity => "perplexity",
            TextSignal::Burstiness => "burstiness",
            TextSignal::RepetitionRatio => "repetition_ratio",
            TextSignal::AiPhraseHits => "ai_phrase_hits",
        }
    }

    fn modality(&self) -> Modality {
        Modality::Text
    }

    fn rule(&self) -> NormalizationRule {
        match self {
            TextSignal::ClassifierAiProbability => {
                score01(0.50, Synthetic, "AI text classifier probability")
            }
            // High perplexity reads as human-written.
            TextSignal::Perplexity => NormalizationRule::new(
                ValueDomain::Score { min: 0.0, max: 200.0 },
                0.30,
                Authentic,
                "Perplexity",
            ),
            TextSignal::Burstiness => score01(0.30, Authentic, "Sentence burstiness"),
            TextSignal::RepetitionRatio => score01(0.20, Synthetic, "Phrase repetition"),
            TextSignal::AiPhraseHits => NormalizationRule::new(
                ValueDomain::Count { max: 10.0 },
                0.20,
                Synthetic,
                "Stock AI phrasing",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailSignal {
    HeaderAnomaly,
    SpfFail,
    DkimFail,
    SenderDomainMismatch,
    SuspiciousLinks,
    UrgencyLanguage,
}

impl EmailSignal {
    pub const ALL: [EmailSignal; 6] = [
        EmailSignal::HeaderAnomaly,
        EmailSignal::SpfFail,
        EmailSignal::DkimFail,
        EmailSignal::SenderDomainMismatch,
        EmailSignal::SuspiciousLinks,
        EmailSignal::UrgencyLanguage,
    ];
}

impl Normalizable for EmailSignal {
    fn name(&self) -> &'static str {
        match self {
            EmailSignal::HeaderAnomaly => "header_anomaly",
            EmailSignal::SpfFail => "spf_fail",
            EmailSignal::DkimFail => "dkim_fail",
            EmailSignal::SenderDomainMismatch => "sender_domain_mismatch",
            EmailSignal::SuspiciousLinks => "suspicious_links",
            EmailSignal::UrgencyLanguage => "urgency_language",
        }
    }

    fn modality(&self) -> Modality {
        Modality::Email
    }

    fn rule(&self) -> NormalizationRule {
        match self {
            EmailSignal::HeaderAnomaly => score01(0.30, Synthetic, "Header anomalies"),
            EmailSignal::SpfFail => {
                NormalizationRule::new(ValueDomain::Boolean, 0.20, Synthetic, "SPF check failed")
            }
            EmailSignal::DkimFail => {
                NormalizationRule::new(ValueDomain::Boolean, 0.20, Synthetic, "DKIM check failed")
            }
            EmailSignal::SenderDomainMismatch => NormalizationRule::new(
                ValueDomain::Boolean,
                0.30,
                Synthetic,
                "Sender/reply-to domain mismatch",
            ),
            EmailSignal::SuspiciousLinks => NormalizationRule::new(
                ValueDomain::Count { max: 5.0 },
                0.30,
                Synthetic,
                "Suspicious links",
            ),
            EmailSignal::UrgencyLanguage => score01(0.20, Synthetic, "Urgency language"),
        }
    }
}

/// Any signal the crate knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownSignal {
    Image(ImageSignal),
    Text(TextSignal),
    Email(EmailSignal),
}

impl KnownSignal {
    pub fn all() -> impl Iterator<Item = KnownSignal> {
        ImageSignal::ALL
            .into_iter()
            .map(KnownSignal::Image)
            .chain(TextSignal::ALL.into_iter().map(KnownSignal::Text))
            .chain(EmailSignal::ALL.into_iter().map(KnownSignal::Email))
    }
}

impl Normalizable for KnownSignal {
    fn name(&self) -> &'static str {
        match self {
            KnownSignal::Image(s) => s.name(),
            KnownSignal::Text(s) => s.name(),
            KnownSignal::Email(s) => s.name(),
        }
    }

    fn modality(&self) -> Modality {
        match self {
            KnownSignal::Image(s) => s.modality(),
            KnownSignal::Text(s) => s.modality(),
            KnownSignal::Email(s) => s.modality(),
        }
    }

    fn rule(&self) -> NormalizationRule {
        let mut rule = match self {
            KnownSignal::Image(s) => s.rule(),
            KnownSignal::Text(s) => s.rule(),
            KnownSignal::Email(s) => s.rule(),
        };
        rule.modality = Some(self.modality());
        rule
    }
}

/// Partial rule as written in the registry file; unset fields keep the seed value.
#[derive(Debug, Clone, Default, Deserialize)]
struct RuleOverride {
    domain: Option<ValueDomain>,
    weight: Option<f64>,
    polarity: Option<Polarity>,
    label: Option<String>,
    modality: Option<Modality>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    signals: HashMap<String, RuleOverride>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// Read-only name → rule table.
#[derive(Debug, Clone)]
pub struct SignalRegistry {
    rules: HashMap<String, NormalizationRule>,
    aliases: HashMap<String, String>,
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignalRegistry {
    /// Seed built from the per-modality enums, plus a few common spellings.
    pub fn builtin() -> Self {
        let rules = KnownSignal::all()
            .map(|s| (s.name().to_string(), s.rule()))
            .collect();

        let mut aliases = HashMap::new();
        for (a, c) in [
            ("noise", "noise_artifact"),
            ("noise_artifacts", "noise_artifact"),
            ("exif", "exif_present"),
            ("ela", "ela_hotspots"),
            ("ai_probability", "classifier_ai_probability"),
            ("spf", "spf_fail"),
            ("dkim", "dkim_fail"),
            ("links", "suspicious_links"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self { rules, aliases }
    }

    /// Builtin seed with the JSON document `json` applied on top.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let file: RegistryFile = serde_json::from_str(json).context("parsing signal registry")?;
        let mut reg = Self::builtin();

        for (name, ov) in file.signals {
            let key = normalize_name(&name);
            if key.is_empty() {
                bail!("signal registry contains an empty signal name");
            }
            let rule = reg
                .rules
                .entry(key.clone())
                .or_insert_with(|| NormalizationRule::new(ValueDomain::default(), 0.0, Synthetic, &key));
            if let Some(d) = ov.domain {
                rule.domain = d;
            }
            if let Some(w) = ov.weight {
                rule.weight = w;
            }
            if let Some(p) = ov.polarity {
                rule.polarity = p;
            }
            if let Some(l) = ov.label {
                rule.label = l;
            }
            if ov.modality.is_some() {
                rule.modality = ov.modality;
            }
            rule.check(&key)?;
        }

        for (alias, canon) in file.aliases {
            let canon = normalize_name(&canon);
            if !reg.rules.contains_key(&canon) {
                bail!("alias `{alias}` points to unknown signal `{canon}`");
            }
            reg.aliases.insert(normalize_name(&alias), canon);
        }

        Ok(reg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading signal registry from {}", path.display()))?;
        Self::from_json_str(&s).with_context(|| format!("in {}", path.display()))
    }

    /// `$TRUST_SIGNALS_PATH` or `config/signals.json`; falls back to the
    /// builtin seed when the file is absent or unusable.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_SIGNALS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SIGNALS_PATH));

        if !path.exists() {
            return Self::builtin();
        }
        match Self::load_from_file(&path) {
            Ok(reg) => {
                info!(path = %path.display(), signals = reg.len(), "signal registry loaded");
                reg
            }
            Err(e) => {
                warn!(path = %path.display(), error = ?e, "signal registry unusable; using builtin seed");
                Self::builtin()
            }
        }
    }

    pub fn lookup(&self, signal_name: &str) -> Option<&NormalizationRule> {
        self.resolve(signal_name).map(|(_, rule)| rule)
    }

    /// Canonical name and rule for `signal_name`, if known.
    pub fn resolve(&self, signal_name: &str) -> Option<(&str, &NormalizationRule)> {
        let s = normalize_name(signal_name);

        if let Some(canon) = self.aliases.get(&s) {
            if let Some((k, rule)) = self.rules.get_key_value(canon) {
                return Some((k.as_str(), rule));
            }
        }

        self.rules
            .get_key_value(&s)
            .map(|(k, rule)| (k.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules sorted by canonical name.
    pub fn entries(&self) -> Vec<(&str, &NormalizationRule)> {
        let mut v: Vec<_> = self.rules.iter().map(|(k, r)| (k.as_str(), r)).collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }
}

/// Lowercase, map separators to `_`, collapse runs of `_`.
pub fn normalize_name(s: &str) -> String {
    let lowered = s.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_sep = false;
    for ch in lowered.chars() {
        let sep = matches!(ch, '_' | '-' | ' ' | '.' | '/' | '\t');
        if sep {
            if !last_sep && !out.is_empty() {
                out.push('_');
            }
            last_sep = true;
        } else {
            out.push(ch);
            last_sep = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
