//! Verdict Mapper: probability → discrete verdict via ordered threshold bands.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-facing category, ordered from most to least trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Authentic,
    LikelyAuthentic,
    Uncertain,
    LikelyManipulated,
    Manipulated,
}

impl Verdict {
    pub const ALL: [Verdict; 5] = [
        Verdict::Authentic,
        Verdict::LikelyAuthentic,
        Verdict::Uncertain,
        Verdict::LikelyManipulated,
        Verdict::Manipulated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Authentic => "authentic",
            Verdict::LikelyAuthentic => "likely_authentic",
            Verdict::Uncertain => "uncertain",
            Verdict::LikelyManipulated => "likely_manipulated",
            Verdict::Manipulated => "manipulated",
        }
    }

    /// Band index, 0 = authentic.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four strictly increasing cut points splitting `[0, 1]` into five bands.
///
/// Band `i` is `[cut[i-1], cut[i])`; the last band is closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerdictBands {
    cuts: [f64; 4],
}

impl Default for VerdictBands {
    fn default() -> Self {
        Self {
            cuts: [0.20, 0.40, 0.60, 0.80],
        }
    }
}

impl VerdictBands {
    pub fn new(cuts: [f64; 4]) -> anyhow::Result<Self> {
        let b = Self { cuts };
        b.validate()?;
        Ok(b)
    }

    pub fn cuts(&self) -> [f64; 4] {
        self.cuts
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut prev = 0.0;
        for c in self.cuts {
            if !c.is_finite() || c <= prev || c >= 1.0 {
                bail!(
                    "verdict thresholds must be strictly increasing inside (0, 1), got {:?}",
                    self.cuts
                );
            }
            prev = c;
        }
        Ok(())
    }

    /// Pure and monotone: a higher probability never yields a lower verdict.
    pub fn classify(&self, ai_probability: f64) -> Verdict {
        let p = ai_probability.clamp(0.0, 1.0);
        let idx = self.cuts.iter().take_while(|&&c| p >= c).count();
        Verdict::ALL[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands_follow_table() {
        let b = VerdictBands::default();
        assert_eq!(b.classify(0.0), Verdict::Authentic);
        assert_eq!(b.classify(0.1999), Verdict::Authentic);
        assert_eq!(b.classify(0.20), Verdict::LikelyAuthentic);
        assert_eq!(b.classify(0.40), Verdict::Uncertain);
        assert_eq!(b.classify(0.5), Verdict::Uncertain);
        assert_eq!(b.classify(0.60), Verdict::LikelyManipulated);
        assert_eq!(b.classify(0.7999), Verdict::LikelyManipulated);
        assert_eq!(b.classify(0.80), Verdict::Manipulated);
        assert_eq!(b.classify(1.0), Verdict::Manipulated);
    }

    #[test]
    fn custom_bands_are_respected() {
        let b = VerdictBands::new([0.1, 0.3, 0.7, 0.95]).unwrap();
        assert_eq!(b.classify(0.29), Verdict::LikelyAuthentic);
        assert_eq!(b.classify(0.69), Verdict::Uncertain);
        assert_eq!(b.classify(0.95), Verdict::Manipulated);
    }

    #[test]
    fn non_increasing_or_out_of_range_cuts_rejected() {
        assert!(VerdictBands::new([0.2, 0.2, 0.6, 0.8]).is_err());
        assert!(VerdictBands::new([0.0, 0.4, 0.6, 0.8]).is_err());
        assert!(VerdictBands::new([0.2, 0.4, 0.6, 1.0]).is_err());
        assert!(VerdictBands::new([0.2, f64::NAN, 0.6, 0.8]).is_err());
    }

    #[test]
    fn verdict_serializes_snake_case() {
        let v = serde_json::to_value(Verdict::LikelyManipulated).unwrap();
        assert_eq!(v, serde_json::json!("likely_manipulated"));
        assert_eq!(Verdict::Uncertain.rank(), 2);
    }
}
