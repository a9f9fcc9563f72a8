// src/config/engine.rs
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::verdict::VerdictBands;

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";

pub const ENV_ENGINE_CONFIG_PATH: &str = "TRUST_CONFIG_PATH";
pub const ENV_MIN_USABLE_SIGNALS: &str = "TRUST_MIN_USABLE_SIGNALS";
pub const ENV_MAX_FACTORS: &str = "TRUST_MAX_FACTORS";

fn default_min_usable_signals() -> usize {
    2
}
fn default_max_factors() -> usize {
    3
}

/// Tunables for one engine instance. Every field is optional in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Verdict cut points, ascending.
    #[serde(default)]
    pub bands: VerdictBands,
    /// Below this many usable signals the result is flagged low-confidence.
    #[serde(default = "default_min_usable_signals")]
    pub min_usable_signals: usize,
    /// How many ranked factors the explanation lists (K).
    #[serde(default = "default_max_factors")]
    pub max_factors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bands: VerdictBands::default(),
            min_usable_signals: default_min_usable_signals(),
            max_factors: default_max_factors(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.bands.validate()?;
        if self.max_factors == 0 {
            bail!("max_factors must be at least 1");
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: EngineConfig = toml::from_str(s).context("parsing engine config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("in {}", path.display()))
    }

    /// Resolve the config the binary runs with:
    /// 1) `$TRUST_CONFIG_PATH` (must exist) or `config/engine.toml` (optional)
    /// 2) defaults when neither is present
    /// 3) `$TRUST_MIN_USABLE_SIGNALS` / `$TRUST_MAX_FACTORS` on top
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = match env::var(ENV_ENGINE_CONFIG_PATH) {
            Ok(p) => Self::load_from_file(PathBuf::from(p))?,
            Err(_) => {
                let p = PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH);
                if p.exists() {
                    Self::load_from_file(&p)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(n) = parse_usize_env(ENV_MIN_USABLE_SIGNALS) {
            cfg.min_usable_signals = n;
        }
        if let Some(n) = parse_usize_env(ENV_MAX_FACTORS) {
            cfg.max_factors = n;
        }

        cfg.validate()?;
        info!(
            bands = ?cfg.bands.cuts(),
            min_usable_signals = cfg.min_usable_signals,
            max_factors = cfg.max_factors,
            "engine config resolved"
        );
        Ok(cfg)
    }
}

// Unparsable values are ignored, not fatal.
fn parse_usize_env(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-integer env override");
            None
        }
    }
}
