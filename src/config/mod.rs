// src/config/mod.rs
//! Start-up configuration. Everything here is read once and handed to the
//! engine as plain values.

pub mod engine;

pub use engine::{EngineConfig, DEFAULT_ENGINE_CONFIG_PATH, ENV_ENGINE_CONFIG_PATH};
