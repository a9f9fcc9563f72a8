//! Prometheus counters for the serving layer. The engine itself records nothing.

use anyhow::Context;
use axum::{routing::get, Router};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::assessment::TrustAssessment;
use crate::signal::Modality;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_assessment(modality: Modality, a: &TrustAssessment) {
    counter!(
        "trust_assessments_total",
        "modality" => modality.as_str(),
        "verdict" => a.verdict.as_str()
    )
    .increment(1);

    for s in a.excluded() {
        counter!("trust_signals_excluded_total", "status" => s.status.as_str()).increment(1);
    }
}

pub fn record_validation_error() {
    counter!("trust_validation_errors_total").increment(1);
}
