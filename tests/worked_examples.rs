// tests/worked_examples.rs
//
// Fixed-input scenarios with hand-computed expectations.

use serde_json::json;

use trust_engine::aggregate::{aggregate, trust_score};
use trust_engine::explain::Direction;
use trust_engine::normalizer::normalize;
use trust_engine::{
    Confidence, EngineConfig, Modality, SignalBundle, SignalRegistry, SignalStatus,
    TrustAssessment, TrustEngine, Verdict,
};

fn assess(modality: Modality, body: serde_json::Value) -> TrustAssessment {
    TrustEngine::default()
        .assess_json(modality, &body)
        .expect("valid bundle")
}

#[test]
fn three_strong_image_signals() {
    let body = json!({
        "noise_artifact":        { "value": 0.9,  "weight": 0.4, "polarity": "supports_synthetic" },
        "metadata_mismatch":     { "value": 0.8,  "weight": 0.3, "polarity": "supports_synthetic" },
        "face_symmetry_anomaly": { "value": 0.85, "weight": 0.3, "polarity": "supports_synthetic" }
    });
    let a = assess(Modality::Image, body.clone());

    // (0.4·0.9 + 0.3·0.8 + 0.3·0.85) / 1.0
    assert_eq!(a.deepfake_probability, 0.855);

    // 100·(1 − 0.855) sits on a .5 boundary, so pin the score to the unrounded probability.
    let bundle = SignalBundle::from_json(Modality::Image, &body).unwrap();
    let raw = aggregate(
        &normalize(&bundle, &SignalRegistry::builtin()),
        &EngineConfig::default(),
    );
    assert!((raw.ai_probability - 0.855).abs() < 1e-12);
    assert_eq!(a.trust_score, trust_score(raw.ai_probability));
    assert_eq!(a.trust_score, raw.trust_score);
    assert_eq!(a.verdict, Verdict::Manipulated);
    assert_eq!(a.details.confidence, Confidence::Normal);

    // contributions 0.16, 0.105, 0.09
    let order: Vec<_> = a.explanation.factors.iter().map(|f| f.signal.as_str()).collect();
    assert_eq!(
        order,
        vec!["noise_artifact", "face_symmetry_anomaly", "metadata_mismatch"]
    );
    assert!(a
        .explanation
        .factors
        .iter()
        .all(|f| f.direction == Direction::Synthetic));
    assert!(a.explanation.summary.contains("manipulated"));
    assert!(a.explanation.summary.contains("0.8550"));
}

#[test]
fn empty_bundle_is_neutral_and_says_so() {
    let a = assess(Modality::Text, json!({}));
    assert_eq!(a.deepfake_probability, 0.5);
    assert_eq!(a.trust_score, 50);
    assert_eq!(a.verdict, Verdict::Uncertain);
    assert_eq!(a.details.confidence, Confidence::Low);
    assert!(a.explanation.factors.is_empty());
    assert!(a.explanation.summary.contains("Insufficient evidence"));
}

#[test]
fn all_zero_weights_behave_like_empty() {
    let empty = assess(Modality::Email, json!({}));
    let zeros = assess(
        Modality::Email,
        json!({
            "spf_fail": { "value": true, "weight": 0 },
            "suspicious_links": { "value": 5, "weight": 0 },
            "urgency_language": { "value": 1.0, "weight": 0 }
        }),
    );

    assert_eq!(zeros.deepfake_probability, empty.deepfake_probability);
    assert_eq!(zeros.trust_score, empty.trust_score);
    assert_eq!(zeros.verdict, empty.verdict);
    assert_eq!(zeros.details.confidence, empty.details.confidence);
    assert_eq!(zeros.explanation, empty.explanation);
    // still visible for transparency
    assert_eq!(zeros.details.signals.len(), 3);
    assert!(zeros.details.signals.iter().all(|s| s.status == SignalStatus::Ok));
}

#[test]
fn unrecognized_signal_is_reported_and_ignored() {
    let a = assess(
        Modality::Image,
        json!({
            "noise_artifact": 0.2,
            "metadata_mismatch": 0.1,
            "diffusion_watermark": { "value": 1.0, "weight": 10.0 }
        }),
    );
    assert_eq!(a.status_of("diffusion_watermark"), Some(SignalStatus::Unrecognized));
    // (0.4·0.2 + 0.3·0.1) / 0.7
    assert!((a.deepfake_probability - 0.1571).abs() < 1e-9);
    assert_eq!(a.verdict, Verdict::Authentic);
    assert_eq!(a.details.usable_signals, 2);
}

#[test]
fn clamped_and_invalid_signals_show_in_details() {
    let a = assess(
        Modality::Text,
        json!({
            "perplexity": { "value": 900, "units": "ppl" },
            "burstiness": { "value": "bursty" },
            "classifier_ai_probability": 0.2
        }),
    );
    assert_eq!(a.status_of("perplexity"), Some(SignalStatus::Clamped));
    assert_eq!(a.status_of("burstiness"), Some(SignalStatus::Invalid));
    assert_eq!(a.status_of("classifier_ai_probability"), Some(SignalStatus::Ok));
    assert_eq!(a.details.usable_signals, 2);

    // perplexity clamps to 200 → 1.0 → authentic evidence 0.0
    // (0.3·0.0 + 0.5·0.2) / 0.8 = 0.125
    assert_eq!(a.deepfake_probability, 0.125);
    assert_eq!(a.verdict, Verdict::Authentic);

    let v = serde_json::to_value(&a).unwrap();
    let signals = v["details"]["signals"].as_array().unwrap();
    assert_eq!(signals[0]["status"], json!("clamped"));
    assert_eq!(signals[0]["units"], json!("ppl"));
    assert_eq!(signals[1]["status"], json!("invalid"));
    assert_eq!(signals[1]["raw"], json!("bursty"));
}

#[test]
fn one_measurement_under_several_names_votes_once() {
    let single = assess(
        Modality::Image,
        json!({ "noise_artifact": 1.0, "exif_present": true }),
    );
    let repeated = assess(
        Modality::Image,
        json!({
            "noise_artifact": 1.0,
            "Noise": 1.0,
            "NOISE-ARTIFACT": 1.0,
            "exif_present": true
        }),
    );

    // 0.4·1.0 / (0.4 + 0.1)
    assert_eq!(single.deepfake_probability, 0.8);
    assert_eq!(repeated.deepfake_probability, 0.8);
    assert_eq!(repeated.trust_score, single.trust_score);
    assert_eq!(repeated.details.usable_signals, 2);
    assert_eq!(repeated.status_of("Noise"), Some(SignalStatus::Invalid));
    assert_eq!(repeated.status_of("NOISE-ARTIFACT"), Some(SignalStatus::Invalid));
    assert_eq!(repeated.excluded().count(), 2);
}

#[test]
fn extreme_weights_stay_a_probability() {
    let a = assess(
        Modality::Image,
        json!({
            "noise_artifact":    { "value": 0.9, "weight": 1e308 },
            "metadata_mismatch": { "value": 0.9, "weight": 1e308 }
        }),
    );
    assert_eq!(a.deepfake_probability, 0.9);
    assert_eq!(a.trust_score, 10);
    assert_eq!(a.verdict, Verdict::Manipulated);
    assert!(a.explanation.factors.iter().all(|f| f.contribution > 0.0));

    let v = serde_json::to_value(&a).unwrap();
    assert!(v["deepfake_probability"].is_f64());
}

#[test]
fn single_signal_is_low_confidence() {
    let a = assess(Modality::Email, json!({ "header_anomaly": 0.95 }));
    assert_eq!(a.details.confidence, Confidence::Low);
    assert_eq!(a.verdict, Verdict::Manipulated);
    assert!(a.explanation.summary.contains("Confidence is low"));
}

#[test]
fn wire_shape_has_contract_fields() {
    let a = assess(Modality::Image, json!({ "noise_artifact": 0.6, "exif_present": true }));
    let v = serde_json::to_value(&a).unwrap();
    for key in ["trust_score", "deepfake_probability", "verdict", "explanation", "details"] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    let f = &v["explanation"]["factors"][0];
    for key in ["signal", "strength", "direction"] {
        assert!(f.get(key).is_some(), "factor missing {key}");
    }
    assert!(v["explanation"]["summary"].is_string());
    assert!(v["details"]["confidence"].is_string());
    assert_eq!(v["details"]["fingerprint"].as_str().unwrap().len(), 12);
}
