// tests/pipeline_properties.rs
//
// Randomized property checks over the pure pipeline. Seeded RNG so failures
// reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trust_engine::aggregate::{aggregate, trust_score};
use trust_engine::normalizer::normalize;
use trust_engine::registry::{KnownSignal, Normalizable};
use trust_engine::{
    EngineConfig, Modality, Polarity, SignalBundle, SignalEntry, SignalRegistry, TrustEngine,
    Verdict, VerdictBands,
};

const ITERATIONS: usize = 500;

fn known_names() -> Vec<&'static str> {
    KnownSignal::all().map(|s| s.name()).collect()
}

fn random_entry(rng: &mut StdRng, name: &str, weight: f64) -> SignalEntry {
    let polarity = if rng.random_bool(0.5) {
        Polarity::SupportsSynthetic
    } else {
        Polarity::SupportsAuthentic
    };
    SignalEntry::number(name, rng.random_range(-0.5..=1.5))
        .weighted(weight)
        .polarity(polarity)
}

/// Up to `max` known signals, random values (some out of domain), random weights
/// (some zero), random polarity; occasionally an unknown name.
fn random_bundle(rng: &mut StdRng, max: usize) -> SignalBundle {
    let names = known_names();
    let n = rng.random_range(0..=max.min(names.len()));
    let mut b = SignalBundle::new(Modality::Image);
    for name in names.iter().take(n) {
        let w = if rng.random_bool(0.1) {
            0.0
        } else {
            rng.random_range(0.0..=1.0)
        };
        let e = random_entry(rng, name, w);
        b.push(e).expect("unique names");
    }
    if rng.random_bool(0.2) {
        b.push(SignalEntry::number("not_a_registered_signal", 0.9))
            .expect("unique names");
    }
    b
}

#[test]
fn probability_bounds_and_trust_score_derivation() {
    let mut rng = StdRng::seed_from_u64(7);
    let reg = SignalRegistry::builtin();
    let cfg = EngineConfig::default();

    for _ in 0..ITERATIONS {
        let bundle = random_bundle(&mut rng, 17);
        let signals = normalize(&bundle, &reg);
        let r = aggregate(&signals, &cfg);

        assert!(
            (0.0..=1.0).contains(&r.ai_probability),
            "probability out of range: {}",
            r.ai_probability
        );
        assert_eq!(r.trust_score, trust_score(r.ai_probability));
        assert_eq!(
            r.trust_score as f64,
            (100.0 * (1.0 - r.ai_probability)).round()
        );
    }
}

#[test]
fn verdict_is_monotonic_in_probability() {
    let mut rng = StdRng::seed_from_u64(11);

    let mut bands = vec![VerdictBands::default()];
    for _ in 0..20 {
        let mut cuts = [0.0f64; 4];
        for c in cuts.iter_mut() {
            *c = rng.random_range(0.01..0.99);
        }
        cuts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        if let Ok(b) = VerdictBands::new(cuts) {
            bands.push(b);
        }
    }

    for b in &bands {
        let mut ps: Vec<f64> = (0..2_000).map(|_| rng.random_range(0.0..=1.0)).collect();
        ps.extend([0.0, 1.0]);
        ps.extend(b.cuts());
        ps.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut prev = Verdict::Authentic;
        for p in ps {
            let v = b.classify(p);
            assert!(v >= prev, "verdict dropped at p={p}: {prev:?} -> {v:?} (cuts {:?})", b.cuts());
            prev = v;
        }
        assert_eq!(b.classify(1.0), Verdict::Manipulated);
        assert_eq!(b.classify(0.0), Verdict::Authentic);
    }
}

#[test]
fn removing_a_non_decisive_signal_moves_at_most_one_band() {
    let mut rng = StdRng::seed_from_u64(23);
    let reg = SignalRegistry::builtin();
    let cfg = EngineConfig::default();
    let names = known_names();

    for _ in 0..ITERATIONS {
        // 12+ signals weighted 0.5..=1.0 keep any single weight share under 0.16,
        // below the 0.20 band width.
        let n = rng.random_range(12..=names.len());
        let mut full = SignalBundle::new(Modality::Text);
        for name in names.iter().take(n) {
            let w = rng.random_range(0.5..=1.0);
            full.push(random_entry(&mut rng, name, w)).unwrap();
        }

        let drop_idx = rng.random_range(0..n);
        let total: f64 = full.entries().iter().filter_map(|e| e.weight).sum();
        let share = full.entries()[drop_idx].weight.unwrap() / total;
        assert!(share < 0.2, "generator produced a decisive signal");

        let mut reduced = SignalBundle::new(Modality::Text);
        for (i, e) in full.entries().iter().enumerate() {
            if i != drop_idx {
                reduced.push(e.clone()).unwrap();
            }
        }

        let a = aggregate(&normalize(&full, &reg), &cfg);
        let b = aggregate(&normalize(&reduced, &reg), &cfg);
        let diff = (a.verdict.rank() as i64 - b.verdict.rank() as i64).abs();
        assert!(
            diff <= 1,
            "verdict jumped {diff} bands ({:?} -> {:?}, p {} -> {})",
            a.verdict,
            b.verdict,
            a.ai_probability,
            b.ai_probability
        );
    }
}

#[test]
fn identical_input_gives_byte_identical_output() {
    let mut rng = StdRng::seed_from_u64(31);
    let engine = TrustEngine::default();

    for _ in 0..100 {
        let bundle = random_bundle(&mut rng, 17);
        let copy = bundle.clone();

        let first = serde_json::to_vec(&engine.assess(&bundle)).unwrap();
        let second = serde_json::to_vec(&engine.assess(&bundle)).unwrap();
        let third = serde_json::to_vec(&engine.assess(&copy)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, third);
    }
}

#[test]
fn explanation_only_names_input_signals() {
    let mut rng = StdRng::seed_from_u64(43);
    let engine = TrustEngine::default();

    for _ in 0..ITERATIONS {
        let bundle = random_bundle(&mut rng, 17);
        let a = engine.assess(&bundle);
        let names: Vec<&str> = bundle.names().collect();
        for f in &a.explanation.factors {
            assert!(names.contains(&f.signal.as_str()), "unknown factor {}", f.signal);
        }
        assert!(a.explanation.factors.len() <= engine.config().max_factors);

        // Ranking never increases down the list.
        for pair in a.explanation.factors.windows(2) {
            assert!(pair[0].contribution >= pair[1].contribution);
        }
    }
}
