use super::*;
use proptest::prelude::*;

fn scenario_params() -> WaveParameters {
    WaveParameters {
        amplitude: 50.0,
        frequency: 3.0,
        phase: 0.0,
        complexity: 0.0,
        chaos: 0.0,
        damping: 1.0,
        layers: 1,
    }
}

#[test]
fn centered_start_and_trough_at_quarter() {
    let mut g = WaveGenerator::new(scenario_params(), None);
    let layers = g.generate(&GenerationOptions::new(600.0, 600.0, 40));
    assert_eq!(layers.len(), 1);
    let layer = &layers[0];
    assert_eq!(layer.len(), 40);

    assert_eq!(layer[0].x, 0.0);
    assert!((layer[0].y - 300.0).abs() < 1e-9);
    assert!(layer[0].intensity.abs() < 1e-9);

    // t = 10/40 = 0.25 -> angle 1.5 pi -> sin = -1
    let p = layer[10];
    assert!((p.x - 150.0).abs() < 1e-9);
    assert!((p.y - 250.0).abs() < 1e-9, "{}", p.y);
    assert!((p.intensity - 50.0 / 300.0).abs() < 1e-9);
    assert!((p.phase - 1.5 * PI).abs() < 1e-9);
}

#[test]
fn zero_resolution_yields_empty_layers() {
    let mut g = WaveGenerator::new(
        WaveParameters {
            layers: 3,
            ..WaveParameters::default()
        },
        Some("s"),
    );
    let layers = g.generate(&GenerationOptions::new(100.0, 100.0, 0));
    assert_eq!(layers.len(), 3);
    assert!(layers.iter().all(Vec::is_empty));
}

#[test]
fn zero_complexity_is_pure_fundamental() {
    let params = WaveParameters {
        complexity: 0.0,
        chaos: 0.0,
        ..WaveParameters::default()
    };
    assert!(params.max_harmonic() < 2);
    let mut g = WaveGenerator::new(params, None);
    let opts = GenerationOptions::new(200.0, 200.0, 16).with_time(0.7);
    let layer = g.generate_layer(&opts, 1, opts.time);
    for (i, p) in layer.iter().enumerate() {
        let t = i as f64 / 16.0;
        let angle = t * g.layer_frequency(1) * PI * 2.0 + g.layer_phase(1);
        let expected = 100.0 + (angle + 0.7).sin() * g.layer_amplitude(1);
        assert!((p.y - expected).abs() < 1e-9);
    }
}

#[test]
fn complexity_adds_harmonics() {
    let base = WaveParameters {
        chaos: 0.0,
        complexity: 0.0,
        layers: 1,
        ..WaveParameters::default()
    };
    let rich = WaveParameters {
        complexity: 1.0,
        ..base
    };
    let opts = GenerationOptions::new(300.0, 300.0, 64);
    let a = WaveGenerator::new(base, None).generate(&opts);
    let b = WaveGenerator::new(rich, None).generate(&opts);
    assert_eq!(rich.max_harmonic(), 5);
    assert!(a[0].iter().zip(&b[0]).any(|(p, q)| (p.y - q.y).abs() > 1e-6));
}

#[test]
fn single_layer_ignores_damping() {
    let opts = GenerationOptions::new(120.0, 80.0, 30);
    let a = WaveGenerator::new(
        WaveParameters {
            damping: 0.2,
            chaos: 0.0,
            layers: 1,
            ..WaveParameters::default()
        },
        None,
    )
    .generate(&opts);
    let b = WaveGenerator::new(
        WaveParameters {
            damping: 1.0,
            chaos: 0.0,
            layers: 1,
            ..WaveParameters::default()
        },
        None,
    )
    .generate(&opts);
    assert_eq!(a, b);
}

#[test]
fn out_of_range_parameters_are_clamped() {
    let p = WaveParameters {
        amplitude: -5.0,
        frequency: f64::NAN,
        phase: f64::INFINITY,
        complexity: 7.0,
        chaos: -1.0,
        damping: 0.0,
        layers: 0,
    }
    .clamped();
    assert_eq!(p.amplitude, MIN_POSITIVE);
    assert_eq!(p.frequency, WaveParameters::default().frequency);
    assert_eq!(p.phase, 0.0);
    assert_eq!(p.complexity, 1.0);
    assert_eq!(p.chaos, 0.0);
    assert_eq!(p.damping, MIN_POSITIVE);
    assert_eq!(p.layers, 1);
    assert_eq!(
        WaveParameters {
            layers: 10_000,
            ..WaveParameters::default()
        }
        .clamped()
        .layers,
        MAX_LAYERS
    );
}

#[test]
fn degenerate_extent_never_produces_nan() {
    let mut g = WaveGenerator::new(WaveParameters::default(), Some("x"));
    let opts = GenerationOptions::new(-10.0, 0.0, 8).with_time(f64::NAN);
    for layer in g.generate(&opts) {
        for p in layer {
            assert!(p.x.is_finite() && p.y.is_finite() && p.intensity.is_finite());
            assert!((0.0..=1.0).contains(&p.intensity));
        }
    }
}

#[test]
fn update_params_merges_and_keeps_stream() {
    let mut g = WaveGenerator::new(WaveParameters::default(), Some("keep"));
    g.update_params(&WaveUpdate {
        amplitude: Some(80.0),
        layers: Some(4),
        ..WaveUpdate::default()
    });
    assert_eq!(g.params().amplitude, 80.0);
    assert_eq!(g.params().layers, 4);
    assert_eq!(g.params().frequency, WaveParameters::default().frequency);
    assert_eq!(g.seed(), Some("keep"));

    let update: WaveUpdate = serde_json::from_str(r#"{"damping": 2.0}"#).unwrap();
    g.update_params(&update);
    assert_eq!(g.params().damping, 1.0);
}

#[test]
fn chaos_advances_the_stream_between_calls() {
    let params = WaveParameters {
        chaos: 0.8,
        ..WaveParameters::default()
    };
    let opts = GenerationOptions::new(100.0, 100.0, 20);
    let mut g = WaveGenerator::new(params, Some("stream"));
    let first = g.generate(&opts);
    let second = g.generate(&opts);
    assert_ne!(first, second);

    let mut fresh = WaveGenerator::new(params, Some("stream"));
    assert_eq!(fresh.generate(&opts), first);
}

#[test]
fn nested_generation_uses_default_ratios() {
    let params = WaveParameters {
        chaos: 0.0,
        ..WaveParameters::default()
    };
    let mut g = WaveGenerator::new(params, Some("nest"));
    let opts = GenerationOptions::new(400.0, 200.0, 40);
    let nested = g.generate_nested(&opts, &NestingRatios::default());
    assert_eq!(nested.container.len(), 10);
    assert_eq!(nested.segments.len(), 9);
    assert!(nested.segments.iter().all(|s| s.len() == 20));

    for (i, seg) in nested.segments.iter().enumerate() {
        let start = nested.container[i];
        let end = nested.container[i + 1];
        assert!((seg[0].x - start.x).abs() < 1e-9);
        assert!(seg.iter().all(|p| p.x >= start.x - 1e-9 && p.x < end.x));
    }
    assert_eq!(nested.detail_points().count(), 9 * 20);
}

#[test]
fn nested_generation_is_reproducible_for_seeded_parent() {
    let params = WaveParameters {
        chaos: 0.5,
        ..WaveParameters::default()
    };
    let opts = GenerationOptions::new(300.0, 300.0, 32);
    let a = WaveGenerator::new(params, Some("n")).generate_nested(&opts, &NestingRatios::default());
    let b = WaveGenerator::new(params, Some("n")).generate_nested(&opts, &NestingRatios::default());
    assert_eq!(a, b);
}

#[test]
fn tiny_resolution_gives_no_segments() {
    let mut g = WaveGenerator::new(WaveParameters::default(), None);
    let nested = g.generate_nested(&GenerationOptions::new(100.0, 100.0, 7), &NestingRatios::default());
    assert_eq!(nested.container.len(), 1);
    assert!(nested.segments.is_empty());
}

fn arb_params() -> impl Strategy<Value = WaveParameters> {
    (
        1.0f64..200.0,
        0.1f64..10.0,
        -10.0f64..10.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.05f64..=1.0,
        1u32..8,
    )
        .prop_map(
            |(amplitude, frequency, phase, complexity, chaos, damping, layers)| WaveParameters {
                amplitude,
                frequency,
                phase,
                complexity,
                chaos,
                damping,
                layers,
            },
        )
}

proptest! {
    #[test]
    fn same_seed_is_bit_identical(params in arb_params(), seed in "[a-z0-9-]{0,12}", res in 0usize..64, time in -5.0f64..5.0) {
        let opts = GenerationOptions::new(320.0, 240.0, res).with_time(time);
        let a = WaveGenerator::new(params, Some(seed.as_str())).generate(&opts);
        let b = WaveGenerator::new(params, Some(seed.as_str())).generate(&opts);
        prop_assert_eq!(a.len(), b.len());
        for (la, lb) in a.iter().zip(&b) {
            for (p, q) in la.iter().zip(lb) {
                prop_assert_eq!(p.x.to_bits(), q.x.to_bits());
                prop_assert_eq!(p.y.to_bits(), q.y.to_bits());
                prop_assert_eq!(p.intensity.to_bits(), q.intensity.to_bits());
                prop_assert_eq!(p.phase.to_bits(), q.phase.to_bits());
            }
        }
    }

    #[test]
    fn layer_count_and_length(params in arb_params(), res in 0usize..128) {
        let layers = WaveGenerator::new(params, Some("count")).generate(&GenerationOptions::new(100.0, 100.0, res));
        prop_assert_eq!(layers.len(), params.layers as usize);
        prop_assert!(layers.iter().all(|l| l.len() == res));
    }

    #[test]
    fn damping_decays_strictly(params in arb_params(), damping in 0.05f64..0.99) {
        let g = WaveGenerator::new(WaveParameters { damping, layers: 2.max(params.layers), ..params }, None);
        for i in 1..g.params().layers {
            prop_assert!(g.layer_amplitude(i) < g.layer_amplitude(i - 1));
        }
    }

    #[test]
    fn zero_chaos_ignores_seed(params in arb_params(), s1 in "[a-z]{1,8}", s2 in "[a-z]{1,8}") {
        let params = WaveParameters { chaos: 0.0, ..params };
        let opts = GenerationOptions::new(200.0, 200.0, 24);
        let a = WaveGenerator::new(params, Some(s1.as_str())).generate(&opts);
        let b = WaveGenerator::new(params, Some(s2.as_str())).generate(&opts);
        let c = WaveGenerator::new(params, None).generate(&opts);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&a, &c);
    }
}
