//! End-to-end properties of the simulator and configuration layers

use geocache_sim::config::{presets, toml as config_toml, validator, Config};
use geocache_sim::distribution::sampler::CoordinateSampler;
use geocache_sim::{SimError, SimulationParams, Simulator, SpatialModel, Subregion};

fn simulator(seed: u64) -> Simulator {
    Simulator::new(SimulationParams {
        seed: Some(seed),
        threads: 2,
        ..SimulationParams::default()
    })
    .unwrap()
}

#[test]
fn hit_rate_stays_in_unit_interval_for_every_preset() {
    let sim = simulator(1);
    for named in presets::default_models() {
        for requests in [1, 100, 2500] {
            let result = sim.aggregate(requests, &named.model, 4320, 3).unwrap();
            assert!(
                (0.0..=1.0).contains(&result.average_hit_rate),
                "{} at {} requests: {}",
                named.name,
                requests,
                result.average_hit_rate
            );
            assert_eq!(result.total_requests(), requests * 3);
        }
    }
}

#[test]
fn zero_requests_yield_empty_aggregate() {
    let sim = simulator(2);
    let model = SpatialModel::Uniform { min: 0.0, max: 5000.0 };
    let result = sim.aggregate(0, &model, 4320, 5).unwrap();

    assert_eq!(result.average_hit_rate, 0.0);
    assert!(result.per_cell_average_hits.is_empty());
    assert_eq!(result.total_requests(), 0);
}

#[test]
fn single_request_always_misses() {
    let sim = simulator(3);
    let model = SpatialModel::Gaussian { mean: 2500.0, stddev: 0.0 };
    let result = sim.aggregate(1, &model, 4320, 4).unwrap();
    assert_eq!(result.average_hit_rate, 0.0);
    assert_eq!(result.total_misses, 4);
}

#[test]
fn sampled_coordinates_stay_inside_area() {
    let mut sampler = CoordinateSampler::with_seed(5000.0, 50.0, 4).unwrap();
    let models = [
        SpatialModel::Gaussian { mean: 0.0, stddev: 3000.0 },
        SpatialModel::Uniform { min: -1000.0, max: 9000.0 },
        presets::default_models()[3].model.clone(),
    ];

    for model in &models {
        for c in sampler.sample_many(model, 5000).unwrap() {
            assert!((0.0..=4999.0).contains(&c.x), "x out of bounds: {}", c.x);
            assert!((0.0..=4999.0).contains(&c.y), "y out of bounds: {}", c.y);
        }
    }
}

#[test]
fn composite_without_fallback_stays_near_centers() {
    let subregions = vec![
        Subregion::new("West", (1000.0, 1000.0), 100.0, 1.0),
        Subregion::new("East", (4000.0, 4000.0), 50.0, 3.0),
    ];
    let model = SpatialModel::Composite {
        subregions: subregions.clone(),
        fallback_weight: 0.0,
    };
    let mut sampler = CoordinateSampler::with_seed(5000.0, 0.0, 5).unwrap();

    for _ in 0..5000 {
        let c = sampler.sample_base(&model).unwrap();
        let near = subregions.iter().any(|s| {
            let d = ((c.x - s.center.0).powi(2) + (c.y - s.center.1).powi(2)).sqrt();
            d <= 6.0 * s.stddev * std::f64::consts::SQRT_2
        });
        assert!(near, "({}, {}) far from every sub-region", c.x, c.y);
    }
}

#[test]
fn uniform_saturation_matches_occupancy_estimate() {
    // 10,000 requests over 2,500 cells, all within one TTL window: the hit
    // rate is 1 - distinct/requests, about 1 - 2500 * (1 - e^-4) / 10000.
    let sim = simulator(6);
    let model = SpatialModel::Uniform { min: 0.0, max: 5000.0 };
    let result = sim.aggregate(10_000, &model, 4320, 5).unwrap();

    assert!(
        (result.average_hit_rate - 0.755).abs() < 0.01,
        "hit rate {}",
        result.average_hit_rate
    );
}

#[test]
fn concentrated_model_beats_uniform() {
    let sim = simulator(7);
    let downtown = SpatialModel::Gaussian { mean: 2500.0, stddev: 150.0 };
    let suburban = SpatialModel::Uniform { min: 0.0, max: 5000.0 };

    let concentrated = sim.aggregate(2500, &downtown, 4320, 5).unwrap();
    let spread = sim.aggregate(2500, &suburban, 4320, 5).unwrap();
    assert!(concentrated.average_hit_rate > spread.average_hit_rate);
}

#[test]
fn fixed_seed_is_bit_identical_across_thread_counts() {
    let model = presets::default_models()[3].model.clone();
    let one = Simulator::new(SimulationParams {
        seed: Some(99),
        threads: 1,
        ..SimulationParams::default()
    })
    .unwrap();
    let four = Simulator::new(SimulationParams {
        seed: Some(99),
        threads: 4,
        ..SimulationParams::default()
    })
    .unwrap();

    let a = one.aggregate(1500, &model, 4320, 6).unwrap();
    let b = four.aggregate(1500, &model, 4320, 6).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_inputs_are_configuration_errors() {
    let sim = simulator(8);
    let model = SpatialModel::Uniform { min: 0.0, max: 5000.0 };

    let err = sim.aggregate(10, &model, 0, 5).unwrap_err();
    assert!(err.is_configuration());

    let err = sim.aggregate(10, &model, 4320, 0).unwrap_err();
    assert!(err.is_configuration());

    let broken = SpatialModel::Gaussian { mean: 100.0, stddev: f64::NAN };
    assert!(matches!(
        sim.aggregate(10, &broken, 4320, 1),
        Err(SimError::Configuration(_))
    ));

    let too_wide = SpatialModel::Uniform { min: -f64::MAX, max: f64::MAX };
    assert!(matches!(
        sim.aggregate(10, &too_wide, 4320, 1),
        Err(SimError::Configuration(_))
    ));

    let params = SimulationParams { jitter: f64::MAX, ..SimulationParams::default() };
    assert!(matches!(Simulator::new(params), Err(SimError::Configuration(_))));
}

#[test]
fn config_file_round_trips_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geocache.toml");

    let mut config = Config::default();
    config.simulation.seed = Some(42);
    config.densities = vec![100, 900];
    std::fs::write(&path, config_toml::to_toml_string(&config).unwrap()).unwrap();

    let loaded = config_toml::parse_toml_file(&path).unwrap();
    assert_eq!(loaded, config);
    validator::validate_config(&loaded).unwrap();
}
