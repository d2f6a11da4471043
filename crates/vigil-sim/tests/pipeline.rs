use std::fs;
use vigil_core::{
    AnomalyRecord, DetectionError, DetectionReport, DetectorConfig, EwmaConfig, ShEsdConfig,
    ZScoreConfig,
};
use vigil_sim::{
    ArimaParams, GarchParams, GeneratorConfig, InjectionConfig, Orchestrator, RunConfig,
    SeriesSource, add_anomalies, arima_data, data_stream, detect, garch_data, random_walk,
    seasonal_data, seeded_rng,
};

fn zscore() -> DetectorConfig {
    DetectorConfig::ZScore(ZScoreConfig::default())
}

fn shesd(period: usize) -> DetectorConfig {
    DetectorConfig::ShEsd(ShEsdConfig {
        period,
        ..Default::default()
    })
}

#[test]
fn test_zscore_flags_point_after_full_window() {
    let mut series: Vec<f64> = (0..50).map(|i| (i % 2) as f64).collect();
    series.push(100.0);

    let report = detect(&series, &zscore()).unwrap();
    assert_eq!(report.anomalies, vec![AnomalyRecord::new(50, 100.0)]);

    // A window of identical values has no spread to score against
    let mut flat = vec![0.0; 50];
    flat.push(100.0);
    assert!(detect(&flat, &zscore()).unwrap().anomalies.is_empty());
}

#[test]
fn test_constant_series_clean_for_every_detector() {
    let series = vec![5.0; 1000];
    let configs = [
        zscore(),
        DetectorConfig::ZScore(ZScoreConfig {
            incremental: true,
            ..Default::default()
        }),
        DetectorConfig::Ewma(EwmaConfig::default()),
        shesd(100),
    ];
    for config in &configs {
        let report = detect(&series, config).unwrap();
        assert!(
            report.anomalies.is_empty(),
            "{} flagged {:?}",
            report.algorithm,
            report.anomalies
        );
    }
}

#[test]
fn test_shesd_finds_multiplied_point_in_noise_free_seasonal() {
    let mut series = seasonal_data(200, 50, 0.0, &mut seeded_rng(0)).unwrap();
    series[10] *= 100.0;

    let report = detect(&series, &shesd(50)).unwrap();
    assert!(report.is_flagged(10), "flagged {:?}", report.anomalies);
    assert!(report.anomaly_count() <= 10);
    for a in &report.anomalies {
        assert_eq!(a.value, series[a.index]);
    }
}

#[test]
fn test_shesd_recovers_injected_anomalies() {
    let mut rng = seeded_rng(17);
    let base = seasonal_data(2000, 50, 1.0, &mut rng).unwrap();
    let (series, injected) = add_anomalies(&base, 5, 6.0, &mut rng).unwrap();

    let report = detect(&series, &shesd(50)).unwrap();
    for idx in &injected {
        assert!(report.is_flagged(*idx), "missed injected index {}", idx);
    }
}

#[test]
fn test_shesd_short_series_fails_decomposition() {
    let series = seasonal_data(150, 100, 1.0, &mut seeded_rng(3)).unwrap();
    let err = detect(&series, &shesd(100)).unwrap_err();
    assert!(matches!(err, DetectionError::DecompositionFailure(_)));
}

#[test]
fn test_zscore_variants_agree_on_stream() {
    for seed in 0..5 {
        let series = data_stream(1000, &mut seeded_rng(seed)).unwrap();
        let direct = detect(&series, &zscore()).unwrap();
        let incremental = detect(
            &series,
            &DetectorConfig::ZScore(ZScoreConfig {
                incremental: true,
                ..Default::default()
            }),
        )
        .unwrap();
        assert_eq!(
            direct.sorted_indices(),
            incremental.sorted_indices(),
            "seed {}",
            seed
        );
    }
}

#[test]
fn test_seeded_generators_ignore_call_order() {
    let walk_first = random_walk(200, 0.0, 1.0, &mut seeded_rng(11)).unwrap();
    let garch_first = garch_data(200, &GarchParams::default(), &mut seeded_rng(12)).unwrap();

    let garch_second = garch_data(200, &GarchParams::default(), &mut seeded_rng(12)).unwrap();
    let arima = arima_data(200, &ArimaParams::default(), &mut seeded_rng(13)).unwrap();
    let walk_second = random_walk(200, 0.0, 1.0, &mut seeded_rng(11)).unwrap();

    assert_eq!(walk_first, walk_second);
    assert_eq!(garch_first, garch_second);
    assert_eq!(arima.len(), 200);
    assert_ne!(walk_first, garch_first);
}

#[test]
fn test_add_anomalies_properties() {
    let mut rng = seeded_rng(23);
    for trial in 0..20 {
        let series = random_walk(300, 0.0, 1.0, &mut rng).unwrap();
        let count = 1 + trial * 7;
        let (out, indices) = add_anomalies(&series, count, 3.0, &mut rng).unwrap();

        assert_eq!(out.len(), series.len());
        assert_eq!(indices.len(), count);
        let differing = (0..series.len()).filter(|&i| out[i] != series[i]).count();
        assert_eq!(differing, count, "trial {}", trial);
    }

    let series = vec![1.0, 2.0, 3.0];
    assert!(add_anomalies(&[], 1, 3.0, &mut rng).is_err());
    assert!(add_anomalies(&series, 4, 3.0, &mut rng).is_err());
}

#[test]
fn test_file_source_round_trip() {
    let series = seasonal_data(600, 60, 0.5, &mut seeded_rng(2)).unwrap();
    let mut contents = String::from("value\n");
    for x in &series {
        contents.push_str(&format!("{}\n", x));
    }
    let path = std::env::temp_dir().join(format!("vigil-pipeline-{}.txt", std::process::id()));
    fs::write(&path, contents).unwrap();

    let config = RunConfig {
        source: SeriesSource::File(path.clone()),
        detector: shesd(60),
        injection: Some(InjectionConfig {
            count: 3,
            factor: 8.0,
        }),
        seed: Some(4),
    };
    let outcome = Orchestrator::new(config).unwrap().run();
    fs::remove_file(&path).ok();
    let outcome = outcome.unwrap();

    assert_eq!(outcome.series.len(), 600);
    assert_eq!(outcome.injected.len(), 3);
    assert_eq!(outcome.recovered(), outcome.injected);
}

#[test]
fn test_run_config_from_json_file() {
    let path = std::env::temp_dir().join(format!("vigil-run-{}.json", std::process::id()));
    fs::write(
        &path,
        r#"{
            "source": {"generator": {"kind": "data_stream", "steps": 500}},
            "detector": {"method": "zscore", "window_size": 30},
            "seed": 8
        }"#,
    )
    .unwrap();
    let config = RunConfig::from_json_file(&path);
    fs::remove_file(&path).ok();
    let config = config.unwrap();

    assert_eq!(
        config.source,
        SeriesSource::Generator(GeneratorConfig::DataStream { steps: 500 })
    );
    let outcome = Orchestrator::new(config).unwrap().run().unwrap();
    assert_eq!(outcome.report.series_len, 500);
    assert!(outcome.injected.is_empty());
    assert!(outcome.report.anomalies.iter().all(|a| a.index >= 30));
}

#[test]
fn test_report_json_export() {
    let series = data_stream(400, &mut seeded_rng(6)).unwrap();
    let report = detect(&series, &DetectorConfig::Ewma(EwmaConfig::default())).unwrap();

    let json = report.to_json().unwrap();
    let parsed: DetectionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.algorithm, "EWMA");
    assert_eq!(parsed.run_id, report.run_id);
    assert_eq!(parsed.anomalies, report.anomalies);
}
