//! End-to-end tests: config file and feature CSV on disk through to a ranked
//! set of research reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use ma_research::config::load_config;
use ma_research::series::{load_feature_csv, load_price_csv};
use ma_research::{ResearchError, evaluate, rank_runs, run_research};

fn temp_dir() -> TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("temp dir: {e}"),
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Err(e) = std::fs::write(&path, contents) {
        panic!("write {name}: {e}");
    }
    path
}

/// Deterministic closes: slow drift plus a 9-day cycle.
fn closes(days: usize, drift: f64) -> Vec<f64> {
    (0..days)
        .map(|i| {
            let cycle = ((i % 9) as f64 - 4.0) * 0.004;
            100.0 * (1.0 + drift).powi(i as i32) * (1.0 + cycle)
        })
        .collect()
}

/// Feature CSV with the column layout the research pipeline has always
/// produced: `Date,Close,ret_1d,ma_20,vol_20`.
fn feature_csv(closes: &[f64]) -> String {
    let Some(start) = NaiveDate::from_ymd_opt(2019, 1, 1) else {
        panic!("valid start date");
    };
    let mut csv = String::from("Date,Close,ret_1d,ma_20,vol_20\n");
    for (i, close) in closes.iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        let ret = i
            .checked_sub(1)
            .map_or_else(String::new, |p| format!("{}", close / closes[p] - 1.0));
        let ma = if i >= 19 {
            format!("{}", closes[i - 19..=i].iter().sum::<f64>() / 20.0)
        } else {
            String::new()
        };
        let vol = if i >= 20 {
            let returns: Vec<f64> = (i - 19..=i).map(|j| closes[j] / closes[j - 1] - 1.0).collect();
            let mean = returns.iter().sum::<f64>() / 20.0;
            let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 19.0;
            format!("{}", var.sqrt())
        } else {
            String::new()
        };
        let _ = writeln!(csv, "{date} 00:00:00,{close},{ret},{ma},{vol}");
    }
    csv
}

fn raw_csv(closes: &[f64]) -> String {
    let Some(start) = NaiveDate::from_ymd_opt(2019, 1, 1) else {
        panic!("valid start date");
    };
    let mut csv = String::from("date,close\n");
    for (i, close) in closes.iter().enumerate() {
        let _ = writeln!(csv, "{},{close}", start + chrono::Duration::days(i as i64));
    }
    csv
}

#[test]
fn config_and_csv_produce_report() {
    let dir = temp_dir();
    let data = write(dir.path(), "features.csv", &feature_csv(&closes(260, 0.001)));
    let config_path = write(
        dir.path(),
        "baseline.yaml",
        &format!(
            "run_name: baseline\nfeature_file: {}\nsearch:\n  windows: [10, 20, 50]\n",
            data.display()
        ),
    );

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => panic!("config should load: {e}"),
    };
    let Some(feature_file) = config.feature_file.as_deref() else {
        panic!("feature_file is set");
    };
    let series = match load_feature_csv(feature_file) {
        Ok(s) => s,
        Err(e) => panic!("series should load: {e}"),
    };
    assert_eq!(series.len(), 260);
    assert!(series.precomputed_moving_average(20).is_some());

    let report = match run_research(&series, &config) {
        Ok(r) => r,
        Err(e) => panic!("research should succeed: {e}"),
    };
    assert_eq!(report.run_name, "baseline");
    assert_eq!(report.search.coarse.len(), 3);
    assert!(report.search.get(report.best().window).is_some());

    let json = match serde_json::to_value(&report) {
        Ok(v) => v,
        Err(e) => panic!("report should serialize: {e}"),
    };
    assert!(json["selection"]["best"]["sharpe"].is_number());
    assert!(json["run_id"].is_string());
}

#[test]
fn precomputed_and_derived_ma_agree() {
    let dir = temp_dir();
    let data = closes(120, 0.0005);
    let features = write(dir.path(), "features.csv", &feature_csv(&data));
    let raw = write(dir.path(), "raw.csv", &raw_csv(&data));

    let (Ok(from_features), Ok(from_raw)) = (load_feature_csv(&features), load_price_csv(&raw))
    else {
        panic!("both series should load");
    };

    let (Ok(a), Ok(b)) = (evaluate(&from_features, 20), evaluate(&from_raw, 20)) else {
        panic!("both evaluations should succeed");
    };
    assert!((a.sharpe - b.sharpe).abs() < 1e-6);
    assert!((a.total_return - b.total_return).abs() < 1e-6);
    assert!((a.max_drawdown - b.max_drawdown).abs() < 1e-6);

    let (Some(vol_a), Some(vol_b)) = (from_features.volatility(20), from_raw.volatility(20)) else {
        panic!("both series should carry vol_20");
    };
    assert_eq!(vol_a.len(), vol_b.len());
    for (x, y) in vol_a.iter().zip(vol_b) {
        match (x, y) {
            (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9),
            (None, None) => {}
            other => panic!("vol_20 definedness differs: {other:?}"),
        }
    }
}

#[test]
fn missing_columns_are_all_reported() {
    let dir = temp_dir();
    let path = write(dir.path(), "bad.csv", "Date,Open,High\n2020-01-01,1,2\n");

    let Err(err) = load_feature_csv(&path) else {
        panic!("expected schema error");
    };
    let message = err.to_string();
    assert!(message.contains("close"));
    assert!(message.contains("daily_return"));
}

#[test]
fn runs_rank_by_best_sharpe() {
    let dir = temp_dir();
    let mut reports = Vec::new();
    for (name, drift) in [("flat", 0.0), ("steep", 0.003), ("gentle", 0.001)] {
        let path = write(
            dir.path(),
            &format!("{name}.csv"),
            &feature_csv(&closes(240, drift)),
        );
        let yaml = format!("run_name: {name}\nsearch:\n  coarse_grid: [10, 20, 50]\n");
        let config = match ma_research::config::load_config_from_string(&yaml) {
            Ok(c) => c,
            Err(e) => panic!("config should parse: {e}"),
        };
        let Ok(series) = load_feature_csv(&path) else {
            panic!("series should load");
        };
        match run_research(&series, &config) {
            Ok(r) => reports.push(r),
            Err(e) => panic!("research should succeed: {e}"),
        }
    }

    let ranked = rank_runs(&reports);
    assert_eq!(ranked.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].best.sharpe >= w[1].best.sharpe));
}

#[test]
fn short_history_fails_fast() {
    let dir = temp_dir();
    let path = write(dir.path(), "short.csv", &feature_csv(&closes(40, 0.001)));
    let Ok(series) = load_feature_csv(&path) else {
        panic!("series should load");
    };
    let config = match ma_research::config::load_config_from_string("run_name: short\n") {
        Ok(c) => c,
        Err(e) => panic!("config should parse: {e}"),
    };

    let result = run_research(&series, &config);
    assert!(matches!(
        result,
        Err(ResearchError::InsufficientHistory { window: 50, .. })
    ));
}

#[test]
fn bundled_configs_are_valid() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
    for name in ["baseline.yaml", "strict_short.yaml"] {
        if let Err(e) = load_config(dir.join(name)) {
            panic!("{name} should load: {e}");
        }
    }
}
