//! Scenario tests on synthetic price histories.
//!
//! Each scenario builds a series from seeded random closes and runs it
//! through the public API: feature builder, engine, search, selection.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ma_research::series::{PriceBar, build_features};
use ma_research::{
    FeatureSeries, Metrics, PricePoint, ResearchError, SelectionPolicy, evaluate, run, search,
    select, select_with_policy,
};

const COARSE_GRID: [usize; 5] = [10, 20, 50, 100, 200];

fn start_date() -> NaiveDate {
    let Some(date) = NaiveDate::from_ymd_opt(2020, 1, 2) else {
        panic!("valid start date");
    };
    date
}

fn series_from_closes(closes: &[f64]) -> FeatureSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar {
            date: start_date() + chrono::Duration::days(i as i64),
            close: *close,
        })
        .collect();
    match build_features("synthetic", bars) {
        Ok(s) => s,
        Err(e) => panic!("features should build: {e}"),
    }
}

/// 300 days of 0.4% daily log drift with +/-1% multiplicative noise.
fn noisy_uptrend(seed: u64) -> FeatureSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let closes: Vec<f64> = (0..300)
        .map(|i| {
            let noise: f64 = rng.random_range(-0.01..0.01);
            100.0 * (0.004 * f64::from(i)).exp() * (1.0 + noise)
        })
        .collect();
    series_from_closes(&closes)
}

/// Zero-drift random walk with uniform +/-1% daily returns.
fn random_walk(seed: u64, days: usize) -> FeatureSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = 100.0;
    let closes: Vec<f64> = (0..days)
        .map(|_| {
            let value = close;
            close *= 1.0 + rng.random_range(-0.01..0.01);
            value
        })
        .collect();
    series_from_closes(&closes)
}

/// Steady climb, then a 50% one-day drop on `crash_day`.
fn crash_series(days: usize, crash_day: usize) -> FeatureSeries {
    let mut close = 100.0;
    let points = (0..days)
        .map(|i| {
            let ret = (i > 0).then(|| if i == crash_day { -0.5 } else { 0.002 });
            close *= 1.0 + ret.unwrap_or(0.0);
            PricePoint::new(start_date() + chrono::Duration::days(i as i64), close, ret)
        })
        .collect();
    match FeatureSeries::new("crash", points) {
        Ok(s) => s,
        Err(e) => panic!("valid series: {e}"),
    }
}

fn coarse_metrics(series: &FeatureSeries) -> Vec<Metrics> {
    COARSE_GRID
        .iter()
        .map(|&w| match evaluate(series, w) {
            Ok(m) => m,
            Err(e) => panic!("window {w} should evaluate: {e}"),
        })
        .collect()
}

#[test]
fn uptrend_favors_short_windows() {
    for seed in [7, 42, 2024] {
        let series = noisy_uptrend(seed);
        let metrics = coarse_metrics(&series);

        let Some(best) = metrics
            .iter()
            .fold(None::<&Metrics>, |best, m| match best {
                Some(b) if m.sharpe <= b.sharpe => Some(b),
                _ => Some(m),
            })
        else {
            panic!("coarse metrics are non-empty");
        };
        assert!(
            best.window == 10 || best.window == 20,
            "seed {seed}: expected MA(10) or MA(20), got MA({})",
            best.window
        );

        for m in &metrics {
            assert!(
                (-0.05..=0.0).contains(&m.max_drawdown),
                "seed {seed}: window {} drawdown {}",
                m.window,
                m.max_drawdown
            );
            assert!(m.total_return > 0.0);
        }
    }
}

#[test]
fn uptrend_search_winner_matches_coarse_stage() {
    let series = noisy_uptrend(11);
    let result = match search(&series, &COARSE_GRID) {
        Ok(r) => r,
        Err(e) => panic!("search should succeed: {e}"),
    };
    assert!(result.best_coarse_window == 10 || result.best_coarse_window == 20);
    assert!(result.refined.iter().all(|m| (5..=40).contains(&m.window)));

    let Ok(selection) = select(&result.into_metrics(), -0.30) else {
        panic!("selection should succeed");
    };
    assert!(!selection.fallback_used);
    assert!(selection.best.window <= 40);
}

#[test]
fn random_walk_has_no_edge() {
    for seed in [1, 2, 3] {
        let series = random_walk(seed, 500);
        for m in coarse_metrics(&series) {
            assert!(
                m.sharpe.abs() < 4.0,
                "seed {seed}: window {} sharpe {}",
                m.window,
                m.sharpe
            );
            assert!(
                m.total_return.abs() < 0.5,
                "seed {seed}: window {} total return {}",
                m.window,
                m.total_return
            );
        }
    }
}

#[test]
fn crash_while_long_breaches_floor() {
    let series = crash_series(120, 100);
    let result = match run(&series, 20) {
        Ok(r) => r,
        Err(e) => panic!("backtest should run: {e}"),
    };

    assert_eq!(result.signal[99], Some(1));
    assert_eq!(result.strategy_return[100], Some(-0.5));
    assert!(result.metrics.max_drawdown <= -0.5);
    assert!(!result.metrics.within_drawdown(-0.30));

    let safe = Metrics {
        window: 50,
        total_return: 0.05,
        max_drawdown: -0.08,
        sharpe: -2.0,
        observations: 119,
        source: "other".to_string(),
    };
    let Ok(selection) = select(&[result.metrics.clone(), safe], -0.30) else {
        panic!("selection should succeed");
    };
    assert_eq!(selection.best.window, 50);
    assert_eq!(selection.ranked.len(), 1);
    assert!(!selection.fallback_used);
}

#[test]
fn crash_for_every_window_falls_back_or_fails_strict() {
    let series = crash_series(160, 150);
    let result = match search(&series, &[10, 20, 50]) {
        Ok(r) => r,
        Err(e) => panic!("search should succeed: {e}"),
    };
    let all = result.into_metrics();
    assert!(all.iter().all(|m| m.max_drawdown <= -0.5));

    let Ok(selection) = select(&all, -0.30) else {
        panic!("fallback should select");
    };
    assert!(selection.fallback_used);
    assert_eq!(selection.ranked.len(), all.len());
    let top = all
        .iter()
        .map(|m| m.sharpe)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(selection.best.sharpe, top);

    let strict = select_with_policy(&all, -0.30, SelectionPolicy::Strict);
    assert!(matches!(strict, Err(ResearchError::NoSafeCandidate { .. })));
}

#[test]
fn grid_longer_than_history_is_rejected() {
    let series = random_walk(5, 120);
    let result = search(&series, &COARSE_GRID);
    assert!(matches!(
        result,
        Err(ResearchError::InsufficientHistory { window: 200, .. })
    ));
}
