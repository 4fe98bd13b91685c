//! Benchmarks for rnd_optimiser.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rnd_core::math::kernel::{norm_cdf, norm_pdf};
use rnd_core::math::linspace;
use rnd_core::types::{BandwidthPair, MarketQuotes, QuoteSide, UnderlyingGrid};
use rnd_optimiser::config::BandwidthSearchConfig;
use rnd_optimiser::cv::CrossValidationEvaluator;
use rnd_optimiser::grid::{GridEvaluator, GridStats};
use rnd_optimiser::search::AdaptiveBandwidthOptimizer;

/// Generate a Bachelier market with `n` strikes per side.
fn generate_market(n: usize) -> MarketQuotes {
    let forward = 100.0;
    let sigma = 8.0;
    let strikes = linspace(70.0, 130.0, n);
    let call_prices: Vec<f64> = strikes
        .iter()
        .map(|&k| {
            let d = (forward - k) / sigma;
            (forward - k) * norm_cdf(d) + sigma * norm_pdf(d)
        })
        .collect();
    let put_prices: Vec<f64> = strikes
        .iter()
        .zip(&call_prices)
        .map(|(&k, &c)| c - (forward - k))
        .collect();
    let weights = vec![1.0; n];
    MarketQuotes::new(
        QuoteSide::new(strikes.clone(), call_prices, weights.clone()).unwrap(),
        QuoteSide::new(strikes, put_prices, weights).unwrap(),
    )
}

fn benchmark_cv_cell(c: &mut Criterion) {
    let mut group = c.benchmark_group("cv_cell");
    let grid = UnderlyingGrid::from_range(60.0, 140.0, 161).unwrap();
    let config = BandwidthSearchConfig::default();

    for size in [10, 20, 40] {
        let market = generate_market(size);
        let evaluator = CrossValidationEvaluator::new(&market, &grid, &config);
        let bw = BandwidthPair::new(2.0, 2.0).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &bw, |b, &bw| {
            b.iter(|| evaluator.evaluate(black_box(bw)))
        });
    }

    group.finish();
}

fn benchmark_grid_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_stage");
    group.sample_size(10);

    let market = generate_market(20);
    let grid = UnderlyingGrid::from_range(60.0, 140.0, 161).unwrap();
    let config = BandwidthSearchConfig::default();
    let evaluator = GridEvaluator::new(CrossValidationEvaluator::new(&market, &grid, &config));

    for m in [8, 16] {
        let hc = linspace(0.5, 6.0, m);
        let hp = linspace(0.5, 6.0, m);

        group.bench_with_input(BenchmarkId::from_parameter(m), &m, |b, _| {
            b.iter(|| {
                let stats = GridStats::new();
                evaluator.evaluate(black_box(&hc), black_box(&hp), &stats)
            })
        });
    }

    group.finish();
}

fn benchmark_adaptive_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_search");
    group.sample_size(10);

    let market = generate_market(20);
    let grid = UnderlyingGrid::from_range(60.0, 140.0, 161).unwrap();
    let config = BandwidthSearchConfig::builder()
        .hc_range(0.5, 6.0)
        .hp_range(0.5, 6.0)
        .grid_size(8)
        .build();
    let optimiser = AdaptiveBandwidthOptimizer::new(&market, &grid, config).unwrap();

    group.bench_function("two_stage_8x8", |b| b.iter(|| optimiser.run()));

    group.finish();
}

criterion_group!(
    benches,
    benchmark_cv_cell,
    benchmark_grid_stage,
    benchmark_adaptive_search
);
criterion_main!(benches);
