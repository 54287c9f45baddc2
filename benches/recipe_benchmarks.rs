//! Benchmarks for recipe execution
//!
//! Measures performance of:
//! - Signature pattern compilation and call matching
//! - Printing call-heavy compilation units
//! - DeleteMethodArgument runs, sequential and parallel
//! - Runs where the precondition rejects every source

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quickcheck::{Arbitrary, Gen};
use std::sync::Arc;
use std::time::Duration;

use rewrite_engine::config::RunConfig;
use rewrite_engine::ir::visitor::SourceFile;
use rewrite_engine::recipe::{DeleteMethodArgument, Recipe, RecipeRun};
use rewrite_engine::search::MethodMatcher;
use test_utils::ir::builders;
use test_utils::ir::generator::CallSite;

// ============================================================================
// Inputs
// ============================================================================

fn call_sites(count: usize) -> Vec<CallSite> {
    let mut g = Gen::new(8);
    (0..count).map(|_| CallSite::arbitrary(&mut g)).collect()
}

/// One compilation unit per `per_file` call sites.
fn sources(files: usize, per_file: usize) -> Vec<SourceFile> {
    (0..files)
        .map(|_| {
            let calls = call_sites(per_file).iter().map(CallSite::to_tree).collect();
            SourceFile::Java(builders::compilation_unit(&["java.util.List"], calls))
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_method_matcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("method_matcher");

    group.bench_function("compile_exact", |b| {
        b.iter(|| black_box(MethodMatcher::new("com.acme.Foo bar(int, String, java.util.List)")))
    });

    group.bench_function("compile_wildcards", |b| {
        b.iter(|| black_box(MethodMatcher::new("com.acme..* ba*(int, String...)")))
    });

    let trees: Vec<_> = call_sites(256).iter().map(CallSite::to_tree).collect();
    let matcher = MethodMatcher::new("com.acme.Foo bar(..)").unwrap();
    group.bench_function("match_256_calls", |b| {
        b.iter(|| black_box(trees.iter().filter(|t| matcher.matches(t)).count()))
    });

    group.finish();
}

fn bench_printing(c: &mut Criterion) {
    let mut group = c.benchmark_group("printing");

    for per_file in [10, 100, 1000].iter() {
        let source = sources(1, *per_file).remove(0);
        group.bench_with_input(BenchmarkId::new("calls", per_file), &source, |b, source| {
            b.iter(|| black_box(source.print()))
        });
    }

    group.finish();
}

fn bench_delete_method_argument(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_method_argument");
    let recipe: Arc<dyn Recipe> = Arc::new(DeleteMethodArgument::new("com.acme.Foo bar(..)", 0));

    for files in [10, 100].iter() {
        let sources = sources(*files, 50);

        group.bench_with_input(BenchmarkId::new("sequential", files), &sources, |b, sources| {
            let run = RecipeRun::new(Arc::clone(&recipe), RunConfig::sequential());
            b.iter(|| black_box(run.run(sources).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("parallel", files), &sources, |b, sources| {
            let run = RecipeRun::new(Arc::clone(&recipe), RunConfig::default());
            b.iter(|| black_box(run.run(sources).unwrap()))
        });
    }

    group.finish();
}

fn bench_precondition_rejects(c: &mut Criterion) {
    let mut group = c.benchmark_group("precondition_rejects");
    let sources = sources(100, 50);
    let recipe: Arc<dyn Recipe> = Arc::new(DeleteMethodArgument::new("com.nowhere.Nope bar(..)", 0));

    group.bench_function("100_files", |b| {
        let run = RecipeRun::new(Arc::clone(&recipe), RunConfig::sequential());
        b.iter(|| black_box(run.run(&sources).unwrap()))
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets =
        bench_method_matcher,
        bench_printing,
        bench_delete_method_argument,
        bench_precondition_rejects
}

criterion_main!(benches);
