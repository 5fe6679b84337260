//! Benchmarks for rootfinder_newton.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rootfinder_core::decomposition::{Decomposition, LuDecomposition, SvdDecomposition};
use rootfinder_core::linalg::DoubleVector;
use rootfinder_newton::newton::{
    BroydenRootFinder, JacobianBroydenRootFinder, NewtonDefaultRootFinder, VectorRootFinder,
};
use std::sync::Arc;

/// Discretised Bratu-like system `x_{i-1} − 2x_i + x_{i+1} + h²·exp(x_i) = 0`.
fn bratu(n: usize) -> impl Fn(&DoubleVector) -> DoubleVector {
    let h2 = 1.0 / ((n + 1) * (n + 1)) as f64;
    move |x: &DoubleVector| {
        DoubleVector::new(
            (0..n)
                .map(|i| {
                    let left = if i > 0 { x[i - 1] } else { 0.0 };
                    let right = if i + 1 < n { x[i + 1] } else { 0.0 };
                    left - 2.0 * x[i] + right + h2 * x[i].exp()
                })
                .collect(),
        )
    }
}

fn finders(
    decomposition: Arc<dyn Decomposition>,
) -> Vec<(&'static str, Box<dyn VectorRootFinder>)> {
    vec![
        (
            "newton",
            Box::new(
                NewtonDefaultRootFinder::new(1e-10, 0.0, 200)
                    .unwrap()
                    .with_decomposition(decomposition.clone()),
            ),
        ),
        (
            "broyden",
            Box::new(
                BroydenRootFinder::new(1e-10, 0.0, 200)
                    .unwrap()
                    .with_decomposition(decomposition.clone()),
            ),
        ),
        (
            "jacobian_broyden",
            Box::new(
                JacobianBroydenRootFinder::new(1e-10, 0.0, 200)
                    .unwrap()
                    .with_decomposition(decomposition),
            ),
        ),
    ]
}

fn benchmark_finders(c: &mut Criterion, group_name: &str, decomposition: Arc<dyn Decomposition>) {
    let mut group = c.benchmark_group(group_name);

    for size in [5, 20, 50] {
        let f = bratu(size);
        let x0 = DoubleVector::zeros(size);
        for (name, finder) in finders(decomposition.clone()) {
            group.bench_with_input(BenchmarkId::new(name, size), &x0, |b, x0| {
                b.iter(|| finder.find_root(&f, black_box(x0)))
            });
        }
    }

    group.finish();
}

fn benchmark_lu_finders(c: &mut Criterion) {
    benchmark_finders(c, "bratu_lu", Arc::new(LuDecomposition::default()));
}

fn benchmark_svd_finders(c: &mut Criterion) {
    benchmark_finders(c, "bratu_svd", Arc::new(SvdDecomposition::default()));
}

criterion_group!(benches, benchmark_lu_finders, benchmark_svd_finders);
criterion_main!(benches);
