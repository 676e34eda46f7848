//! Benchmarks for panel tree operations.
//!
//! Run with: cargo bench -p panelfig-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use panelfig_core::{Point, Rect};
use panelfig_layout::{PanelOperation, PanelTree, SplitAxis};
use std::hint::black_box;

/// Grid of `cols x rows` leaves: one horizontal split, then each column split
/// vertically.
fn make_grid(cols: u32, rows: u32) -> PanelTree {
    let mut tree = PanelTree::new(Rect::from_size(4000, 3000)).expect("canvas");
    tree.split(tree.root(), SplitAxis::Horizontal, cols)
        .expect("column split");
    for column in tree.leaves() {
        tree.split(column, SplitAxis::Vertical, rows)
            .expect("row split");
    }
    tree
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/split");
    for n in [2u32, 4, 8] {
        let base = make_grid(n, n);
        group.bench_with_input(BenchmarkId::new("leaf", n * n), &base, |b, base| {
            let target = base.leaves()[0];
            b.iter_batched(
                || base.clone(),
                |mut tree| {
                    black_box(tree.apply_operation(
                        1,
                        PanelOperation::Split {
                            target,
                            axis: SplitAxis::Horizontal,
                            count: 3,
                        },
                    ))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/resize");
    for n in [2u32, 4, 8] {
        let base = make_grid(n, n);
        group.bench_with_input(BenchmarkId::new("root_boundary", n * n), &base, |b, base| {
            let separator = base.root();
            b.iter_batched(
                || base.clone(),
                |mut tree| black_box(tree.resize_boundary(separator, 0, 1200)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/remove");
    for n in [2u32, 4, 8] {
        let base = make_grid(n, n);
        group.bench_with_input(BenchmarkId::new("leaf", n * n), &base, |b, base| {
            let target = base.leaves()[0];
            b.iter_batched(
                || base.clone(),
                |mut tree| black_box(tree.remove(target)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/hit_test");
    for n in [2u32, 8, 16] {
        let tree = make_grid(n, n);
        group.bench_with_input(BenchmarkId::new("grid", n * n), &tree, |b, tree| {
            b.iter(|| black_box(tree.hit_test(black_box(Point::new(2999.5, 2250.5)))))
        });
    }
    group.finish();
}

fn bench_state_hash(c: &mut Criterion) {
    let tree = make_grid(16, 16);
    c.bench_function("layout/state_hash/256", |b| {
        b.iter(|| black_box(tree.state_hash()))
    });
}

criterion_group!(
    benches,
    bench_split,
    bench_resize,
    bench_remove,
    bench_hit_test,
    bench_state_hash,
);

criterion_main!(benches);
