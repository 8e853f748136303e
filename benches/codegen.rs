//! Benchmarks for node-list evaluation and Kotlin emission.
//!
//! Run with: `cargo bench --bench codegen`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pointsbuilder::prelude::*;

fn scene() -> NodeTree<Geometry> {
    let mut tree = NodeTree::new();
    tree.push(Geometry::Axis(Axis { axis: DVec3::Y }));
    tree.push(Geometry::AddCircle(AddCircle::default()));
    tree.push(Geometry::AddBall(AddBall::default()));

    let fourier = tree.push(Geometry::AddFourierSeries(AddFourierSeries::default()));
    for (r, w) in [(1.0, 1.0), (0.5, 3.0), (0.25, -5.0)] {
        tree.add_term(fourier, FourierTerm { r, w, start_angle: 0.0 })
            .unwrap();
    }

    let repeat = tree.push(Geometry::AddWith(AddWith::default()));
    tree.append(
        Some(repeat),
        Geometry::AddLine(AddLine {
            start: DVec3::ZERO,
            end: DVec3::new(2.0, 0.0, 0.0),
            count: 20,
        }),
    )
    .unwrap();

    tree.push(Geometry::ApplySpiralOffset(ApplySpiralOffset::default()));
    tree.push(Geometry::Scale(Scale { factor: 1.5 }));
    tree
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    group.bench_function("scene", |b| {
        let tree = scene();
        b.iter(|| black_box(evaluate(tree.roots(), DVec3::Y)))
    });

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("ball", count), &count, |b, &count| {
            let mut tree = NodeTree::new();
            tree.push(Geometry::AddBall(AddBall { radius: 2.0, count }));
            tree.push(Geometry::ApplyNoiseOffset(ApplyNoiseOffset::default()));
            b.iter(|| black_box(evaluate(tree.roots(), DVec3::Y)))
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");

    group.bench_function("scene", |b| {
        let tree = scene();
        b.iter(|| black_box(emit(tree.roots())))
    });

    group.bench_function("commands", |b| {
        let mut tree = NodeTree::new();
        tree.push(Command::Noise(ParticleNoise::default()));
        tree.push(Command::Vortex(ParticleVortex::default()));
        tree.push(Command::Orbit(ParticleOrbit::default()));
        tree.push(Command::Gravity(ParticleGravity::default()));
        b.iter(|| black_box(emit(tree.roots())))
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_emit);
criterion_main!(benches);
