//! Benchmarks for mesh construction and transport stepping.
//!
//! Run with: `cargo bench --bench transport_bench`

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use oil_spill::{BayCurrent, Mesh, Simulation, upwind_flux};

/// Build structured meshes of increasing size (adjacency included).
fn bench_mesh_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_construction");

    for n in [16, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n, black_box(&BayCurrent)))
        });
    }

    group.finish();
}

/// One explicit step over the whole mesh.
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport_step");

    for n in [16, 32, 64] {
        let mesh = Arc::new(
            Mesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n, &BayCurrent)
                .expect("valid mesh"),
        );
        let mut sim = Simulation::new(mesh, 1e-4)
            .expect("valid dt")
            .with_progress_interval(0);
        sim.set_default_initial_state().expect("initial state");

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| sim.step().expect("step"))
        });
    }

    group.finish();
}

/// Raw flux evaluations.
fn bench_upwind_flux(c: &mut Criterion) {
    let inputs: Vec<(f64, f64, [f64; 2], [f64; 2])> = (0..1000)
        .map(|i| {
            let phase = i as f64 * 0.1;
            (
                phase.sin().abs(),
                phase.cos().abs(),
                [phase.cos(), phase.sin()],
                [0.5 - phase.sin(), 0.2 + phase.cos()],
            )
        })
        .collect();

    c.bench_function("upwind_flux", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for &(u_here, u_neighbor, normal, velocity) in &inputs {
                total += upwind_flux(
                    black_box(u_here),
                    black_box(u_neighbor),
                    black_box(normal),
                    black_box(velocity),
                );
            }
            total
        })
    });
}

criterion_group!(benches, bench_mesh_construction, bench_step, bench_upwind_flux);
criterion_main!(benches);
