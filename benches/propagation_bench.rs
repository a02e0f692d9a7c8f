//! Performance benchmarks for the datapath simulation engine.
//!
//! Run with: `cargo bench`
//! Or for specific bench: `cargo bench --bench propagation_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use datapath::{Adder, ComponentKind, Constant, Cpu, ProgramCounter, TopologyBuilder};

// ============================================================================
// Topology Generators
// ============================================================================

/// A ripple chain of adders fed by the program counter, so every step
/// perturbs the whole chain.
fn adder_chain(length: usize) -> Cpu {
    let mut builder = TopologyBuilder::new()
        .component("pc", ComponentKind::ProgramCounter(ProgramCounter::new(32)))
        .component(
            "one",
            ComponentKind::Constant(Constant { width: 32, value: 1 }),
        )
        .component_with_latency("add0", ComponentKind::Adder(Adder { width: 32 }), 1)
        .wire("pc", "out", "add0", "in1")
        .wire("one", "out", "add0", "in2");

    for i in 1..length {
        builder = builder
            .component_with_latency(
                format!("add{i}"),
                ComponentKind::Adder(Adder { width: 32 }),
                1,
            )
            .wire(format!("add{}", i - 1), "out", format!("add{i}"), "in1");
    }
    builder = builder.wire(format!("add{}", length - 1), "out", "pc", "in");

    builder.build().unwrap().assemble().unwrap()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for length in [16usize, 64, 256] {
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            let mut cpu = adder_chain(length);
            b.iter(|| {
                cpu.step();
                black_box(cpu.stats().cycles)
            });
        });
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    c.bench_function("assemble_256", |b| {
        b.iter(|| black_box(adder_chain(256)));
    });
}

fn bench_performance_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("performance_pass");
    for length in [64usize, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            let mut cpu = adder_chain(length);
            b.iter(|| {
                cpu.compute_performance();
                black_box(cpu.max_accumulated_latency())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_assembly, bench_performance_pass);
criterion_main!(benches);
