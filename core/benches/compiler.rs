//! Benchmarks for the code generators and the reference VM.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. stack_backend: tree to stack program
//! 2. c_backend: tree to C translation unit
//! 3. vm_vs_eval: running a compiled program against walking the tree

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use stutter_core::{
    compiler::{InlineCompiler, StackCompiler},
    evaluator::evaluate,
    parser,
    vm::Vm,
};

/// Generate an arithmetic expression like "1 + 2 * 1 - 1 + ..." with `n` operators.
fn generate_arithmetic_chain(n: usize) -> String {
    let mut expr = String::from("1");
    for i in 0..n {
        expr.push_str(match i % 3 {
            0 => " + 2",
            1 => " * 1",
            _ => " - 1",
        });
    }
    expr
}

fn bench_stack_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_backend");

    for size in [50, 100, 200] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let source = generate_arithmetic_chain(size);
            let tree = parser::parse(&source).expect("Parse failed");
            b.iter(|| {
                let program = StackCompiler::compile(black_box(&tree)).expect("Compile failed");
                black_box(program.len())
            });
        });
    }

    group.finish();
}

fn bench_c_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("c_backend");

    for size in [50, 100, 200] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let source = generate_arithmetic_chain(size);
            let tree = parser::parse(&source).expect("Parse failed");
            b.iter(|| {
                let unit = InlineCompiler::compile(black_box(&tree)).expect("Compile failed");
                black_box(unit.len())
            });
        });
    }

    group.finish();
}

fn bench_vm_vs_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("vm_vs_eval");
    let source = generate_arithmetic_chain(200);
    let tree = parser::parse(&source).expect("Parse failed");
    let program = StackCompiler::compile(&tree).expect("Compile failed");

    group.bench_function("vm", |b| {
        b.iter(|| black_box(Vm::new(black_box(&program)).run().expect("Run failed")))
    });
    group.bench_function("eval", |b| {
        b.iter(|| black_box(evaluate(black_box(&tree)).expect("Eval failed")))
    });

    group.finish();
}

criterion_group!(benches, bench_stack_backend, bench_c_backend, bench_vm_vs_eval);
criterion_main!(benches);
