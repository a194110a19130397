//! Benchmarks for the compile and execute phases.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minilang::bytecode::{Compiler, Vm};
use minilang::lexer::Scanner;
use minilang::parser::Parser;

/// Parse source into an AST.
fn parse(source: &str) -> minilang::ast::Expr {
    let tokens = Scanner::new(source).scan_tokens().expect("lexer error");
    Parser::new(tokens).parse().expect("parser error")
}

/// A deeply nested arithmetic expression.
fn deep_expression(depth: usize) -> String {
    let mut source = String::from("1");
    for i in 0..depth {
        source = format!("({} + {} * 2 - 1)", source, i % 10);
    }
    source
}

fn compile_benchmark(c: &mut Criterion) {
    let source = deep_expression(100);

    c.bench_function("compile_deep_expression", |b| {
        b.iter(|| {
            let expr = parse(black_box(&source));
            Compiler::new().compile(&expr).expect("compile error")
        })
    });
}

fn execute_benchmark(c: &mut Criterion) {
    let source = deep_expression(100);
    let expr = parse(&source);
    let chunk = Compiler::new().compile(&expr).expect("compile error");

    c.bench_function("vm_deep_expression", |b| {
        let mut vm = Vm::new();
        b.iter(|| vm.run(black_box(&chunk)).expect("runtime error"))
    });
}

fn conditional_benchmark(c: &mut Criterion) {
    let expr = parse("if (a) then 1+2*3 else (4-5)/6");
    let chunk = Compiler::new().compile(&expr).expect("compile error");

    c.bench_function("vm_conditional", |b| {
        let mut vm = Vm::new();
        b.iter(|| vm.run(black_box(&chunk)).expect("runtime error"))
    });
}

criterion_group!(
    benches,
    compile_benchmark,
    execute_benchmark,
    conditional_benchmark
);
criterion_main!(benches);
