use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::{fs, str::FromStr};

use pulse_rs::{Environment, Program};

fn read_program(name: &str) -> String {
    fs::read_to_string(format!(
        "{}/tests/programs/{name}.pulse",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap_or_else(|_| panic!("tests/programs/{name}.pulse should exist"))
}

/// A long flat timeline, to exercise the parser on many lines.
fn generated_program(commands: usize) -> String {
    let mut source = String::from(
        "output a, b\ndelay d = 4 ns\npulse p = {shape: \"square\", length: 16 ns, amplitude: 500 mV}\n",
    );
    for index in 0..commands {
        if index % 2 == 0 {
            source.push_str("d p:a\n");
        } else {
            source.push_str("(p d):a (d d 2 ns):b\n");
        }
    }
    source
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for name in ["timeline", "nested"] {
        let input = read_program(name);
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = Program::from_str(black_box(&input));
            })
        });
    }
    let input = generated_program(1000);
    group.bench_function("generated", |b| {
        b.iter(|| {
            let _ = Program::from_str(black_box(&input));
        })
    });
    group.finish();
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.sample_size(50);
    for name in ["timeline", "nested"] {
        let program = Program::from_str(&read_program(name))
            .unwrap_or_else(|err| panic!("{name} should parse: {err}"));
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut env = Environment::default();
                let _ = env.run_all(black_box(&program));
                env.into_waveforms()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_parse, benchmark_compile);
criterion_main!(benches);
