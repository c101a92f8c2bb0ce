// Copyright 2024 the driftflake authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{criterion_group, criterion_main, Criterion};
use driftflake::{Algorithm, IdGenerator};

fn bench_new(c: &mut Criterion) {
    c.bench_function("bench_new", |b| {
        b.iter(IdGenerator::new);
    });
}

fn bench_next_id_drift(c: &mut Criterion) {
    let generator = IdGenerator::builder()
        .node_id(1)
        .seq_bit_len(12)
        .algorithm(Algorithm::DriftTolerant)
        .finalize()
        .expect("Could not create IdGenerator");
    c.bench_function("bench_next_id_drift", |b| {
        b.iter(|| generator.next_id());
    });
}

fn bench_next_id_classic(c: &mut Criterion) {
    let generator = IdGenerator::builder()
        .node_id(1)
        .seq_bit_len(12)
        .algorithm(Algorithm::Classic)
        .finalize()
        .expect("Could not create IdGenerator");
    c.bench_function("bench_next_id_classic", |b| {
        b.iter(|| generator.next_id());
    });
}

criterion_group!(
    driftflake_perf,
    bench_new,
    bench_next_id_drift,
    bench_next_id_classic
);
criterion_main!(driftflake_perf);
