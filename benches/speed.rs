// Copyright (c) 2023 Boris Onchev (boris.oncev@gmail.com)
//
// Distributed under the Boost Software License, Version 1.0. (See accompanying
// file LICENSE or copy at http://www.boost.org/LICENSE_1_0.txt)

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rc5_cbc::{Rc5Cbc, KEY_BYTES};

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("rc5-cbc-encrypt");

    // Throughput over firmware-chunk-sized buffers.
    for size in [1024, 4096, 16384, 65536] {
        let mut buffer = vec![0u8; size];
        let mut session = Rc5Cbc::new(&[0x5A; KEY_BYTES], [0, 0]);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| session.encrypt_in_place(&mut buffer));
        });
    }
    group.finish();
}

fn bench_key_schedule(c: &mut Criterion) {
    let key = [0x5A; KEY_BYTES];
    c.bench_function("rc5-cbc-key-schedule", |b| {
        b.iter(|| Rc5Cbc::new(&key, [0, 0]))
    });
}

criterion_group!(benches, bench_stream, bench_key_schedule);
criterion_main!(benches);
