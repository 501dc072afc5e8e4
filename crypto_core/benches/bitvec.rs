use criterion::{criterion_group, criterion_main, Criterion};
use crypto_core::BitVector;
use std::time::Duration;

fn bench_slice(c: &mut Criterion) {
    c.bench_function("BitVector::slice", |b| {
        let bits = BitVector::from_bytes(&[0xA5; 1024]);
        b.iter(|| criterion::black_box(bits.slice(129..4000)));
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("BitVector::iter", |b| {
        let bits = BitVector::from_bytes(&[0xA5; 1024]).slice(3..);
        b.iter(|| criterion::black_box(bits.iter().filter(|b| *b).count()));
    });
}

fn bench_concat(c: &mut Criterion) {
    c.bench_function("BitVector::concat", |b| {
        let x = BitVector::from_bytes(&[0x3C; 32]);
        let y = BitVector::from_bytes(&[0xC3; 17]).slice(..129);
        b.iter(|| criterion::black_box(x.concat(&y)));
    });
}

criterion_group! {
    name = bitvec;
    config = Criterion::default().warm_up_time(Duration::from_millis(100));
    targets = bench_slice, bench_iter, bench_concat
}
criterion_main!(bitvec);
