use criterion::{criterion_group, criterion_main, Criterion};
use snoosearch_core::Analyzer;

const SAMPLE: &str = "My cat keeps knocking things off the counter -- mugs, \
keys, a full glass of water once. The vet says she's healthy and it's just \
play behavior, but I'm running out of shelf space that she can't reach. Has \
anyone actually trained a cat out of this, or do I just accept my fate?";

fn bench_standard(c: &mut Criterion) {
    c.bench_function("standard_analyzer", |b| {
        b.iter(|| Analyzer::Standard.tokenize(SAMPLE))
    });
}

fn bench_whitespace(c: &mut Criterion) {
    c.bench_function("whitespace_analyzer", |b| {
        b.iter(|| Analyzer::Whitespace.tokenize(SAMPLE))
    });
}

criterion_group!(benches, bench_standard, bench_whitespace);
criterion_main!(benches);
