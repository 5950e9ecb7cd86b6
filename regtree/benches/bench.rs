use criterion::{Criterion, black_box, criterion_group, criterion_main};
use regtree::{compat_transpile, generate, optimize, parse, to_dfa};

const EMAIL: &str = r"/(?<user>[a-zA-Z0-9._%+-]+)@(?<host>[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})/";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_email", |b| b.iter(|| parse(black_box(EMAIL))));
}

fn bench_generate(c: &mut Criterion) {
    let ast = parse(EMAIL).unwrap();
    c.bench_function("generate_email", |b| b.iter(|| generate(black_box(&ast))));
}

fn bench_optimize(c: &mut Criterion) {
    let pattern = r"/[0-9][0-9]*(?:a|b|c)(?:abc){2}abc[a-zA-Z_0-9]+\x41{1}/";
    c.bench_function("optimize_mixed", |b| b.iter(|| optimize(black_box(pattern))));
}

fn bench_compat(c: &mut Criterion) {
    c.bench_function("compat_named_groups", |b| {
        b.iter(|| compat_transpile(black_box(EMAIL)))
    });
}

fn bench_dfa(c: &mut Criterion) {
    let pattern = "/(?:a|b)*abb(?:a|b){3}/";
    c.bench_function("dfa_build_minimize", |b| {
        b.iter(|| to_dfa(black_box(pattern)).map(|dfa| dfa.minimize()))
    });

    let dfa = to_dfa(pattern).unwrap().minimize();
    let input = "abababababababbaba";
    c.bench_function("dfa_match", |b| b.iter(|| dfa.matches(black_box(input))));
}

criterion_group!(
    benches,
    bench_parse,
    bench_generate,
    bench_optimize,
    bench_compat,
    bench_dfa
);
criterion_main!(benches);
