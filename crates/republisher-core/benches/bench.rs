use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use republisher_core::{parse_identifiers, validate_identifiers};

// Identifiers per benchmark iteration. Roughly a full day of republish
// requests.
const TOTAL_IDS: usize = 10_000;

fn identifiers() -> Vec<String> {
    (0..TOTAL_IDS)
        .map(|i| {
            if i % 50 == 0 {
                format!("junk-{i}")
            } else {
                format!("{i:08x}-9dad-11d1-80b4-{i:012x}")
            }
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let ids = identifiers();
    let json = json_array(&ids);
    let lines = ids.join("\n");

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function("json_array", |b| {
        b.iter(|| black_box(parse_identifiers(black_box(json.as_bytes()))));
    });
    group.bench_function("lines", |b| {
        b.iter(|| black_box(parse_identifiers(black_box(lines.as_bytes()))));
    });
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let ids = identifiers();

    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function("mixed", |b| {
        b.iter_batched(
            || ids.clone(),
            |ids| black_box(validate_identifiers(ids)),
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn json_array(ids: &[String]) -> String {
    let quoted: Vec<_> = ids.iter().map(|id| format!("\"{id}\"")).collect();
    format!("[{}]", quoted.join(","))
}

criterion_group!(benches, bench_parse, bench_validate);
criterion_main!(benches);
