use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use email_separator::EmailSet;
use email_separator::services::{combine, parse_with_progress, preview, separate};
use std::hint::black_box;

fn generated_list(count: usize, stride: usize) -> String {
    (0..count)
        .map(|i| format!("user{:07}@example.com\n", i * stride))
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for count in [10_000, 100_000] {
        let text = generated_list(count, 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| parse_with_progress(black_box(text), 1000, |_| {}))
        });
    }
    group.finish();
}

fn bench_separate(c: &mut Criterion) {
    let mut group = c.benchmark_group("separate");
    for count in [10_000, 100_000] {
        let main = EmailSet::parse(&generated_list(count, 1));
        // Every third address of the main list plus as many that are absent
        let unwanted = combine(&generated_list(count / 3, 3), None)
            .union(&EmailSet::parse(&generated_list(count / 3, 7)));
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &(main, unwanted),
            |b, (main, unwanted)| b.iter(|| separate(black_box(main), black_box(unwanted))),
        );
    }
    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let main = EmailSet::parse(&generated_list(100_000, 1));
    let unwanted = EmailSet::parse(&generated_list(5_000, 31));
    c.bench_function("preview/100000", |b| {
        b.iter(|| preview(Some(black_box(&main)), black_box(&unwanted)))
    });
}

criterion_group!(benches, bench_parse, bench_separate, bench_preview);
criterion_main!(benches);
