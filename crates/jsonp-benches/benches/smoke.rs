use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonp_benches::available_corpora;
use jsonp_core::{to_path, PatchOptions};

fn bench_patch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch-apply");
    for corpus in available_corpora() {
        group.throughput(Throughput::Elements(corpus.patch().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(corpus.name()), &corpus, |b, corpus| {
            b.iter(|| {
                let result = corpus.document().apply_patch(corpus.patch()).expect("patch success");
                black_box(result);
            });
        });
    }
    group.finish();
}

fn bench_patch_in_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch-in-place");
    let options = PatchOptions::default();
    for corpus in available_corpora() {
        group.throughput(Throughput::Elements(corpus.patch().len() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter_batched(
                || corpus.document().duplicate(),
                |mut document| {
                    document.apply_patch_in_place(corpus.patch(), &options).expect("patch success");
                    black_box(document);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_pointer_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer-resolve");
    for corpus in available_corpora() {
        let pointers = corpus.pointers();
        group.throughput(Throughput::Elements(pointers.len() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                for pointer in &pointers {
                    let found = corpus.document().get_by_pointer(pointer).expect("valid pointer");
                    black_box(found);
                }
            });
        });
    }
    group.finish();
}

fn bench_pointer_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointer-decode");
    for corpus in available_corpora() {
        let pointers = corpus.pointers();
        group.throughput(Throughput::Elements(pointers.len() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                for pointer in &pointers {
                    let path = to_path(pointer).expect("valid pointer");
                    black_box(path.to_pointer());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_patch_apply,
    bench_patch_in_place,
    bench_pointer_resolve,
    bench_pointer_decode
);
criterion_main!(benches);
