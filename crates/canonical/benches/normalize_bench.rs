use criterion::{black_box, criterion_group, criterion_main, Criterion};

use canonical::{limit_size, normalize};

fn bench_normalize(c: &mut Criterion) {
    let short = "Machine Learning: a survey (2nd ed.)";
    let authors = "Souza, M. L.//Gonçalves, A.//Pereira Jr., T.";
    let long = "Avaliação de políticas públicas de saúde — revisão sistemática. "
        .repeat(20);

    c.bench_function("normalize/short_title", |b| {
        b.iter(|| normalize(black_box(short), "//"))
    });
    c.bench_function("normalize/author_list", |b| {
        b.iter(|| normalize(black_box(authors), "//"))
    });
    c.bench_function("normalize/long_abstract", |b| {
        b.iter(|| normalize(black_box(&long), "//"))
    });
    c.bench_function("limit_size/long_abstract", |b| {
        b.iter(|| limit_size(black_box(&long), 300))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
