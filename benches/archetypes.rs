use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use deck_matchups::core::{deck_archetypes, ArchetypeSize, Deck};

fn bench_deck_archetypes(c: &mut Criterion) {
    let mut group = c.benchmark_group("deck_archetypes");
    let deck: Deck = "1a0f3c22070b5e01".parse().unwrap();

    for k in 1..=8 {
        let size = ArchetypeSize::new(k).unwrap();
        group.bench_with_input(BenchmarkId::new("size", k), &size, |b, &size| {
            b.iter(|| deck_archetypes(std::hint::black_box(&deck), size));
        });
    }

    group.finish();
}

fn bench_parse_deck(c: &mut Criterion) {
    c.bench_function("parse_deck", |b| {
        b.iter(|| std::hint::black_box("1A0F3C22070B5E01").parse::<Deck>())
    });
}

criterion_group!(benches, bench_deck_archetypes, bench_parse_deck);
criterion_main!(benches);
