use criterion::{black_box, criterion_group, criterion_main, Criterion};
use khora_core::address::{matches, Address};

fn bench_matching(c: &mut Criterion) {
    // Setup 10,000 stored paths spread over a few directories
    let candidates: Vec<Address> = (0..10_000)
        .map(|i| {
            let path = format!("Assets/Group{}/item_{i}.{}", i % 16, ["mat", "json", "shader"][i % 3]);
            Address::new(&path).expect("bench paths are valid addresses")
        })
        .collect();

    let exact = Address::from_static("Assets/Group7/item_9999.mat");
    let fuzzy = Address::from_static("Assets/Group7/item 9999 mat");
    let suffix = Address::from_static("*/item_9999.mat");

    let mut group = c.benchmark_group("Address Matching");

    for (name, query) in [("Exact", exact), ("Fuzzy", fuzzy), ("Suffix Wildcard", suffix)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let hits = candidates
                    .iter()
                    .filter(|candidate| query.matches(candidate))
                    .count();
                black_box(hits);
            });
        });
    }

    group.bench_function("Raw str", |b| {
        b.iter(|| black_box(matches("*/unlit.mat", "Assets/Materials/unlit.mat")));
    });

    group.finish();
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
