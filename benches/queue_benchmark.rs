use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use string_queue::Queue;

const ELEMS: usize = 10_000;

fn shuffled_values() -> Vec<String> {
    // a fixed permutation, so every run sorts the same input
    (0..ELEMS)
        .map(|i| format!("{:08}", (i * 7_919) % ELEMS))
        .collect()
}

fn filled(values: &[String]) -> Queue {
    let mut queue = Queue::new();
    queue.try_extend(values).unwrap();
    queue
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let values = shuffled_values();

    c.bench_function("push_back", |b| b.iter(|| filled(black_box(&values))));

    c.bench_function("push_front_then_drain", |b| {
        b.iter(|| {
            let mut queue = Queue::new();
            for value in &values {
                queue.push_front(black_box(value)).unwrap();
            }
            let mut buf = [0u8; 16];
            while queue.remove_head(Some(&mut buf)).is_ok() {}
        })
    });

    c.bench_function("reverse", |b| {
        let mut queue = filled(&values);
        b.iter(|| queue.reverse())
    });

    c.bench_function("sort", |b| {
        b.iter_batched(|| filled(&values), |mut queue| queue.sort(), BatchSize::LargeInput)
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
