use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rrb_vector::{LinearVector, Vector};

const LENGTHS: [u32; 3] = [100, 1000, 10000];

/// Builds a vector by prepending, which leaves relaxed nodes along the left
/// edge of the trie.
fn prepended(len: u32) -> Vector<u32> {
    let mut vec = LinearVector::new();
    for i in (0..len).rev() {
        vec.push_front(i);
    }
    vec.into_forked()
}

pub fn append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for len in LENGTHS {
        group.bench_with_input(BenchmarkId::new("linear extend", len), &len, |b, &len| {
            b.iter(|| {
                let mut vec = LinearVector::<u32>::new();
                vec.extend(0..len);
                black_box(vec.into_forked())
            })
        });

        group.bench_with_input(BenchmarkId::new("forked push_back", len), &len, |b, &len| {
            b.iter(|| {
                let mut vec = Vector::<u32>::new();
                for i in 0..len {
                    vec = vec.push_back(i);
                }
                black_box(vec)
            })
        });

        group.bench_with_input(BenchmarkId::new("rpds push_back_mut", len), &len, |b, &len| {
            b.iter(|| {
                let mut vec = rpds::Vector::<u32>::new();
                for i in 0..len {
                    vec.push_back_mut(i);
                }
                black_box(vec)
            })
        });
    }
}

pub fn snapshot_then_append(c: &mut Criterion) {
    let base: Vector<u32> = (0..10000).collect();
    let rpds_base: rpds::Vector<u32> = (0..10000).collect();
    let mut group = c.benchmark_group("snapshot then append 100");

    group.bench_function("reopen as linear", |b| {
        b.iter(|| {
            let mut vec = base.clone().into_linear();
            vec.extend(0..100);
            black_box(vec.into_forked())
        })
    });

    group.bench_function("rpds clone", |b| {
        b.iter(|| {
            let mut vec = rpds_base.clone();
            for i in 0..100 {
                vec.push_back_mut(i);
            }
            black_box(vec)
        })
    });
}

pub fn lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for len in LENGTHS {
        let strict: Vector<u32> = (0..len).collect();
        let relaxed = prepended(len);
        let rpds: rpds::Vector<u32> = (0..len).collect();
        let len = len as usize;

        group.bench_function(BenchmarkId::new("strict", len), |b| {
            b.iter(|| (0..len).map(|i| strict.get(i)).for_each(|x| {
                black_box(x);
            }))
        });

        group.bench_function(BenchmarkId::new("relaxed", len), |b| {
            b.iter(|| (0..len).map(|i| relaxed.get(i)).for_each(|x| {
                black_box(x);
            }))
        });

        group.bench_function(BenchmarkId::new("rpds", len), |b| {
            b.iter(|| (0..len).map(|i| rpds.get(i)).for_each(|x| {
                black_box(x);
            }))
        });
    }
}

criterion_group!(benches, append, snapshot_then_append, lookup);
criterion_main!(benches);
