use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_core::memory::MemoryPool;

// ---------------------------------------------------------------------------
// Block creation
// ---------------------------------------------------------------------------

fn bench_create_release_small(c: &mut Criterion) {
    let pool = MemoryPool::new(256);
    c.bench_function("create_release_64b", |b| {
        b.iter(|| {
            let block = pool.create_block(black_box(64)).unwrap();
            block.release();
        });
    });
}

fn bench_create_release_large(c: &mut Criterion) {
    let pool = MemoryPool::new(256);
    c.bench_function("create_release_1mib", |b| {
        b.iter(|| {
            let block = pool.create_block(black_box(1 << 20)).unwrap();
            block.release();
        });
    });
}

fn bench_copy_block(c: &mut Criterion) {
    let pool = MemoryPool::new(256);
    let data = vec![0xABu8; 4096];
    c.bench_function("copy_block_4kib", |b| {
        b.iter(|| {
            let block = pool.copy_block(black_box(&data)).unwrap();
            block.release();
        });
    });
}

// ---------------------------------------------------------------------------
// Reference counting
// ---------------------------------------------------------------------------

fn bench_retain_release(c: &mut Criterion) {
    let pool = MemoryPool::new(256);
    let block = pool.create_block(64).unwrap();
    c.bench_function("retain_release", |b| {
        b.iter(|| {
            let extra = black_box(&block).retain();
            extra.release();
        });
    });
}

fn bench_fill_pool(c: &mut Criterion) {
    let pool = MemoryPool::new(256);
    c.bench_function("fill_and_drain_256_blocks", |b| {
        b.iter(|| {
            let blocks: Vec<_> = (0..256).map(|_| pool.create_block(16).unwrap()).collect();
            black_box(&blocks);
        });
    });
}

criterion_group!(
    benches,
    bench_create_release_small,
    bench_create_release_large,
    bench_copy_block,
    bench_retain_release,
    bench_fill_pool,
);
criterion_main!(benches);
