use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use terrarium_core::config::HeightmapConfig;
use terrarium_core::terrain::generation::gaussian_blur;
use terrarium_core::terrain::TerrainGrid;
use terrarium_data::Grid;

fn bench_generate(c: &mut Criterion) {
    let params = HeightmapConfig::default();
    c.bench_function("generate_64", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            black_box(TerrainGrid::generate(64, 64, &params, &mut rng))
        })
    });
}

fn bench_blur(c: &mut Criterion) {
    let grid = Grid::from_fn(256, 256, |x, y| ((x ^ y) % 17) as f32);
    c.bench_function("gaussian_blur_256_sigma2", |b| {
        b.iter(|| black_box(gaussian_blur(&grid, 2.0)))
    });
}

criterion_group!(benches, bench_generate, bench_blur);
criterion_main!(benches);
