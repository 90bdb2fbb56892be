//! Descriptor Benchmarks
//!
//! Benchmarks for descriptor extraction, scoring and in-memory ranking.
//!
//! Run with: `cargo bench --bench descriptor_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use artsim::{
    rank_descriptors, score_similarity, Descriptor, DescriptorExtractor, ExtractorConfig,
    ResampleFilter,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};

fn gradient(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        Rgb([
            (x * 255 / size) as u8,
            (y * 255 / size) as u8,
            ((x + y) * 127 / size) as u8,
        ])
    })
}

fn bench_extract_canonical(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_canonical");
    let image = gradient(256);

    for grid in [4u32, 8, 16] {
        let extractor =
            DescriptorExtractor::new(ExtractorConfig::new().with_grid_size(grid)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(grid), &image, |bench, img| {
            bench.iter(|| black_box(extractor.extract_image(black_box(img))));
        });
    }

    group.finish();
}

fn bench_extract_resampled(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_resampled");
    let image = gradient(1024);

    for (filter, name) in [
        (ResampleFilter::Nearest, "nearest"),
        (ResampleFilter::Triangle, "triangle"),
        (ResampleFilter::Lanczos3, "lanczos3"),
    ] {
        let extractor =
            DescriptorExtractor::new(ExtractorConfig::new().with_filter(filter)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &image, |bench, img| {
            bench.iter(|| black_box(extractor.extract_image(black_box(img))));
        });
    }

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let extractor = DescriptorExtractor::default();
    let a = extractor.extract_image(&gradient(256));
    let b = extractor.extract_image(&RgbImage::from_pixel(256, 256, Rgb([200, 30, 90])));

    c.bench_function("score_similarity", |bench| {
        bench.iter(|| black_box(score_similarity(black_box(&a), black_box(&b)).unwrap()));
    });
}

fn bench_rank_descriptors(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_descriptors");
    let extractor = DescriptorExtractor::default();
    let target = extractor.extract_image(&gradient(256));

    for size in [10usize, 100, 1000] {
        let gallery: Vec<Descriptor> = (0..size)
            .map(|i| {
                let shade = (i * 37 % 256) as u8;
                extractor.extract_image(&RgbImage::from_pixel(64, 64, Rgb([shade, 255 - shade, 64])))
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}_candidates")),
            &gallery,
            |bench, gallery: &Vec<Descriptor>| {
                bench.iter(|| {
                    let ranked =
                        rank_descriptors(&target, gallery.iter().enumerate(), 5).unwrap();
                    black_box(ranked);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_extract_canonical,
    bench_extract_resampled,
    bench_score,
    bench_rank_descriptors,
);
criterion_main!(benches);
