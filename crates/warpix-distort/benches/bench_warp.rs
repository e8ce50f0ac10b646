use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use warpix_distort::field::GridSize;
use warpix_distort::generator::SineWave;
use warpix_distort::resample::warp;
use warpix_image::{Image, ImageSize};

fn bench_warp(c: &mut Criterion) {
    let mut group = c.benchmark_group("Warp");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let image_size = [*width, *height];
        let id = format!("{}x{}", width, height);

        let size = ImageSize {
            width: *width,
            height: *height,
        };
        let data: Vec<u8> = (0..width * height * 3).map(|v| (v % 256) as u8).collect();
        let image = Image::<u8, 3>::new(size, data).unwrap();

        let sine = SineWave::new(
            GridSize::Fixed(16),
            [4.0, 13.0, 7.0, 30.0],
            [2.5, 3.0, 11.0, 60.0],
        );
        let field = sine.field(size);

        group.bench_with_input(
            BenchmarkId::new("sine_grid", &id),
            &image_size,
            |b, _| {
                let mut out = Image::<u8, 3>::from_size_val(size, 0).unwrap();
                b.iter(|| {
                    warp(std::hint::black_box(&image), &mut out, &field).unwrap();
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_warp);
criterion_main!(benches);
