use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ftrack_core::{DetectorType, Image};
use ftrack_detect::KeypointDetector;
use image::Luma;

/// Simulate a road scene: gradient background with scattered blocky structures
fn create_benchmark_image(width: u32, height: u32) -> Image {
    let mut img = Image::from_fn(width, height, |x, y| {
        let gradient = ((x as f32 / width as f32) * 50.0) as u8;
        let noise = ((x + y) % 7) as u8;
        Luma([100 + gradient + noise])
    });

    for i in 0..40u32 {
        let cx = (i * 37 + 11) % width;
        let cy = (i * 23 + 5) % height;
        for dy in 0..6 {
            for dx in 0..6 {
                let (x, y) = (cx + dx, cy + dy);
                if x < width && y < height {
                    img.put_pixel(x, y, Luma([if (dx + dy) % 2 == 0 { 30 } else { 220 }]));
                }
            }
        }
    }
    img
}

fn bench_detectors(c: &mut Criterion) {
    let detector = KeypointDetector::default();
    let img = create_benchmark_image(320, 120);

    let mut group = c.benchmark_group("detectors");
    for &strategy in DetectorType::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &img, |b, img| {
            b.iter(|| detector.detect(black_box(img), strategy))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detectors);
criterion_main!(benches);
