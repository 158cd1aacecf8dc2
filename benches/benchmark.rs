use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster_series::catalog::{BandRole, DatasetCatalog};
use raster_series::processing::engine::compute_indices;
use raster_series::processing::indices::NDI;
use raster_series::processing::normalize::Normalization;
use raster_series::processing::IndexCalculator;
use raster_series::raster::{BandBuffer, GeoTransform, Scene};

/// Benchmark the core NDVI kernel in isolation
fn benchmark_ndvi_kernel(c: &mut Criterion) {
    let size = (1024, 1024);
    let mut nir_data = vec![0.0f32; size.0 * size.1];
    let mut red_data = vec![0.0f32; size.0 * size.1];

    // Fill with plausible reflectance values
    for i in 0..nir_data.len() {
        nir_data[i] = 0.4 + (i % 100) as f32 * 1e-3;
        red_data[i] = 0.1 + (i % 50) as f32 * 1e-3;
    }

    let nir = BandBuffer::new(size, nir_data);
    let red = BandBuffer::new(size, red_data);
    let valid = vec![true; size.0 * size.1];

    let ndvi = NDI::new(BandRole::Nir, BandRole::Red, Some("NDVI".to_string()));

    c.bench_function("ndvi_core_kernel", |b| {
        b.iter(|| ndvi.calculate(black_box(&[&nir, &red]), black_box(&valid)))
    });
}

/// Benchmark the full per-scene index stage for the Sentinel-2 role map
fn benchmark_scene_indices(c: &mut Criterion) {
    let size = (512, 512);
    let mut scene = Scene::new(
        Utc.with_ymd_and_hms(2023, 6, 1, 10, 0, 0).unwrap(),
        GeoTransform::new(0.0, size.1 as f64 * 10.0, 10.0, -10.0),
        size,
    );
    for (name, value) in [
        ("B8", 0.45f32),
        ("B4", 0.12),
        ("B2", 0.08),
        ("B3", 0.2),
        ("B11", 0.3),
    ] {
        scene
            .add_band(name, BandBuffer::filled(size, value))
            .unwrap();
    }

    let catalog = DatasetCatalog::builtin();
    let descriptor = catalog.lookup("Sentinel-2").unwrap();

    c.bench_function("scene_seven_indices", |b| {
        b.iter(|| {
            compute_indices(
                black_box(&scene),
                black_box(&descriptor.bands),
                Normalization::FixedBounds,
            )
        })
    });
}

criterion_group!(benches, benchmark_ndvi_kernel, benchmark_scene_indices);
criterion_main!(benches);
