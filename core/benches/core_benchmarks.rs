use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vbmirror_core::{AlignedBuffer, Vec3, Vec4};

// ---------------------------------------------------------------------------
// Aligned allocation
// ---------------------------------------------------------------------------

fn bench_alloc_positions(c: &mut Criterion) {
    c.bench_function("aligned_alloc_vec3_65536", |b| {
        b.iter(|| black_box(AlignedBuffer::<Vec3>::try_zeroed(black_box(65536))));
    });
}

fn bench_alloc_colors(c: &mut Criterion) {
    c.bench_function("aligned_alloc_u32_65536", |b| {
        b.iter(|| black_box(AlignedBuffer::<u32>::try_zeroed(black_box(65536))));
    });
}

// ---------------------------------------------------------------------------
// Bulk copy
// ---------------------------------------------------------------------------

fn bench_clone_uv_layer(c: &mut Criterion) {
    let mut layer = AlignedBuffer::<Vec4>::try_zeroed(65536).unwrap();
    for (i, uv) in layer.iter_mut().enumerate() {
        *uv = Vec4::new(i as f32, 0.5, 0.25, 1.0);
    }
    c.bench_function("aligned_clone_vec4_65536", |b| {
        b.iter(|| black_box(layer.try_clone()));
    });
}

criterion_group!(
    benches,
    bench_alloc_positions,
    bench_alloc_colors,
    bench_clone_uv_layer,
);
criterion_main!(benches);
