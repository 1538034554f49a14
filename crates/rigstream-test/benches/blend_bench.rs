//! Benchmarks for pose blending

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rigstream_core::{ControlValues, TrackerWeights};
use rigstream_pose::{construct_rig_values, Rotation};
use rigstream_runtime::apply_control_values;
use rigstream_state::ExpressionStore;
use rigstream_test::{demo_rig, demo_store, sample_weights};

fn bench_construct_rig_values(c: &mut Criterion) {
    let store = demo_store().unwrap();
    let offsets = store.neutral_offsets();
    let weights = sample_weights(2.5);

    c.bench_function("construct_rig_values", |b| {
        b.iter(|| construct_rig_values(black_box(&store), black_box(&weights), &offsets))
    });
}

fn bench_construct_wide_rig(c: &mut Criterion) {
    // Many controls per expression, every expression weighted
    let mut store = ExpressionStore::from_template().unwrap();
    store
        .add_controls((0..64).map(|i| format!("Face:shape_{}", i)))
        .unwrap();
    store.add_controls((0..16).map(|i| format!("Bone{}:rot", i))).unwrap();
    let attrs: Vec<String> = store
        .expressions()
        .iter()
        .map(|e| e.attr.clone())
        .collect();
    for attr in &attrs {
        store.set_in_use(attr, true).unwrap();
    }
    let weights: TrackerWeights = attrs.iter().map(|a| (a.clone(), 0.5)).collect();
    let offsets = ControlValues::new();

    c.bench_function("construct_rig_values_wide", |b| {
        b.iter(|| construct_rig_values(black_box(&store), black_box(&weights), &offsets))
    });
}

fn bench_slerp(c: &mut Criterion) {
    let a = Rotation::from_axis_angle([0.0, 1.0, 0.0], 0.3);
    let b2 = Rotation::from_axis_angle([1.0, 0.0, 0.0], 1.2);

    c.bench_function("rotation_slerp", |b| {
        b.iter(|| black_box(a).slerp(black_box(&b2), black_box(0.4)))
    });
}

fn bench_apply_to_rig(c: &mut Criterion) {
    let store = demo_store().unwrap();
    let values = construct_rig_values(&store, &sample_weights(2.5), &store.neutral_offsets());
    let mut rig = demo_rig();

    c.bench_function("apply_control_values", |b| {
        b.iter(|| apply_control_values(&mut rig, black_box(&values)))
    });
}

criterion_group!(
    benches,
    bench_construct_rig_values,
    bench_construct_wide_rig,
    bench_slerp,
    bench_apply_to_rig,
);

criterion_main!(benches);
