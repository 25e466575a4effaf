//! Frame loop benchmarks.
//!
//! A frame has 16.67ms at 60 FPS. The simulation should take a small slice of
//! that even with a crowded stage, since the host still has to render.
//!
//! - **Frame tick:** one full frame with enemies, arrows and gold in flight.
//! - **Scaling:** the same frame at increasing enemy counts.
//! - **State hash:** BLAKE3 over the serialized state, paid once per replay
//!   checkpoint.
//! - **Snapshot:** capture and restore, as used for rollback and forking.
//!
//! Run with: `cargo bench --bench frame_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quiver_engine::prelude::*;
use quiver_engine::spawn::{create_enemy, create_gold};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn wide_stage() -> StageDef {
    let mut rows = vec![format!("#{}#", ".".repeat(78)); 14];
    rows[3] = format!("#{}#", ".....#####".repeat(8).chars().take(78).collect::<String>());
    rows[12] = format!("#....P{}#", ".".repeat(73));
    rows.push("#".repeat(80));
    StageDef {
        name: "bench".to_owned(),
        tile_size: 16,
        spike_damage: 10,
        rows,
        enemies: Vec::new(),
        respawn_delay_frames: 0,
    }
}

/// A scene with `enemies` enemies cycling through every AI type, plus a
/// handful of gold pickups.
fn crowded_scene(enemies: usize) -> Scene {
    let mut scene = Scene::new(wide_stage(), PhysicsConfig::default(), 12345).unwrap();
    let config = scene.config().clone();
    let kinds = [AiType::Patrol, AiType::Aggressive, AiType::Ranged, AiType::Chase];
    for i in 0..enemies {
        let x = 120 + (i as i32 * 37) % 1100;
        let ai = kinds[i % kinds.len()];
        let y = if ai == AiType::Chase { 60 } else { 200 };
        create_enemy(scene.world_mut(), &config, ai, x, y, i % 2 == 0);
    }
    for i in 0..10 {
        create_gold(scene.world_mut(), &config, 200 + i * 40, 150, 5);
    }
    scene
}

/// Run right and fire at a moving cursor.
fn input_for(frame: u64) -> InputState {
    InputState {
        right: frame % 240 < 120,
        left: frame % 240 >= 120,
        jump: frame % 90 < 10,
        jump_pressed: frame % 90 == 0,
        jump_released: frame % 90 == 10,
        mouse_x: (frame % 480) as i32,
        mouse_y: 120,
        mouse_click: frame % 20 == 0,
        ..InputState::IDLE
    }
}

// ---------------------------------------------------------------------------
// Benchmark 1: One frame with 20 enemies
// ---------------------------------------------------------------------------

fn bench_frame_tick(c: &mut Criterion) {
    let mut scene = crowded_scene(20);
    let mut frame = 0u64;

    c.bench_function("frame_tick_20_enemies", |b| {
        b.iter(|| {
            frame += 1;
            let report = scene.tick(&input_for(frame));
            black_box(report);
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 2: Scaling with enemy count
// ---------------------------------------------------------------------------

fn bench_frame_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_scaling");

    for &count in &[0usize, 10, 50, 100] {
        let mut scene = crowded_scene(count);
        let mut frame = 0u64;

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &_count| {
            b.iter(|| {
                frame += 1;
                black_box(scene.tick(&input_for(frame)));
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 3: State hash
// ---------------------------------------------------------------------------

fn bench_state_hash(c: &mut Criterion) {
    let mut scene = crowded_scene(50);
    for f in 0..60 {
        scene.tick(&input_for(f));
    }

    c.bench_function("state_hash_50_enemies", |b| {
        b.iter(|| black_box(scene.state_hash()));
    });
}

// ---------------------------------------------------------------------------
// Benchmark 4: Snapshot capture and restore
// ---------------------------------------------------------------------------

fn bench_snapshot_round_trip(c: &mut Criterion) {
    let mut scene = crowded_scene(50);
    for f in 0..60 {
        scene.tick(&input_for(f));
    }
    let snapshot = scene.capture_snapshot();

    c.bench_function("snapshot_capture_50_enemies", |b| {
        b.iter(|| black_box(scene.capture_snapshot()));
    });

    c.bench_function("snapshot_restore_50_enemies", |b| {
        b.iter(|| {
            scene.restore_snapshot(&snapshot).unwrap();
            black_box(scene.frame());
        });
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_frame_tick,
    bench_frame_scaling,
    bench_state_hash,
    bench_snapshot_round_trip,
);
criterion_main!(benches);
