//! End-to-end scenarios driven through the public engine API.
//!
//! Each test builds a small stage, runs a fixed input script and checks the
//! observable per-frame state.

use quiver_engine::enemy::enemy_substep;
use quiver_engine::gravity::apply_gravity;
use quiver_engine::physics::projectile_substep;
use quiver_engine::prelude::*;
use quiver_engine::spawn::{create_enemy, create_projectile};
use quiver_engine::timers::tick_timers;

const SEED: i64 = 12345;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stage_def(name: &str, rows: &[&str]) -> StageDef {
    StageDef {
        name: name.to_owned(),
        tile_size: 16,
        spike_damage: 10,
        rows: rows.iter().map(|r| (*r).to_owned()).collect(),
        enemies: Vec::new(),
        respawn_delay_frames: 0,
    }
}

/// Ground on tile row 4, spawn tile at column 5, row 3.
fn flat_floor() -> StageDef {
    stage_def(
        "flat",
        &[
            "#..................#",
            "#..................#",
            "#..................#",
            "#....P.............#",
            "####################",
        ],
    )
}

fn player_state(scene: &Scene) -> EntityState {
    let id = scene.player().expect("player alive");
    scene
        .frame_states()
        .into_iter()
        .find(|s| s.id == id)
        .expect("player has a position")
}

fn open_field() -> TileStage {
    let row = ".".repeat(40);
    let spawn_row = format!("P{}", ".".repeat(39));
    let mut rows: Vec<&str> = vec![row.as_str(); 20];
    rows[0] = spawn_row.as_str();
    TileStage::from_ascii("field", &rows, 16, 10).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn idle_stability() {
    let mut scene = Scene::new(flat_floor(), PhysicsConfig::default(), SEED).unwrap();
    let spawn = player_state(&scene);
    assert_eq!(
        (spawn.position.pixel_x(), spawn.position.pixel_y()),
        (80, 46)
    );

    for f in 0..120 {
        scene.tick(&InputState::IDLE);
        let s = player_state(&scene);
        if f >= 5 {
            assert_eq!(s.velocity.y, 0, "frame {f}");
            assert!(s.on_ground, "frame {f}");
        }
    }
    assert_eq!(player_state(&scene).position.pixel_y(), 46);
}

#[test]
fn movement_and_jump() {
    let def = stage_def(
        "run",
        &[
            "##############################",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#....P.......................#",
            "##############################",
        ],
    );
    let mut scene = Scene::new(def, PhysicsConfig::default(), SEED).unwrap();
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for f in 0..120 {
        let input = match f {
            30..=59 => InputState {
                right: true,
                ..InputState::IDLE
            },
            60..=89 => InputState {
                jump: true,
                jump_pressed: f == 60,
                ..InputState::IDLE
            },
            _ => InputState::IDLE,
        };
        scene.tick(&input);
        let s = player_state(&scene);
        xs.push(s.position.pixel_x());
        ys.push(s.position.pixel_y());
    }

    assert!(xs[59] > xs[0]);
    let peak = ys[60..90].iter().copied().min().unwrap();
    assert!(peak < ys[60], "jump did not rise: {peak} vs {}", ys[60]);
    // Back on the floor by the end.
    assert!(player_state(&scene).on_ground);
}

#[test]
fn projectile_range() {
    let cfg = PhysicsConfig::default();
    let stage = open_field();
    let mut world = World::new();
    let stats = cfg.arrows.standard;
    let arrow = create_projectile(
        &mut world,
        ArrowType::Standard,
        &stats,
        100,
        100,
        Velocity::new(stats.speed, 0),
        true,
    );

    for _ in 0..FRAMES_PER_SECOND {
        tick_timers(&mut world);
        apply_gravity(&mut world, &cfg, &stage);
        for _ in 0..SUB_STEPS {
            projectile_substep(&mut world, &stage);
        }
    }

    let pos = world.positions.copied(arrow).expect("arrow still flying");
    let advance = pos.pixel_x() - 100;
    let descent = pos.pixel_y() - 100;
    assert!((285..=315).contains(&advance), "advance {advance}");
    assert!((47..=63).contains(&descent), "descent {descent}");
}

#[test]
fn enemy_patrol_turn() {
    let cfg = PhysicsConfig::default();
    let stage = TileStage::from_def(&flat_floor()).unwrap();
    let mut world = World::new();
    let e = create_enemy(&mut world, &cfg, AiType::Patrol, 52, 40, true);
    {
        let ai = world.ais.get_mut(e).unwrap();
        ai.patrol_start_x = 32;
        ai.patrol_distance = 20;
        ai.patrol_dir = 1;
    }

    enemy_substep(&mut world, &cfg, &stage);
    assert_eq!(world.ais.copied(e).unwrap().patrol_dir, -1);
    for _ in 0..3 {
        enemy_substep(&mut world, &cfg, &stage);
        assert_eq!(world.ais.copied(e).unwrap().patrol_dir, -1);
    }
}

#[test]
fn knockback_is_finite() {
    let cfg = PhysicsConfig::default();
    let mut world = World::new();
    let e = create_enemy(&mut world, &cfg, AiType::Patrol, 100, 40, false);
    {
        let ai = world.ais.get_mut(e).unwrap();
        ai.hit_timer = 10;
        ai.hit_timer_max = 10;
        ai.knockback_vel_x = 100;
        ai.knockback_vel_y = 0;
    }
    world.velocities.insert(e, Velocity::new(100, 0));

    let mut series = vec![world.velocities.copied(e).unwrap().x];
    for _ in 0..10 {
        tick_timers(&mut world);
        series.push(world.velocities.copied(e).unwrap().x);
    }
    assert_eq!(series, vec![100, 90, 80, 70, 60, 50, 40, 30, 20, 10, 0]);
}

#[test]
fn spike_damage() {
    let def = stage_def(
        "spikes",
        &[
            "#..........#",
            "#..........#",
            "#..........#",
            "#....P.....#",
            "#^^^^^^^^^^#",
        ],
    );
    let cfg = PhysicsConfig::default();
    let mut scene = Scene::new(def, cfg.clone(), SEED).unwrap();
    let id = scene.player().unwrap();

    let report = scene.tick(&InputState::IDLE);
    assert!(report.damage.player_damaged);
    assert_eq!(report.damage.screen_shake, cfg.spike_shake);
    assert_eq!(scene.world().healths.copied(id).unwrap().current, 90);
    assert_eq!(
        scene.world().players.copied(id).unwrap().iframe_timer,
        cfg.iframe_frames
    );

    scene.tick(&InputState::IDLE);
    assert!(player_state(&scene).velocity.y < 0);
    // Iframes hold off a second hit.
    assert_eq!(scene.world().healths.copied(id).unwrap().current, 90);
}
