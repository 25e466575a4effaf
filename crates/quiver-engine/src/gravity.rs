//! Per-frame gravity.
//!
//! Accelerations are IU of velocity per frame, so gravity is applied once per
//! frame before the substep loop rather than inside it.

use quiver_ecs::prelude::*;

use crate::collision::enemy_has_ground;
use crate::config::PhysicsConfig;
use crate::stage::Stage;
use crate::units::percent;

pub fn apply_gravity(world: &mut World, config: &PhysicsConfig, stage: &dyn Stage) {
    apply_player_gravity(world, config);
    apply_enemy_gravity(world, config, stage);
    apply_projectile_gravity(world);
    apply_gold_gravity(world);
}

/// Gravity for the player's current vertical velocity, with the apex and
/// fall modifiers applied.
pub fn player_gravity_step(config: &PhysicsConfig, vy: i32) -> i32 {
    let mut g = config.gravity;
    if config.apex_mod_enabled && vy.abs() < config.apex_threshold {
        g = percent(g, config.apex_gravity_pct);
    }
    if vy > 0 {
        g = percent(g, config.fall_multiplier_pct);
    }
    g
}

fn apply_player_gravity(world: &mut World, config: &PhysicsConfig) {
    let Some(id) = world.player() else {
        return;
    };
    if world.dashes.get(id).is_some_and(|d| d.active) {
        return;
    }
    let on_ground = world.movements.get(id).is_some_and(|m| m.on_ground);
    if let Some(vel) = world.velocities.get_mut(id) {
        if on_ground && vel.y >= 0 {
            return;
        }
        vel.y = (vel.y + player_gravity_step(config, vel.y)).min(config.max_fall_speed);
    }
}

fn apply_enemy_gravity(world: &mut World, config: &PhysicsConfig, stage: &dyn Stage) {
    for id in world.is_enemy.to_vec() {
        if world.ais.get(id).map_or(true, |ai| ai.flying) {
            continue;
        }
        let (Some(pos), Some(mv), Some(vel)) = (
            world.positions.copied(id),
            world.movements.get_mut(id),
            world.velocities.get_mut(id),
        ) else {
            continue;
        };
        if mv.on_ground && vel.y >= 0 {
            if enemy_has_ground(stage, pos.pixel_x(), pos.pixel_y()) {
                continue;
            }
            mv.on_ground = false;
        } else if mv.on_ground {
            continue;
        }
        vel.y = (vel.y + config.gravity).min(config.max_fall_speed);
    }
}

fn apply_projectile_gravity(world: &mut World) {
    for (id, proj) in world.projectiles.iter() {
        if proj.stuck {
            continue;
        }
        if let Some(vel) = world.velocities.get_mut(*id) {
            vel.y = (vel.y + proj.gravity_accel).min(proj.max_fall_speed);
        }
    }
}

fn apply_gold_gravity(world: &mut World) {
    for (id, gold) in world.golds.iter() {
        if gold.grounded {
            continue;
        }
        if let Some(vel) = world.velocities.get_mut(*id) {
            vel.y += gold.gravity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{create_enemy, create_gold, create_player, create_projectile};
    use crate::stage::TileStage;

    fn stage() -> TileStage {
        TileStage::from_ascii(
            "g",
            &["..........", "..........", "....P.....", "##########"],
            16,
            10,
        )
        .unwrap()
    }

    #[test]
    fn player_modifiers() {
        let cfg = PhysicsConfig::default();
        // Rising fast: plain gravity.
        assert_eq!(player_gravity_step(&cfg, -100), 5);
        // Near apex: halved.
        assert_eq!(player_gravity_step(&cfg, -10), 2);
        // Falling slowly: apex then fall multiplier, 5 * 50% = 2, 2 * 150% = 3.
        assert_eq!(player_gravity_step(&cfg, 10), 3);
        // Falling fast: 5 * 150% = 7.
        assert_eq!(player_gravity_step(&cfg, 100), 7);
    }

    #[test]
    fn grounded_or_dashing_player_skips_gravity() {
        let cfg = PhysicsConfig::default();
        let s = stage();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 64, 30);
        world.movements.get_mut(p).unwrap().on_ground = true;
        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(p).unwrap().y, 0);

        world.movements.get_mut(p).unwrap().on_ground = false;
        world.dashes.get_mut(p).unwrap().active = true;
        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(p).unwrap().y, 0);

        world.dashes.get_mut(p).unwrap().active = false;
        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(p).unwrap().y, 2);
    }

    #[test]
    fn fall_speed_is_capped() {
        let cfg = PhysicsConfig::default();
        let s = stage();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 64, 0);
        world.velocities.insert(p, Velocity::new(0, cfg.max_fall_speed - 1));
        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(p).unwrap().y, cfg.max_fall_speed);
    }

    #[test]
    fn enemy_reverifies_ground() {
        let cfg = PhysicsConfig::default();
        let s = stage();
        let mut world = World::new();
        // Sprite bottom row 47 rests on the floor at 48.
        let standing = create_enemy(&mut world, &cfg, AiType::Patrol, 40, 24, false);
        let floating = create_enemy(&mut world, &cfg, AiType::Patrol, 40, 4, false);
        world.movements.get_mut(standing).unwrap().on_ground = true;
        world.movements.get_mut(floating).unwrap().on_ground = true;
        apply_gravity(&mut world, &cfg, &s);
        assert!(world.movements.copied(standing).unwrap().on_ground);
        assert_eq!(world.velocities.copied(standing).unwrap().y, 0);
        assert!(!world.movements.copied(floating).unwrap().on_ground);
        assert_eq!(world.velocities.copied(floating).unwrap().y, cfg.gravity);
    }

    #[test]
    fn flying_enemy_ignores_gravity() {
        let cfg = PhysicsConfig::default();
        let s = stage();
        let mut world = World::new();
        let e = create_enemy(&mut world, &cfg, AiType::Chase, 40, 4, false);
        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(e).unwrap().y, 0);
    }

    #[test]
    fn projectiles_and_gold() {
        let cfg = PhysicsConfig::default();
        let s = stage();
        let mut world = World::new();
        let stats = cfg.arrows.standard;
        let a = create_projectile(
            &mut world,
            ArrowType::Standard,
            &stats,
            10,
            10,
            Velocity::new(128, stats.max_fall_speed),
            true,
        );
        let stuck = create_projectile(
            &mut world,
            ArrowType::Standard,
            &stats,
            20,
            10,
            Velocity::ZERO,
            true,
        );
        world.projectiles.get_mut(stuck).unwrap().stuck = true;
        let g = create_gold(&mut world, &cfg, 50, 10, 5);
        let before = world.velocities.copied(g).unwrap().y;

        apply_gravity(&mut world, &cfg, &s);
        assert_eq!(world.velocities.copied(a).unwrap().y, stats.max_fall_speed);
        assert_eq!(world.velocities.copied(stuck).unwrap(), Velocity::ZERO);
        assert_eq!(world.velocities.copied(g).unwrap().y, before + cfg.gold.gravity);
    }
}
