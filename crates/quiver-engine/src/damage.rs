//! Damage resolution after the substep loop.
//!
//! Three overlap passes run in a fixed order: player arrows against enemies,
//! enemy arrows against the player, then enemy bodies against the player.
//! The spike check runs separately, after enemy separation.

use serde::{Deserialize, Serialize};

use quiver_ecs::prelude::*;

use crate::config::PhysicsConfig;
use crate::spawn::{create_gold, ENEMY_SPRITE_WIDTH, PLAYER_SPRITE_WIDTH};
use crate::stage::{Stage, TileType};
use crate::units::scale_to;

/// Feedback produced by one frame of combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageResult {
    /// Frames the whole simulation pauses for.
    pub hitstop_frames: i32,
    /// Screen shake intensity to start from.
    pub screen_shake: i32,
    pub player_damaged: bool,
    pub enemies_killed: u32,
}

impl DamageResult {
    /// Combine two results. Hitstop and shake take the larger value.
    pub fn merge(&mut self, other: DamageResult) {
        self.hitstop_frames = self.hitstop_frames.max(other.hitstop_frames);
        self.screen_shake = self.screen_shake.max(other.screen_shake);
        self.player_damaged |= other.player_damaged;
        self.enemies_killed += other.enemies_killed;
    }
}

fn rect_of(world: &World, id: EntityId, sprite_width: i32) -> Option<Rect> {
    let pos = world.positions.copied(id)?;
    let hitbox = world.hitboxes.copied(id)?;
    let right = world.facings.copied(id).map_or(true, |f| f.right);
    Some(hitbox.rect_at(pos.pixel_x(), pos.pixel_y(), right, sprite_width))
}

/// Whether the player currently ignores damage.
pub fn player_invincible(world: &World, id: EntityId) -> bool {
    let iframes = world.players.get(id).is_some_and(|p| p.iframe_timer > 0);
    let dashing = world.dashes.get(id).is_some_and(|d| d.active);
    iframes || dashing
}

/// Run the three combat passes.
pub fn resolve_damage(world: &mut World, config: &PhysicsConfig) -> DamageResult {
    let mut result = DamageResult::default();
    player_arrows_vs_enemies(world, config, &mut result);

    let Some(pid) = world.player() else {
        return result;
    };
    let mut knockback: Option<Velocity> = None;
    enemy_arrows_vs_player(world, config, pid, &mut result, &mut knockback);
    enemies_vs_player(world, config, pid, &mut result, &mut knockback);

    if let Some(kb) = knockback {
        world.velocities.insert(pid, kb);
        if let Some(health) = world.healths.get(pid) {
            tracing::debug!(
                player = %pid,
                health = health.current,
                "player damaged"
            );
        }
    }
    result
}

fn player_arrows_vs_enemies(world: &mut World, config: &PhysicsConfig, result: &mut DamageResult) {
    let enemies = world.is_enemy.to_vec();
    let mut killed: Vec<EntityId> = Vec::new();

    for arrow in world.is_projectile.to_vec() {
        let Some(proj) = world.projectiles.copied(arrow) else {
            continue;
        };
        if !proj.is_player_owned || proj.stuck {
            continue;
        }
        let Some(arrow_rect) = rect_of(world, arrow, 0) else {
            continue;
        };
        let arrow_vel = world.velocities.copied(arrow).unwrap_or_default();

        let hit = enemies.iter().copied().find(|&e| {
            !killed.contains(&e)
                && rect_of(world, e, ENEMY_SPRITE_WIDTH).is_some_and(|r| r.overlaps(&arrow_rect))
        });
        let Some(enemy) = hit else {
            continue;
        };

        let (kx, ky) = scale_to(arrow_vel.x, arrow_vel.y, config.knockback_force);
        if let Some(ai) = world.ais.get_mut(enemy) {
            ai.hit_timer = config.enemy_hit_frames;
            ai.hit_timer_max = config.enemy_hit_frames;
            ai.knockback_vel_x = kx;
            ai.knockback_vel_y = ky;
        }
        world.velocities.insert(enemy, Velocity::new(kx, ky));
        result.hitstop_frames = result.hitstop_frames.max(config.hitstop_frames);
        result.screen_shake = result.screen_shake.max(config.shake_intensity);

        let dead = match world.healths.get_mut(enemy) {
            Some(health) => {
                health.damage(proj.damage);
                health.is_dead()
            }
            None => false,
        };
        if dead {
            killed.push(enemy);
            if let (Some(pos), Some(ai)) = (world.positions.copied(enemy), world.ais.copied(enemy)) {
                create_gold(
                    world,
                    config,
                    pos.pixel_x() + ENEMY_SPRITE_WIDTH / 2,
                    pos.pixel_y(),
                    ai.gold_drop(),
                );
            }
        }
        world.destroy(arrow);
    }

    for enemy in killed {
        tracing::debug!(enemy = %enemy, "enemy killed");
        world.destroy(enemy);
        result.enemies_killed += 1;
    }
}

fn hurt_player(
    world: &mut World,
    config: &PhysicsConfig,
    pid: EntityId,
    damage: i32,
    stun: bool,
    result: &mut DamageResult,
) {
    let iframes = config.iframe_frames;
    if let Some(player) = world.players.get_mut(pid) {
        player.iframe_timer = iframes;
        if stun {
            player.stun_timer = config.stun_frames;
        }
    }
    if let Some(health) = world.healths.get_mut(pid) {
        health.damage(damage);
        health.iframe = iframes;
    }
    result.player_damaged = true;
    result.screen_shake = result.screen_shake.max(config.player_hit_shake);
}

/// Knockback away from `source_x`. Sources exactly level push right.
fn knockback_from(config: &PhysicsConfig, player_x: i32, source_x: i32) -> Velocity {
    let sign = if player_x >= source_x { 1 } else { -1 };
    Velocity::new(sign * config.knockback_force, -config.knockback_up)
}

fn enemy_arrows_vs_player(
    world: &mut World,
    config: &PhysicsConfig,
    pid: EntityId,
    result: &mut DamageResult,
    knockback: &mut Option<Velocity>,
) {
    for arrow in world.is_projectile.to_vec() {
        if player_invincible(world, pid) {
            return;
        }
        let Some(proj) = world.projectiles.copied(arrow) else {
            continue;
        };
        if proj.is_player_owned || proj.stuck {
            continue;
        }
        let (Some(arrow_rect), Some(player_rect)) =
            (rect_of(world, arrow, 0), rect_of(world, pid, PLAYER_SPRITE_WIDTH))
        else {
            continue;
        };
        if !arrow_rect.overlaps(&player_rect) {
            continue;
        }
        hurt_player(world, config, pid, proj.damage, false, result);
        *knockback = Some(knockback_from(config, player_rect.center_x(), arrow_rect.center_x()));
        world.destroy(arrow);
    }
}

fn enemies_vs_player(
    world: &mut World,
    config: &PhysicsConfig,
    pid: EntityId,
    result: &mut DamageResult,
    knockback: &mut Option<Velocity>,
) {
    for enemy in world.is_enemy.to_vec() {
        if player_invincible(world, pid) {
            return;
        }
        let (Some(enemy_rect), Some(player_rect)) = (
            rect_of(world, enemy, ENEMY_SPRITE_WIDTH),
            rect_of(world, pid, PLAYER_SPRITE_WIDTH),
        ) else {
            continue;
        };
        if !enemy_rect.overlaps(&player_rect) {
            continue;
        }
        let damage = world.ais.get(enemy).map_or(0, |ai| ai.contact_damage);
        hurt_player(world, config, pid, damage, true, result);
        *knockback = Some(knockback_from(config, player_rect.center_x(), enemy_rect.center_x()));
    }
}

/// Spike tiles directly under the player's feet.
pub fn spike_check(world: &mut World, config: &PhysicsConfig, stage: &dyn Stage) -> DamageResult {
    let mut result = DamageResult::default();
    let Some(pid) = world.player() else {
        return result;
    };
    if player_invincible(world, pid) {
        return result;
    }
    let (Some(pos), Some(hitbox)) = (world.positions.copied(pid), world.trapezoids.copied(pid))
    else {
        return result;
    };
    let right = world.facings.copied(pid).map_or(true, |f| f.right);
    let feet = hitbox
        .feet
        .rect_at(pos.pixel_x(), pos.pixel_y(), right, PLAYER_SPRITE_WIDTH);
    let row = feet.bottom() + 1;
    let Some(spike_x) =
        (feet.x..=feet.right()).find(|&x| stage.tile_type_at(x, row) == TileType::Spike)
    else {
        return result;
    };

    let damage = stage.tile_damage_at(spike_x, row);
    hurt_player(world, config, pid, damage, false, &mut result);
    result.screen_shake = config.spike_shake;
    if let Some(vel) = world.velocities.get_mut(pid) {
        vel.y = -config.spike_bounce;
    }
    if let Some(mv) = world.movements.get_mut(pid) {
        mv.on_ground = false;
    }
    tracing::debug!(player = %pid, damage, "spike hit");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{create_enemy, create_player, create_projectile};
    use crate::stage::TileStage;

    fn arrow_at(world: &mut World, cfg: &PhysicsConfig, x: i32, y: i32, vx: i32, player: bool) -> EntityId {
        let kind = if player { ArrowType::Standard } else { ArrowType::Enemy };
        let stats = *cfg.arrows.get(kind);
        create_projectile(world, kind, &stats, x, y, Velocity::new(vx, 0), player)
    }

    #[test]
    fn player_arrow_hits_first_enemy_and_knocks_back() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let a = create_enemy(&mut world, &cfg, AiType::Patrol, 100, 40, false);
        let b = create_enemy(&mut world, &cfg, AiType::Patrol, 100, 40, false);
        let arrow = arrow_at(&mut world, &cfg, 108, 50, 128, true);

        let result = resolve_damage(&mut world, &cfg);
        assert!(!world.exists(arrow));
        assert_eq!(result.hitstop_frames, cfg.hitstop_frames);
        assert_eq!(result.screen_shake, cfg.shake_intensity);
        assert_eq!(
            world.healths.copied(a).unwrap().current,
            cfg.enemies.patrol.health - cfg.arrows.standard.damage
        );
        assert_eq!(world.healths.copied(b).unwrap().current, cfg.enemies.patrol.health);
        let ai = world.ais.copied(a).unwrap();
        assert_eq!(ai.hit_timer, 12);
        assert_eq!(ai.hit_timer_max, 12);
        assert_eq!((ai.knockback_vel_x, ai.knockback_vel_y), (cfg.knockback_force, 0));
        assert_eq!(
            world.velocities.copied(a),
            Some(Velocity::new(cfg.knockback_force, 0))
        );
    }

    #[test]
    fn kill_drops_gold_at_top_centre() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let e = create_enemy(&mut world, &cfg, AiType::Patrol, 100, 40, false);
        world.healths.get_mut(e).unwrap().current = 5;
        arrow_at(&mut world, &cfg, 108, 50, 128, true);

        let result = resolve_damage(&mut world, &cfg);
        assert_eq!(result.enemies_killed, 1);
        assert!(!world.exists(e));
        let gold = world.is_gold.to_vec();
        assert_eq!(gold.len(), 1);
        assert_eq!(world.golds.copied(gold[0]).unwrap().amount, 5);
        let pos = world.positions.copied(gold[0]).unwrap();
        assert_eq!(pos.pixel_x(), 108 - cfg.gold.hitbox_width / 2);
        assert_eq!(pos.pixel_y(), 40);
    }

    #[test]
    fn enemy_arrow_hurts_and_pushes_player_away() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 100, 46);
        // Arrow tip left of the body centre.
        let arrow = arrow_at(&mut world, &cfg, 105, 55, 94, false);

        let result = resolve_damage(&mut world, &cfg);
        assert!(result.player_damaged);
        assert_eq!(result.screen_shake, cfg.player_hit_shake);
        assert!(!world.exists(arrow));
        assert_eq!(world.healths.copied(p).unwrap().current, 90);
        assert_eq!(world.players.copied(p).unwrap().iframe_timer, cfg.iframe_frames);
        assert_eq!(world.players.copied(p).unwrap().stun_timer, 0);
        assert_eq!(
            world.velocities.copied(p),
            Some(Velocity::new(cfg.knockback_force, -cfg.knockback_up))
        );
    }

    #[test]
    fn iframes_block_damage() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 100, 46);
        world.players.get_mut(p).unwrap().iframe_timer = 3;
        let arrow = arrow_at(&mut world, &cfg, 105, 55, 94, false);
        create_enemy(&mut world, &cfg, AiType::Patrol, 100, 40, false);
        let result = resolve_damage(&mut world, &cfg);
        assert!(!result.player_damaged);
        assert!(world.exists(arrow));
        assert_eq!(world.healths.copied(p).unwrap().current, 100);
    }

    #[test]
    fn active_dash_blocks_arrows_and_contact() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 100, 46);
        assert_eq!(world.players.copied(p).unwrap().iframe_timer, 0);
        world.dashes.get_mut(p).unwrap().active = true;
        let arrow = arrow_at(&mut world, &cfg, 105, 55, 94, false);
        create_enemy(&mut world, &cfg, AiType::Aggressive, 106, 40, false);

        let result = resolve_damage(&mut world, &cfg);
        assert!(!result.player_damaged);
        assert!(world.exists(arrow));
        assert_eq!(world.healths.copied(p).unwrap().current, 100);
        assert_eq!(world.players.copied(p).unwrap().stun_timer, 0);

        world.dashes.get_mut(p).unwrap().active = false;
        let result = resolve_damage(&mut world, &cfg);
        assert!(result.player_damaged);
        assert!(!world.exists(arrow));
    }

    #[test]
    fn contact_stuns_player() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 100, 46);
        create_enemy(&mut world, &cfg, AiType::Aggressive, 106, 40, false);
        let result = resolve_damage(&mut world, &cfg);
        assert!(result.player_damaged);
        let player = world.players.copied(p).unwrap();
        assert_eq!(player.stun_timer, cfg.stun_frames);
        assert_eq!(
            world.healths.copied(p).unwrap().current,
            100 - cfg.enemies.aggressive.contact_damage
        );
        // Enemy is to the right, so the player is pushed left.
        assert_eq!(world.velocities.copied(p).unwrap().x, -cfg.knockback_force);
    }

    #[test]
    fn spikes_hurt_and_bounce() {
        let cfg = PhysicsConfig::default();
        let stage = TileStage::from_ascii(
            "spikes",
            &["#....#", "#.P..#", "#^^^^#"],
            16,
            10,
        )
        .unwrap();
        let mut world = World::new();
        let (sx, sy) = stage.spawn();
        let p = create_player(&mut world, &cfg, sx, sy);
        world.movements.get_mut(p).unwrap().on_ground = true;

        let result = spike_check(&mut world, &cfg, &stage);
        assert!(result.player_damaged);
        assert_eq!(result.screen_shake, cfg.spike_shake);
        assert_eq!(world.healths.copied(p).unwrap().current, 90);
        assert_eq!(world.players.copied(p).unwrap().iframe_timer, cfg.iframe_frames);
        assert!(world.velocities.copied(p).unwrap().y < 0);
        assert!(!world.movements.copied(p).unwrap().on_ground);

        // Invincible now.
        let again = spike_check(&mut world, &cfg, &stage);
        assert_eq!(again, DamageResult::default());
    }

    #[test]
    fn merge_takes_maxima() {
        let mut a = DamageResult {
            hitstop_frames: 3,
            screen_shake: 4,
            player_damaged: false,
            enemies_killed: 1,
        };
        a.merge(DamageResult {
            hitstop_frames: 0,
            screen_shake: 6,
            player_damaged: true,
            enemies_killed: 2,
        });
        assert_eq!(a.hitstop_frames, 3);
        assert_eq!(a.screen_shake, 6);
        assert!(a.player_damaged);
        assert_eq!(a.enemies_killed, 3);
    }
}
