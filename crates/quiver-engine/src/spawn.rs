//! Entity factories and sprite geometry.
//!
//! Every entity the simulation creates comes from one of the `create_*`
//! functions here, so the component set of each population is defined in a
//! single place.

use quiver_ecs::prelude::*;

use crate::config::{ArrowStats, PhysicsConfig};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

pub const PLAYER_SPRITE_WIDTH: i32 = 16;
pub const PLAYER_SPRITE_HEIGHT: i32 = 18;

/// Narrow head, body for walls and damage, wide feet.
pub const PLAYER_HITBOX: TrapezoidHitbox = TrapezoidHitbox {
    head: Hitbox::new(5, 0, 6, 6),
    body: Hitbox::new(4, 2, 8, 13),
    feet: Hitbox::new(2, 12, 12, 6),
};

pub const ENEMY_SPRITE_WIDTH: i32 = 16;
pub const ENEMY_SPRITE_HEIGHT: i32 = 24;
pub const ENEMY_HITBOX: Hitbox = Hitbox::new(2, 4, 12, 20);

/// Centred on the arrow tip.
pub const PROJECTILE_HITBOX: Hitbox = Hitbox::new(-2, -2, 4, 4);

/// Enemy arrows leave from this offset to the enemy's top-left pixel.
pub const ENEMY_ARROW_OFFSET: (i32, i32) = (8, 8);

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Create the player at pixel `(px, py)` and record it as the world's player.
pub fn create_player(world: &mut World, config: &PhysicsConfig, px: i32, py: i32) -> EntityId {
    let id = world.new_entity();
    world.positions.insert(id, Position::from_pixels(px, py));
    world.velocities.insert(id, Velocity::ZERO);
    world.movements.insert(id, Movement::default());
    world
        .healths
        .insert(id, Health::new(config.player_max_health));
    world.trapezoids.insert(id, PLAYER_HITBOX);
    world.hitboxes.insert(id, PLAYER_HITBOX.body);
    world.facings.insert(id, Facing::RIGHT);
    world.dashes.insert(id, Dash::default());
    world
        .players
        .insert(id, Player::new(config.equipped_arrows));
    world.is_player.insert(id);
    world.player_id = id;
    id
}

/// Create an enemy from the template for `ai_type` at pixel `(px, py)`.
///
/// Patrols always start heading left; `facing_right` only sets the sprite.
pub fn create_enemy(
    world: &mut World,
    config: &PhysicsConfig,
    ai_type: AiType,
    px: i32,
    py: i32,
    facing_right: bool,
) -> EntityId {
    let t = config.enemies.get(ai_type);
    let id = world.new_entity();
    world.positions.insert(id, Position::from_pixels(px, py));
    world.velocities.insert(id, Velocity::ZERO);
    world.movements.insert(id, Movement::default());
    world.healths.insert(id, Health::new(t.health));
    world.hitboxes.insert(id, ENEMY_HITBOX);
    world.facings.insert(id, Facing { right: facing_right });
    world.ais.insert(
        id,
        Ai {
            ai_type,
            detect_range: t.detect_range,
            attack_range: t.attack_range,
            patrol_distance: t.patrol_distance,
            move_speed: t.move_speed,
            jump_force: t.jump_force,
            contact_damage: t.contact_damage,
            flying: t.flying,
            patrol_start_x: px,
            patrol_dir: -1,
            attack_timer: 0,
            hit_timer: 0,
            hit_timer_max: 0,
            knockback_vel_x: 0,
            knockback_vel_y: 0,
            gold_drop_min: t.gold_drop_min,
            gold_drop_max: t.gold_drop_max,
        },
    );
    world.is_enemy.insert(id);
    id
}

/// Create an arrow whose tip is at pixel `(px, py)`.
pub fn create_projectile(
    world: &mut World,
    kind: ArrowType,
    stats: &ArrowStats,
    px: i32,
    py: i32,
    velocity: Velocity,
    is_player_owned: bool,
) -> EntityId {
    let id = world.new_entity();
    world.positions.insert(id, Position::from_pixels(px, py));
    world.velocities.insert(id, velocity);
    world.hitboxes.insert(id, PROJECTILE_HITBOX);
    world.projectiles.insert(
        id,
        Projectile {
            kind,
            start_x: px,
            gravity_accel: stats.gravity_accel,
            max_fall_speed: stats.max_fall_speed,
            max_range: stats.max_range,
            damage: stats.damage,
            is_player_owned,
            stuck: false,
            stuck_timer: 0,
            stuck_duration: stats.stuck_duration,
            stuck_rotation: 0.0,
        },
    );
    world.is_projectile.insert(id);
    id
}

/// Fire an enemy arrow horizontally in the enemy's facing direction.
pub fn create_enemy_arrow(
    world: &mut World,
    config: &PhysicsConfig,
    enemy_px: i32,
    enemy_py: i32,
    facing: Facing,
) -> EntityId {
    let stats = config.arrows.enemy;
    create_projectile(
        world,
        ArrowType::Enemy,
        &stats,
        enemy_px + ENEMY_ARROW_OFFSET.0,
        enemy_py + ENEMY_ARROW_OFFSET.1,
        Velocity::new(facing.sign() * stats.speed, 0),
        false,
    )
}

/// Drop `amount` gold centred horizontally on pixel `center_x`, top at `py`.
///
/// The pickup pops upward. Its sideways drift is derived from the amount so
/// drops stay deterministic without touching the RNG.
pub fn create_gold(
    world: &mut World,
    config: &PhysicsConfig,
    center_x: i32,
    py: i32,
    amount: i32,
) -> EntityId {
    let g = &config.gold;
    let id = world.new_entity();
    world
        .positions
        .insert(id, Position::from_pixels(center_x - g.hitbox_width / 2, py));
    world.velocities.insert(
        id,
        Velocity::new(((amount % 10) - 5) * g.spread_velocity, -g.pop_velocity),
    );
    world
        .hitboxes
        .insert(id, Hitbox::new(0, 0, g.hitbox_width, g.hitbox_height));
    world.golds.insert(
        id,
        Gold {
            amount,
            grounded: false,
            collect_delay: g.collect_delay_frames,
            gravity: g.gravity,
            bounce_percent: g.bounce_pct,
            collect_radius: g.collect_radius,
            hitbox_width: g.hitbox_width,
            hitbox_height: g.hitbox_height,
        },
    );
    world.is_gold.insert(id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_gets_full_component_set() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let p = create_player(&mut world, &cfg, 80, 46);
        assert_eq!(world.player_id, p);
        assert!(world.is_player.contains(p));
        assert_eq!(world.positions.copied(p), Some(Position::from_pixels(80, 46)));
        assert_eq!(world.healths.copied(p).map(|h| h.current), Some(100));
        let player = world.players.copied(p).unwrap();
        assert!(player.equipped_arrows.contains(&player.current_arrow));
        assert!(world.dashes.copied(p).unwrap().can_dash);
    }

    #[test]
    fn feet_bottom_row_matches_sprite_height() {
        let feet = PLAYER_HITBOX.feet;
        assert_eq!(feet.offset_y + feet.height, PLAYER_SPRITE_HEIGHT);
        assert_eq!(
            ENEMY_HITBOX.offset_y + ENEMY_HITBOX.height,
            ENEMY_SPRITE_HEIGHT
        );
    }

    #[test]
    fn head_sits_inside_the_body_columns() {
        let (head, body) = (PLAYER_HITBOX.head, PLAYER_HITBOX.body);
        assert!(head.width < body.width);
        assert!(head.offset_x > body.offset_x);
        assert!(head.offset_x + head.width < body.offset_x + body.width);
        // Symmetric, so facing does not change which columns the head covers.
        assert_eq!(
            head.rect_at(0, 0, true, PLAYER_SPRITE_WIDTH),
            head.rect_at(0, 0, false, PLAYER_SPRITE_WIDTH)
        );
    }

    #[test]
    fn enemy_patrol_starts_left_regardless_of_facing() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let e = create_enemy(&mut world, &cfg, AiType::Patrol, 52, 40, true);
        let ai = world.ais.copied(e).unwrap();
        assert_eq!(ai.patrol_dir, -1);
        assert_eq!(ai.patrol_start_x, 52);
        assert!(world.facings.copied(e).unwrap().right);
        assert_eq!(world.count_enemies(), 1);
    }

    #[test]
    fn enemy_arrow_uses_fixed_speed_and_offset() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let a = create_enemy_arrow(&mut world, &cfg, 100, 40, Facing::LEFT);
        assert_eq!(world.velocities.copied(a), Some(Velocity::new(-94, 0)));
        let pos = world.positions.copied(a).unwrap();
        assert_eq!((pos.pixel_x(), pos.pixel_y()), (108, 48));
        let proj = world.projectiles.copied(a).unwrap();
        assert!(!proj.is_player_owned);
        assert_eq!(proj.start_x, 108);
    }

    #[test]
    fn gold_spread_follows_amount() {
        let cfg = PhysicsConfig::default();
        let mut world = World::new();
        let g = create_gold(&mut world, &cfg, 100, 50, 7);
        let v = world.velocities.copied(g).unwrap();
        assert_eq!(v.x, 2 * cfg.gold.spread_velocity);
        assert_eq!(v.y, -cfg.gold.pop_velocity);
        assert_eq!(world.positions.copied(g).unwrap().pixel_x(), 97);
        let centered = create_gold(&mut world, &cfg, 100, 50, 5);
        assert_eq!(world.velocities.copied(centered).unwrap().x, 0);
    }
}
