//! Enemy behaviour substep.
//!
//! Each substep every enemy either rides out its knockback or runs its AI.
//! Distances to the player are taxicab pixels between top-left corners.

use quiver_ecs::prelude::*;

use crate::collision::enemy_blocked;
use crate::config::PhysicsConfig;
use crate::spawn::create_enemy_arrow;
use crate::stage::Stage;

/// How far above an enemy (in pixels) the player must be before an
/// aggressive enemy jumps.
pub const JUMP_TRIGGER_HEIGHT: i32 = 20;

/// State an enemy substep reads and writes.
struct EnemyBody {
    pos: Position,
    vel: Velocity,
    mv: Movement,
    facing: Facing,
    ai: Ai,
}

/// One physics substep for every enemy.
pub fn enemy_substep(world: &mut World, config: &PhysicsConfig, stage: &dyn Stage) {
    let target = world
        .player()
        .and_then(|p| world.positions.copied(p))
        .map(|p| (p.pixel_x(), p.pixel_y()));

    for id in world.is_enemy.to_vec() {
        let (Some(pos), Some(vel), Some(mv), Some(facing), Some(ai)) = (
            world.positions.copied(id),
            world.velocities.copied(id),
            world.movements.copied(id),
            world.facings.copied(id),
            world.ais.copied(id),
        ) else {
            continue;
        };
        let mut body = EnemyBody {
            pos,
            vel,
            mv,
            facing,
            ai,
        };
        body.mv.on_wall_left = false;
        body.mv.on_wall_right = false;
        body.mv.on_ceiling = false;

        let fire = if body.ai.is_stunned() {
            ride_knockback(&mut body, stage);
            false
        } else {
            think(&mut body, config, stage, target)
        };

        if fire {
            create_enemy_arrow(
                world,
                config,
                body.pos.pixel_x(),
                body.pos.pixel_y(),
                body.facing,
            );
        }

        world.positions.insert(id, body.pos);
        world.velocities.insert(id, body.vel);
        world.movements.insert(id, body.mv);
        world.facings.insert(id, body.facing);
        world.ais.insert(id, body.ai);
    }
}

fn ride_knockback(body: &mut EnemyBody, stage: &dyn Stage) {
    let vx = body.vel.x;
    move_x(body, vx, stage);
    let vy = body.vel.y;
    move_y(body, vy, stage);
}

/// Run the AI for one substep. Returns whether the enemy fires.
fn think(
    body: &mut EnemyBody,
    config: &PhysicsConfig,
    stage: &dyn Stage,
    target: Option<(i32, i32)>,
) -> bool {
    let px = body.pos.pixel_x();
    let (dx, dy) = target.map_or((0, 0), |(tx, ty)| (tx - px, ty - body.pos.pixel_y()));
    let distance = if target.is_some() {
        dx.abs() + dy.abs()
    } else {
        i32::MAX
    };
    let cooldown = config.enemies.get(body.ai.ai_type).attack_cooldown_frames;

    match body.ai.ai_type {
        AiType::Patrol => {
            patrol(body, stage);
            if !body.ai.flying {
                let vy = body.vel.y;
                move_y(body, vy, stage);
            }
            false
        }
        AiType::Aggressive => {
            let vy = body.vel.y;
            move_y(body, vy, stage);
            face_toward(body, dx);
            let speed = body.facing.sign() * body.ai.move_speed;
            body.vel.x = speed;
            move_x(body, speed, stage);
            if dy < -JUMP_TRIGGER_HEIGHT && body.mv.on_ground {
                body.vel.y = -body.ai.jump_force;
                body.mv.on_ground = false;
            }
            try_attack(body, distance, cooldown)
        }
        AiType::Ranged => {
            face_toward(body, dx);
            body.vel.x = 0;
            if !body.ai.flying {
                let vy = body.vel.y;
                move_y(body, vy, stage);
            }
            try_attack(body, distance, cooldown)
        }
        AiType::Chase => {
            if !body.ai.flying {
                let vy = body.vel.y;
                move_y(body, vy, stage);
            }
            if distance > body.ai.detect_range {
                body.vel.x = 0;
                if body.ai.flying {
                    body.vel.y = 0;
                }
                return false;
            }
            face_toward(body, dx);
            let vx = dx.signum() * body.ai.move_speed;
            body.vel.x = vx;
            move_x(body, vx, stage);
            if body.ai.flying {
                let vy = dy.signum() * body.ai.move_speed;
                body.vel.y = vy;
                move_y(body, vy, stage);
            }
            false
        }
    }
}

fn face_toward(body: &mut EnemyBody, dx: i32) {
    if dx > 0 {
        body.facing.right = true;
    } else if dx < 0 {
        body.facing.right = false;
    }
}

fn try_attack(body: &mut EnemyBody, distance: i32, cooldown: i32) -> bool {
    if distance < body.ai.attack_range && body.ai.attack_timer <= 0 {
        body.ai.attack_timer = cooldown;
        true
    } else {
        false
    }
}

fn patrol(body: &mut EnemyBody, stage: &dyn Stage) {
    let px = body.pos.pixel_x();
    let ai = &mut body.ai;
    if ai.patrol_dir > 0 && px >= ai.patrol_start_x + ai.patrol_distance {
        ai.patrol_dir = -1;
        body.facing.right = false;
    } else if ai.patrol_dir < 0 && px <= ai.patrol_start_x - ai.patrol_distance {
        ai.patrol_dir = 1;
        body.facing.right = true;
    }

    let move_x_amount = body.ai.patrol_dir * body.ai.move_speed;
    body.vel.x = move_x_amount;
    if move_x(body, move_x_amount, stage) {
        body.ai.patrol_dir = -body.ai.patrol_dir;
        body.facing.right = body.ai.patrol_dir > 0;
    }
}

/// Returns whether a wall stopped the move.
fn move_x(body: &mut EnemyBody, amount: i32, stage: &dyn Stage) -> bool {
    let dir = amount.signum();
    for _ in 0..amount.abs() {
        let next = body.pos.x + dir;
        if next >> PIXEL_SHIFT != body.pos.x >> PIXEL_SHIFT
            && enemy_blocked(stage, next >> PIXEL_SHIFT, body.pos.pixel_y(), dir, 0)
        {
            if dir > 0 {
                body.mv.on_wall_right = true;
            } else {
                body.mv.on_wall_left = true;
            }
            return true;
        }
        body.pos.x = next;
    }
    false
}

/// Returns whether a floor or ceiling stopped the move.
fn move_y(body: &mut EnemyBody, amount: i32, stage: &dyn Stage) -> bool {
    let dir = amount.signum();
    for _ in 0..amount.abs() {
        let next = body.pos.y + dir;
        if next >> PIXEL_SHIFT != body.pos.y >> PIXEL_SHIFT
            && enemy_blocked(stage, body.pos.pixel_x(), next >> PIXEL_SHIFT, 0, dir)
        {
            if dir > 0 {
                body.mv.on_ground = true;
            } else {
                body.mv.on_ceiling = true;
            }
            body.vel.y = 0;
            return true;
        }
        body.pos.y = next;
    }
    false
}
