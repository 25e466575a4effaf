//! Substep movement for the player, projectiles and gold.
//!
//! Every mover advances one IU at a time. Tile tests only run when a step
//! crosses a pixel boundary, since collision geometry is pixel-aligned. The
//! enemy substep lives in [`crate::enemy`].

use quiver_ecs::prelude::*;

use crate::collision::{
    gold_blocked, player_blocked_x, player_bonks, player_lands, rect_solid, resolve_overlap,
    Overlap, PlayerRects,
};
use crate::config::{EntombedPolicy, PhysicsConfig};
use crate::spawn::{PLAYER_SPRITE_HEIGHT, PLAYER_SPRITE_WIDTH};
use crate::stage::Stage;
use crate::units::percent;

#[inline]
fn crosses(from: i32, to: i32) -> bool {
    from >> PIXEL_SHIFT != to >> PIXEL_SHIFT
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Mutable state one player substep works on.
struct PlayerBody {
    pos: Position,
    vel: Velocity,
    mv: Movement,
    facing: Facing,
    hitbox: TrapezoidHitbox,
}

impl PlayerBody {
    fn rects_at(&self, px: i32, py: i32) -> PlayerRects {
        PlayerRects::at(&self.hitbox, px, py, self.facing.right)
    }
}

/// One physics substep for the player.
pub fn player_substep(world: &mut World, config: &PhysicsConfig, stage: &dyn Stage) {
    let Some(id) = world.player() else {
        return;
    };
    let (Some(pos), Some(vel), Some(mv), Some(facing), Some(hitbox)) = (
        world.positions.copied(id),
        world.velocities.copied(id),
        world.movements.copied(id),
        world.facings.copied(id),
        world.trapezoids.copied(id),
    ) else {
        return;
    };
    let mut body = PlayerBody {
        pos,
        vel,
        mv,
        facing,
        hitbox,
    };

    body.mv.begin_substep();
    push_out(&mut body, config, stage);
    move_player_x(&mut body, stage);
    move_player_y(&mut body, config, stage);

    if body.vel.y == 0 {
        let probe = body.pos.y + 1;
        if crosses(body.pos.y, probe) {
            let rects = body.rects_at(body.pos.pixel_x(), probe >> PIXEL_SHIFT);
            if player_lands(stage, &rects) {
                body.mv.on_ground = true;
            }
        }
    }
    push_out(&mut body, config, stage);

    if body.vel.x > 0 {
        body.facing.right = true;
    } else if body.vel.x < 0 {
        body.facing.right = false;
    }

    world.positions.insert(id, body.pos);
    world.velocities.insert(id, body.vel);
    world.movements.insert(id, body.mv);
    world.facings.insert(id, body.facing);
}

fn push_out(body: &mut PlayerBody, config: &PhysicsConfig, stage: &dyn Stage) {
    let result = resolve_overlap(
        stage,
        &body.hitbox,
        body.facing.right,
        &mut body.pos,
        &mut body.vel,
        &mut body.mv,
    );
    if result != Overlap::Entombed {
        return;
    }
    match config.entombed_policy {
        EntombedPolicy::Stay => {
            tracing::warn!(
                px = body.pos.pixel_x(),
                py = body.pos.pixel_y(),
                "player entombed, leaving in place"
            );
        }
        EntombedPolicy::RespawnAtSpawn => {
            let (sx, sy) = stage.spawn();
            tracing::warn!(
                px = body.pos.pixel_x(),
                py = body.pos.pixel_y(),
                sx,
                sy,
                "player entombed, respawning"
            );
            body.pos = Position::from_pixels(sx, sy);
            body.vel = Velocity::ZERO;
        }
    }
}

fn move_player_x(body: &mut PlayerBody, stage: &dyn Stage) {
    let dir = body.vel.x.signum();
    for _ in 0..body.vel.x.abs() {
        let next = body.pos.x + dir;
        if crosses(body.pos.x, next) {
            let rects = body.rects_at(next >> PIXEL_SHIFT, body.pos.pixel_y());
            if player_blocked_x(stage, &rects, dir) {
                if dir > 0 {
                    body.mv.on_wall_right = true;
                } else {
                    body.mv.on_wall_left = true;
                }
                body.vel.x = 0;
                return;
            }
        }
        body.pos.x = next;
    }
}

fn move_player_y(body: &mut PlayerBody, config: &PhysicsConfig, stage: &dyn Stage) {
    let dir = body.vel.y.signum();
    for _ in 0..body.vel.y.abs() {
        let next = body.pos.y + dir;
        if crosses(body.pos.y, next) {
            let px = body.pos.pixel_x();
            let npy = next >> PIXEL_SHIFT;
            let rects = body.rects_at(px, npy);
            if dir > 0 {
                if player_lands(stage, &rects) {
                    body.mv.on_ground = true;
                    body.vel.y = 0;
                    return;
                }
            } else if player_bonks(stage, &rects) {
                match corner_nudge(body, config, stage, px, npy) {
                    Some(shift) => body.pos.x += shift * POSITION_SCALE,
                    None => {
                        body.mv.on_ceiling = true;
                        body.vel.y = 0;
                        return;
                    }
                }
            }
        }
        body.pos.y = next;
    }
}

/// First horizontal shift that lets the head rise into row `npy`.
///
/// Tries 1..=margin pixels to the left, then 1..=margin to the right. A
/// nudge is accepted only if the head is clear at the new row and the body
/// is clear at the current row, both at the shifted X.
fn corner_nudge(
    body: &PlayerBody,
    config: &PhysicsConfig,
    stage: &dyn Stage,
    px: i32,
    npy: i32,
) -> Option<i32> {
    if !config.corner_correction_enabled {
        return None;
    }
    let py = body.pos.pixel_y();
    let margin = config.corner_correction_margin;
    (1..=margin)
        .map(|n| -n)
        .chain(1..=margin)
        .find(|&shift| {
            let up = body.rects_at(px + shift, npy);
            let here = body.rects_at(px + shift, py);
            !rect_solid(stage, up.head) && !rect_solid(stage, here.body)
        })
}

// ---------------------------------------------------------------------------
// Projectiles
// ---------------------------------------------------------------------------

/// One physics substep for every flying projectile.
pub fn projectile_substep(world: &mut World, stage: &dyn Stage) {
    for id in world.is_projectile.to_vec() {
        let (Some(mut proj), Some(mut pos), Some(mut vel)) = (
            world.projectiles.copied(id),
            world.positions.copied(id),
            world.velocities.copied(id),
        ) else {
            continue;
        };
        if proj.stuck {
            continue;
        }

        step_projectile(&mut proj, &mut pos, &mut vel, stage);

        if !proj.stuck && (pos.pixel_x() - proj.start_x).abs() > proj.max_range {
            world.destroy(id);
            continue;
        }
        world.projectiles.insert(id, proj);
        world.positions.insert(id, pos);
        world.velocities.insert(id, vel);
    }
}

/// Bresenham walk along `vel`, one IU on the dominant axis per iteration.
fn step_projectile(
    proj: &mut Projectile,
    pos: &mut Position,
    vel: &mut Velocity,
    stage: &dyn Stage,
) {
    let total = vel.x.abs().max(vel.y.abs());
    if total == 0 {
        return;
    }
    let (base_x, base_y) = (vel.x / total, vel.y / total);
    let (rem_x, rem_y) = (vel.x % total, vel.y % total);
    let (mut acc_x, mut acc_y) = (0, 0);

    for _ in 0..total {
        let mut dx = base_x;
        let mut dy = base_y;
        acc_x += rem_x.abs();
        if acc_x >= total {
            acc_x -= total;
            dx += rem_x.signum();
        }
        acc_y += rem_y.abs();
        if acc_y >= total {
            acc_y -= total;
            dy += rem_y.signum();
        }
        pos.x += dx;
        pos.y += dy;

        if stage.is_solid_at(pos.pixel_x(), pos.pixel_y()) {
            proj.stuck = true;
            proj.stuck_timer = 0;
            proj.stuck_rotation = (vel.y as f32).atan2(vel.x as f32);
            *vel = Velocity::ZERO;
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Gold
// ---------------------------------------------------------------------------

/// One physics substep for every airborne gold pickup.
pub fn gold_substep(world: &mut World, stage: &dyn Stage) {
    for id in world.is_gold.to_vec() {
        let (Some(mut gold), Some(mut pos), Some(mut vel)) = (
            world.golds.copied(id),
            world.positions.copied(id),
            world.velocities.copied(id),
        ) else {
            continue;
        };
        if gold.grounded {
            continue;
        }
        move_gold(&mut gold, &mut pos, &mut vel, stage);
        world.golds.insert(id, gold);
        world.positions.insert(id, pos);
        world.velocities.insert(id, vel);
    }
}

fn move_gold(gold: &mut Gold, pos: &mut Position, vel: &mut Velocity, stage: &dyn Stage) {
    let rect_at = |px: i32, py: i32| Rect::new(px, py, gold.hitbox_width, gold.hitbox_height);

    let dir = vel.x.signum();
    for _ in 0..vel.x.abs() {
        let next = pos.x + dir;
        if crosses(pos.x, next) && gold_blocked(stage, rect_at(next >> PIXEL_SHIFT, pos.pixel_y()), dir, 0)
        {
            vel.x = -percent(vel.x, gold.bounce_percent);
            break;
        }
        pos.x = next;
    }

    let dir = vel.y.signum();
    for _ in 0..vel.y.abs() {
        let next = pos.y + dir;
        if crosses(pos.y, next) && gold_blocked(stage, rect_at(pos.pixel_x(), next >> PIXEL_SHIFT), 0, dir)
        {
            if dir > 0 {
                gold.grounded = true;
                *vel = Velocity::ZERO;
            } else {
                vel.y = -percent(vel.y, gold.bounce_percent);
            }
            return;
        }
        pos.y = next;
    }
}

/// Collect every pickup whose delay has run out and whose centre is within
/// its collect radius of the player's centre. Returns the gold collected.
pub fn collect_gold(world: &mut World) -> i32 {
    let Some(pid) = world.player() else {
        return 0;
    };
    let Some(ppos) = world.positions.copied(pid) else {
        return 0;
    };
    let pcx = ppos.pixel_x() + PLAYER_SPRITE_WIDTH / 2;
    let pcy = ppos.pixel_y() + PLAYER_SPRITE_HEIGHT / 2;

    let mut collected = 0;
    for id in world.is_gold.to_vec() {
        let (Some(gold), Some(pos)) = (world.golds.copied(id), world.positions.copied(id)) else {
            continue;
        };
        if gold.collect_delay > 0 {
            continue;
        }
        let dx = i64::from(pos.pixel_x() + gold.hitbox_width / 2 - pcx);
        let dy = i64::from(pos.pixel_y() + gold.hitbox_height / 2 - pcy);
        let radius = i64::from(gold.collect_radius);
        if dx * dx + dy * dy <= radius * radius {
            collected += gold.amount;
            world.destroy(id);
        }
    }
    if collected > 0 {
        if let Some(player) = world.players.get_mut(pid) {
            player.gold += collected;
        }
    }
    collected
}
