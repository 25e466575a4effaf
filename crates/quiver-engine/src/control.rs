//! Input to player velocity.
//!
//! Runs once per frame after the timers. Movement follows a fixed sequence of
//! short-circuits: a stunned player only slides to a stop, a dashing player
//! keeps the dash velocity, and everyone else gets acceleration, jump buffer,
//! coyote time, variable jump and dash in that order. Firing and the arrow
//! wheel are handled around the movement step.

use quiver_ecs::prelude::*;

use crate::camera::Camera;
use crate::config::PhysicsConfig;
use crate::input::InputState;
use crate::spawn::{create_projectile, PLAYER_SPRITE_HEIGHT, PLAYER_SPRITE_WIDTH};
use crate::units::{approach, percent, scale_to};

/// What the player did this frame, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlEvents {
    pub jumped: bool,
    pub dashed: bool,
    pub fired: Option<EntityId>,
    pub arrow_selected: Option<ArrowType>,
}

/// Map one frame of input onto the player.
pub fn apply_input(
    world: &mut World,
    config: &PhysicsConfig,
    input: &InputState,
    camera: Camera,
) -> ControlEvents {
    let mut events = ControlEvents::default();
    let Some(id) = world.player() else {
        return events;
    };
    let cursor = camera.to_world(input.mouse_x, input.mouse_y);

    events.arrow_selected = update_arrow_select(world, id, input, cursor);
    let (jumped, dashed) = map_movement(world, config, id, input);
    events.jumped = jumped;
    events.dashed = dashed;
    if input.mouse_click {
        events.fired = fire(world, config, id, cursor);
    }
    events
}

fn player_center(pos: Position) -> (i32, i32) {
    (
        pos.pixel_x() + PLAYER_SPRITE_WIDTH / 2,
        pos.pixel_y() + PLAYER_SPRITE_HEIGHT / 2,
    )
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Returns `(jumped, dashed)`.
fn map_movement(
    world: &mut World,
    config: &PhysicsConfig,
    id: EntityId,
    input: &InputState,
) -> (bool, bool) {
    let (Some(mut player), Some(mut vel), Some(mut mv), Some(mut dash), Some(mut facing)) = (
        world.players.copied(id),
        world.velocities.copied(id),
        world.movements.copied(id),
        world.dashes.copied(id),
        world.facings.copied(id),
    ) else {
        return (false, false);
    };

    let mut jumped = false;
    let mut dashed = false;

    if player.is_stunned() {
        let slowed = (vel.x.abs() - config.knockback_decay).max(0);
        vel.x = vel.x.signum() * slowed;
        world.velocities.insert(id, vel);
        return (false, false);
    }
    if dash.active {
        return (false, false);
    }

    if mv.on_ground {
        player.coyote_timer = config.coyote_frames;
    }

    let mut target = if input.right {
        config.max_speed
    } else if input.left {
        -config.max_speed
    } else {
        0
    };
    if !mv.on_ground {
        target = percent(target, config.air_control_pct);
    }

    if target != 0 {
        let mut accel = config.acceleration;
        if vel.x != 0 && vel.x.signum() != target.signum() {
            accel = percent(accel, config.turnaround_pct);
        }
        vel.x = approach(vel.x, target, accel);
        facing.right = target > 0;
    } else {
        vel.x = approach(vel.x, 0, config.deceleration);
    }

    if input.jump_pressed {
        player.jump_buffer_timer = config.jump_buffer_frames;
    }
    if (mv.on_ground || player.coyote_timer > 0) && player.jump_buffer_timer > 0 {
        vel.y = -config.jump_force;
        mv.on_ground = false;
        player.coyote_timer = 0;
        player.jump_buffer_timer = 0;
        jumped = true;
    }

    if input.jump_released && vel.y < 0 {
        vel.y = percent(vel.y, config.var_jump_pct);
    }

    if input.dash && dash.can_dash && dash.cooldown <= 0 {
        dash = Dash {
            active: true,
            can_dash: false,
            timer: config.dash_frames,
            cooldown: config.dash_cooldown_frames,
        };
        player.iframe_timer = config.dash_iframes;
        vel.x = facing.sign() * config.dash_speed;
        vel.y = 0;
        dashed = true;
        if let Some(health) = world.healths.get_mut(id) {
            health.iframe = player.iframe_timer;
        }
    }

    world.players.insert(id, player);
    world.velocities.insert(id, vel);
    world.movements.insert(id, mv);
    world.dashes.insert(id, dash);
    world.facings.insert(id, facing);
    (jumped, dashed)
}

// ---------------------------------------------------------------------------
// Arrows
// ---------------------------------------------------------------------------

/// Wheel slot for an aim vector: right 0, up 1, left 2, down 3 by dominant
/// axis. Horizontal wins ties.
pub fn slot_for_direction(dx: i32, dy: i32) -> usize {
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            0
        } else {
            2
        }
    } else if dy < 0 {
        1
    } else {
        3
    }
}

fn update_arrow_select(
    world: &mut World,
    id: EntityId,
    input: &InputState,
    cursor: (i32, i32),
) -> Option<ArrowType> {
    let pos = world.positions.copied(id)?;
    let player = world.players.get_mut(id)?;
    if input.right_click_pressed {
        player.selecting_arrow = true;
    }
    if input.right_click_released && player.selecting_arrow {
        let (cx, cy) = player_center(pos);
        player.select_slot(slot_for_direction(cursor.0 - cx, cursor.1 - cy));
        player.selecting_arrow = false;
        return Some(player.current_arrow);
    }
    None
}

fn fire(
    world: &mut World,
    config: &PhysicsConfig,
    id: EntityId,
    cursor: (i32, i32),
) -> Option<EntityId> {
    let player = world.players.copied(id)?;
    if player.fire_cooldown > 0 || player.is_stunned() {
        return None;
    }
    let pos = world.positions.copied(id)?;
    let facing = world.facings.copied(id).unwrap_or_default();
    let (cx, cy) = player_center(pos);
    let (mut dx, mut dy) = (cursor.0 - cx, cursor.1 - cy);
    if dx == 0 && dy == 0 {
        dx = facing.sign();
        dy = 0;
    }
    let stats = *config.arrows.get(player.current_arrow);
    let (vx, vy) = scale_to(dx, dy, stats.speed);
    let arrow = create_projectile(
        world,
        player.current_arrow,
        &stats,
        cx,
        cy,
        Velocity::new(vx, vy),
        true,
    );
    if let Some(p) = world.players.get_mut(id) {
        p.fire_cooldown = config.fire_cooldown_frames;
    }
    tracing::trace!(arrow = %arrow, kind = ?player.current_arrow, vx, vy, "player fired");
    Some(arrow)
}
