//! Once-per-frame countdowns.
//!
//! Runs first in every frame, before input is read.

use quiver_ecs::prelude::*;

/// Tick every per-frame timer in the world.
pub fn tick_timers(world: &mut World) {
    tick_player(world);
    tick_enemies(world);
    tick_stuck_projectiles(world);
    tick_gold(world);
}

fn dec(t: &mut i32) {
    if *t > 0 {
        *t -= 1;
    }
}

fn tick_player(world: &mut World) {
    let Some(id) = world.player() else {
        return;
    };
    if let Some(player) = world.players.get_mut(id) {
        dec(&mut player.coyote_timer);
        dec(&mut player.jump_buffer_timer);
        dec(&mut player.iframe_timer);
        dec(&mut player.stun_timer);
        dec(&mut player.fire_cooldown);
        if let Some(health) = world.healths.get_mut(id) {
            health.iframe = player.iframe_timer;
        }
    }
    let on_ground = world.movements.get(id).is_some_and(|m| m.on_ground);
    if let Some(dash) = world.dashes.get_mut(id) {
        if dash.timer > 0 {
            dash.timer -= 1;
            if dash.timer == 0 {
                dash.active = false;
            }
        }
        dec(&mut dash.cooldown);
        if on_ground {
            dash.can_dash = true;
        }
    }
}

fn tick_enemies(world: &mut World) {
    for id in world.is_enemy.to_vec() {
        let Some(ai) = world.ais.get_mut(id) else {
            continue;
        };
        if ai.hit_timer > 0 {
            ai.hit_timer -= 1;
            let knockback = ai.decayed_knockback();
            if let Some(vel) = world.velocities.get_mut(id) {
                *vel = knockback;
            }
        }
        dec(&mut ai.attack_timer);
    }
}

fn tick_stuck_projectiles(world: &mut World) {
    for id in world.is_projectile.to_vec() {
        let expired = match world.projectiles.get_mut(id) {
            Some(p) if p.stuck => {
                p.stuck_timer += 1;
                p.stuck_timer >= p.stuck_duration
            }
            _ => false,
        };
        if expired {
            world.destroy(id);
        }
    }
}

fn tick_gold(world: &mut World) {
    for (_, gold) in world.golds.iter_mut() {
        dec(&mut gold.collect_delay);
    }
}
