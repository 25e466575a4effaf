//! Enemy overlap push.
//!
//! Enemies do not collide with each other during the substep loop. Once per
//! frame, every overlapping pair is nudged apart along X.

use quiver_ecs::prelude::*;

use crate::collision::enemy_blocked;
use crate::spawn::{ENEMY_HITBOX, ENEMY_SPRITE_WIDTH};
use crate::stage::Stage;

/// Internal units each enemy of an overlapping pair moves per frame.
pub const SEPARATION_PUSH: i32 = 2;

fn body_rect(world: &World, id: EntityId) -> Option<Rect> {
    let pos = world.positions.copied(id)?;
    let right = world.facings.copied(id).map_or(true, |f| f.right);
    Some(ENEMY_HITBOX.rect_at(pos.pixel_x(), pos.pixel_y(), right, ENEMY_SPRITE_WIDTH))
}

/// Push overlapping enemy pairs apart. Pairs are visited in id order; a
/// pair with equal centres sends the lower id left.
pub fn separate_enemies(world: &mut World, stage: &dyn Stage) {
    let enemies = world.is_enemy.to_vec();
    for (i, &a) in enemies.iter().enumerate() {
        for &b in &enemies[i + 1..] {
            let (Some(ra), Some(rb)) = (body_rect(world, a), body_rect(world, b)) else {
                continue;
            };
            if !ra.overlaps(&rb) {
                continue;
            }
            let dir = if ra.center_x() > rb.center_x() { 1 } else { -1 };
            nudge(world, stage, a, dir * SEPARATION_PUSH);
            nudge(world, stage, b, -dir * SEPARATION_PUSH);
        }
    }
}

fn nudge(world: &mut World, stage: &dyn Stage, id: EntityId, dx: i32) {
    let Some(pos) = world.positions.get_mut(id) else {
        return;
    };
    let next = pos.x + dx;
    let px = next >> PIXEL_SHIFT;
    if px != pos.pixel_x() && enemy_blocked(stage, px, pos.pixel_y(), dx, 0) {
        return;
    }
    pos.x = next;
}
