//! Tile collision queries and overlap push-out.
//!
//! All tests here work in whole pixels against [`Stage::is_solid_at`]. The
//! movement code calls them only when a one-IU step crosses a pixel boundary.

use quiver_ecs::prelude::*;

use crate::spawn::{ENEMY_HITBOX, PLAYER_SPRITE_WIDTH};
use crate::stage::Stage;

/// Largest push-out the overlap resolver attempts, in pixels.
pub const MAX_PUSH_OUT: i32 = 8;

// ---------------------------------------------------------------------------
// Rect tests
// ---------------------------------------------------------------------------

/// Any pixel of `rect` solid.
pub fn rect_solid(stage: &dyn Stage, rect: Rect) -> bool {
    (rect.y..=rect.bottom()).any(|y| (rect.x..=rect.right()).any(|x| stage.is_solid_at(x, y)))
}

/// Any pixel of column `x` between rows `top..=bottom` solid.
pub fn column_solid(stage: &dyn Stage, x: i32, top: i32, bottom: i32) -> bool {
    (top..=bottom).any(|y| stage.is_solid_at(x, y))
}

/// A solid floor under the feet row: some column is solid at `row` and open
/// on the row above it. Columns solid on both rows are wall, not floor, and
/// are left to the body test.
pub fn floor_under(stage: &dyn Stage, left: i32, right: i32, row: i32) -> bool {
    (left..=right).any(|x| stage.is_solid_at(x, row) && !stage.is_solid_at(x, row - 1))
}

/// Mirror image of [`floor_under`] for the head.
pub fn ceiling_over(stage: &dyn Stage, left: i32, right: i32, row: i32) -> bool {
    (left..=right).any(|x| stage.is_solid_at(x, row) && !stage.is_solid_at(x, row + 1))
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The player's three rects at a given top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRects {
    pub head: Rect,
    pub body: Rect,
    pub feet: Rect,
}

impl PlayerRects {
    pub fn at(hitbox: &TrapezoidHitbox, px: i32, py: i32, facing_right: bool) -> Self {
        Self {
            head: hitbox.head.rect_at(px, py, facing_right, PLAYER_SPRITE_WIDTH),
            body: hitbox.body.rect_at(px, py, facing_right, PLAYER_SPRITE_WIDTH),
            feet: hitbox.feet.rect_at(px, py, facing_right, PLAYER_SPRITE_WIDTH),
        }
    }
}

/// Whether the body's leading column is blocked with the sprite at `px`.
pub fn player_blocked_x(stage: &dyn Stage, rects: &PlayerRects, dir: i32) -> bool {
    let body = rects.body;
    let x = if dir > 0 { body.right() } else { body.x };
    column_solid(stage, x, body.y, body.bottom())
}

/// Whether the feet land on a floor.
pub fn player_lands(stage: &dyn Stage, rects: &PlayerRects) -> bool {
    let feet = rects.feet;
    floor_under(stage, feet.x, feet.right(), feet.bottom())
}

/// Whether the head hits a ceiling.
pub fn player_bonks(stage: &dyn Stage, rects: &PlayerRects) -> bool {
    let head = rects.head;
    ceiling_over(stage, head.x, head.right(), head.y)
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Three sample points along the leading edge of the enemy hitbox.
pub fn enemy_blocked(stage: &dyn Stage, px: i32, py: i32, dx: i32, dy: i32) -> bool {
    let r = ENEMY_HITBOX.rect_at(px, py, true, 0);
    let mid_x = r.x + r.w / 2;
    let mid_y = r.y + r.h / 2;
    if dx != 0 {
        let x = if dx > 0 { r.right() } else { r.x };
        [r.y, mid_y, r.bottom()]
            .iter()
            .any(|&y| stage.is_solid_at(x, y))
    } else if dy != 0 {
        let y = if dy > 0 { r.bottom() } else { r.y };
        [r.x, mid_x, r.right()]
            .iter()
            .any(|&x| stage.is_solid_at(x, y))
    } else {
        false
    }
}

/// Floor directly under the enemy's feet line at left, middle or right.
pub fn enemy_has_ground(stage: &dyn Stage, px: i32, py: i32) -> bool {
    enemy_blocked(stage, px, py + 1, 0, 1)
}

// ---------------------------------------------------------------------------
// Gold
// ---------------------------------------------------------------------------

/// Leading-edge corners of a gold pickup.
pub fn gold_blocked(stage: &dyn Stage, rect: Rect, dx: i32, dy: i32) -> bool {
    if dx != 0 {
        let x = if dx > 0 { rect.right() } else { rect.x };
        stage.is_solid_at(x, rect.y) || stage.is_solid_at(x, rect.bottom())
    } else if dy != 0 {
        let y = if dy > 0 { rect.bottom() } else { rect.y };
        stage.is_solid_at(rect.x, y) || stage.is_solid_at(rect.right(), y)
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Overlap resolution
// ---------------------------------------------------------------------------

/// Direction the resolver moved an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDir {
    Left,
    Right,
    Up,
    Down,
}

impl PushDir {
    /// Tie-break order for equal displacement.
    pub const ORDER: [PushDir; 4] = [PushDir::Left, PushDir::Right, PushDir::Up, PushDir::Down];

    pub const fn offset(self, n: i32) -> (i32, i32) {
        match self {
            PushDir::Left => (-n, 0),
            PushDir::Right => (n, 0),
            PushDir::Up => (0, -n),
            PushDir::Down => (0, n),
        }
    }
}

/// Outcome of [`resolve_overlap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Nothing to fix.
    Clear,
    /// Moved `pixels` in `dir`.
    Pushed { dir: PushDir, pixels: i32 },
    /// Every nudge up to [`MAX_PUSH_OUT`] is still solid.
    Entombed,
}

/// Find the smallest single-axis nudge that frees `rect`.
///
/// Ties go to the first direction in [`PushDir::ORDER`].
pub fn find_push_out(stage: &dyn Stage, rect: Rect) -> Overlap {
    if !rect_solid(stage, rect) {
        return Overlap::Clear;
    }
    for n in 1..=MAX_PUSH_OUT {
        for dir in PushDir::ORDER {
            let (dx, dy) = dir.offset(n);
            let moved = Rect::new(rect.x + dx, rect.y + dy, rect.w, rect.h);
            if !rect_solid(stage, moved) {
                return Overlap::Pushed { dir, pixels: n };
            }
        }
    }
    Overlap::Entombed
}

/// Push the player's body out of solid tiles.
///
/// On success the position moves by whole pixels, the contact flag facing the
/// obstruction is set and velocity on that axis is cleared.
pub fn resolve_overlap(
    stage: &dyn Stage,
    hitbox: &TrapezoidHitbox,
    facing_right: bool,
    pos: &mut Position,
    vel: &mut Velocity,
    mv: &mut Movement,
) -> Overlap {
    let rects = PlayerRects::at(hitbox, pos.pixel_x(), pos.pixel_y(), facing_right);
    let result = find_push_out(stage, rects.body);
    if let Overlap::Pushed { dir, pixels } = result {
        let (dx, dy) = dir.offset(pixels);
        pos.x += dx * POSITION_SCALE;
        pos.y += dy * POSITION_SCALE;
        match dir {
            PushDir::Left => {
                mv.on_wall_right = true;
                vel.x = 0;
            }
            PushDir::Right => {
                mv.on_wall_left = true;
                vel.x = 0;
            }
            PushDir::Up => {
                mv.on_ground = true;
                vel.y = 0;
            }
            PushDir::Down => {
                mv.on_ceiling = true;
                vel.y = 0;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::PLAYER_HITBOX;
    use crate::stage::TileStage;

    fn room() -> TileStage {
        TileStage::from_ascii(
            "room",
            &[
                "##########",
                "#........#",
                "#........#",
                "#....P...#",
                "##########",
            ],
            16,
            10,
        )
        .unwrap()
    }

    #[test]
    fn spawned_player_is_clear_and_standing() {
        let stage = room();
        let (sx, sy) = stage.spawn();
        let rects = PlayerRects::at(&PLAYER_HITBOX, sx, sy, true);
        assert!(!rect_solid(&stage, rects.body));
        assert!(!player_lands(&stage, &rects));
        let below = PlayerRects::at(&PLAYER_HITBOX, sx, sy + 1, true);
        assert!(player_lands(&stage, &below));
    }

    #[test]
    fn wall_columns_are_not_floor() {
        let stage = room();
        // Column 15 is wall on both rows.
        assert!(!floor_under(&stage, 14, 15, 40));
        assert!(floor_under(&stage, 20, 30, 64));
    }

    #[test]
    fn body_leading_column_detects_walls() {
        let stage = room();
        // Body spans px+4..px+11. At px=4 the left edge is column 8, still wall.
        let rects = PlayerRects::at(&PLAYER_HITBOX, 4, 30, true);
        assert!(player_blocked_x(&stage, &rects, -1));
        let rects = PlayerRects::at(&PLAYER_HITBOX, 12, 30, true);
        assert!(!player_blocked_x(&stage, &rects, -1));
    }

    #[test]
    fn push_out_picks_smallest_displacement() {
        let stage = room();
        // Body 8 px wide, left edge 2 px into the left wall.
        let rect = Rect::new(14, 30, 8, 13);
        assert_eq!(
            find_push_out(&stage, rect),
            Overlap::Pushed {
                dir: PushDir::Right,
                pixels: 2
            }
        );
        assert_eq!(find_push_out(&stage, Rect::new(40, 30, 8, 13)), Overlap::Clear);
    }

    #[test]
    fn entombed_when_nothing_frees_the_rect() {
        let stage = TileStage::from_ascii(
            "solid",
            &["#####", "#####", "##P##", "#####", "#####"],
            16,
            0,
        )
        .unwrap();
        // Deep inside the wall mass below the spawn tile.
        assert_eq!(find_push_out(&stage, Rect::new(8, 60, 8, 8)), Overlap::Entombed);
    }

    #[test]
    fn resolve_overlap_sets_contact_and_clears_axis() {
        let stage = room();
        let mut pos = Position::from_pixels(10 - 4, 30);
        let mut vel = Velocity::new(-20, 7);
        let mut mv = Movement::default();
        let r = resolve_overlap(&stage, &PLAYER_HITBOX, true, &mut pos, &mut vel, &mut mv);
        assert_eq!(
            r,
            Overlap::Pushed {
                dir: PushDir::Right,
                pixels: 6
            }
        );
        assert_eq!(pos.pixel_x(), 12);
        assert!(mv.on_wall_left);
        assert_eq!(vel, Velocity::new(0, 7));
    }

    #[test]
    fn enemy_ground_samples() {
        let stage = room();
        // Sprite bottom row 63 sits on the floor at 64.
        assert!(enemy_has_ground(&stage, 40, 40));
        assert!(!enemy_has_ground(&stage, 40, 30));
        assert!(enemy_blocked(&stage, 40, 41, 0, 1));
    }
}
