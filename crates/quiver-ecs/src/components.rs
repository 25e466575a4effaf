//! Component records for the platformer simulation.
//!
//! Positions, velocities and accelerations are integers in internal units
//! (IU). One pixel is [`POSITION_SCALE`] IU; the pixel coordinate of a
//! position is its IU value shifted right by [`PIXEL_SHIFT`], which rounds
//! toward negative infinity. Hitbox geometry is in whole pixels.

use serde::{Deserialize, Serialize};

/// Internal units per pixel.
pub const POSITION_SCALE: i32 = 256;

/// `log2(POSITION_SCALE)`.
pub const PIXEL_SHIFT: u32 = 8;

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Top-left corner of the entity's sprite, in IU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Position whose pixel coordinates are exactly `(px, py)`.
    pub const fn from_pixels(px: i32, py: i32) -> Self {
        Self {
            x: px * POSITION_SCALE,
            y: py * POSITION_SCALE,
        }
    }

    #[inline]
    pub const fn pixel_x(self) -> i32 {
        self.x >> PIXEL_SHIFT
    }

    #[inline]
    pub const fn pixel_y(self) -> i32 {
        self.y >> PIXEL_SHIFT
    }
}

/// Velocity in IU per substep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: i32,
    pub y: i32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Contact flags refreshed by the substep physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub on_ground: bool,
    pub on_ceiling: bool,
    pub on_wall_left: bool,
    pub on_wall_right: bool,
    pub was_on_ground: bool,
}

impl Movement {
    /// Cache `on_ground` into `was_on_ground` and clear the four contact flags.
    pub fn begin_substep(&mut self) {
        self.was_on_ground = self.on_ground;
        self.on_ground = false;
        self.on_ceiling = false;
        self.on_wall_left = false;
        self.on_wall_right = false;
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Hit points plus a generic invulnerability countdown in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub iframe: i32,
}

impl Health {
    /// Full health.
    pub const fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            iframe: 0,
        }
    }

    /// Subtract `amount`. `current` is allowed to go negative; the owner is
    /// destroyed by whichever system noticed.
    pub fn damage(&mut self, amount: i32) {
        self.current -= amount;
    }

    /// Add `amount` and clamp into `0..=max`.
    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).clamp(0, self.max);
    }

    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in pixels. `x..x+w` by `y..y+h`, right and bottom
/// edges exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Last covered column.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w - 1
    }

    /// Last covered row.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h - 1
    }

    pub const fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub const fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Strict overlap; touching edges do not count.
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// Rectangle relative to the sprite's top-left corner, authored for a sprite
/// facing right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hitbox {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Hitbox {
    pub const fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Horizontal offset after mirroring for the given facing.
    pub const fn mirrored_offset_x(&self, facing_right: bool, sprite_width: i32) -> i32 {
        if facing_right {
            self.offset_x
        } else {
            sprite_width - self.offset_x - self.width
        }
    }

    /// World-space rectangle for a sprite whose top-left pixel is `(px, py)`.
    pub const fn rect_at(&self, px: i32, py: i32, facing_right: bool, sprite_width: i32) -> Rect {
        Rect::new(
            px + self.mirrored_offset_x(facing_right, sprite_width),
            py + self.offset_y,
            self.width,
            self.height,
        )
    }
}

/// The player's three-rect body approximation.
///
/// The head is narrow so ceiling corners can be slipped past, the body takes
/// horizontal collisions and damage, the feet are wide so ledges hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapezoidHitbox {
    pub head: Hitbox,
    pub body: Hitbox,
    pub feet: Hitbox,
}

/// Which way the sprite looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing {
    pub right: bool,
}

impl Facing {
    pub const RIGHT: Facing = Facing { right: true };
    pub const LEFT: Facing = Facing { right: false };

    /// `+1` facing right, `-1` facing left.
    pub const fn sign(self) -> i32 {
        if self.right {
            1
        } else {
            -1
        }
    }
}

impl Default for Facing {
    fn default() -> Self {
        Self::RIGHT
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Dash state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dash {
    pub active: bool,
    pub can_dash: bool,
    /// Frames left in the current dash.
    pub timer: i32,
    /// Frames until the next dash is allowed.
    pub cooldown: i32,
}

impl Default for Dash {
    fn default() -> Self {
        Self {
            active: false,
            can_dash: true,
            timer: 0,
            cooldown: 0,
        }
    }
}

/// Arrow kinds. The first four can be equipped by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowType {
    Standard,
    Heavy,
    Long,
    Rapid,
    Enemy,
}

impl ArrowType {
    /// The four player arrow kinds in slot order.
    pub const PLAYER_LOADOUT: [ArrowType; 4] = [
        ArrowType::Standard,
        ArrowType::Heavy,
        ArrowType::Long,
        ArrowType::Rapid,
    ];
}

/// Player-only state: wallet, quiver and control-feel timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub gold: i32,
    pub equipped_arrows: [ArrowType; 4],
    pub current_arrow: ArrowType,
    pub coyote_timer: i32,
    pub jump_buffer_timer: i32,
    pub iframe_timer: i32,
    pub stun_timer: i32,
    pub fire_cooldown: i32,
    /// Right mouse button held: slow motion and arrow wheel open.
    pub selecting_arrow: bool,
}

impl Player {
    pub fn new(equipped_arrows: [ArrowType; 4]) -> Self {
        Self {
            gold: 0,
            equipped_arrows,
            current_arrow: equipped_arrows[0],
            coyote_timer: 0,
            jump_buffer_timer: 0,
            iframe_timer: 0,
            stun_timer: 0,
            fire_cooldown: 0,
            selecting_arrow: false,
        }
    }

    pub const fn is_stunned(&self) -> bool {
        self.stun_timer > 0
    }

    /// Select the arrow in `slot` (0..4). Out-of-range slots are ignored so
    /// `current_arrow` always stays one of the equipped kinds.
    pub fn select_slot(&mut self, slot: usize) {
        if let Some(kind) = self.equipped_arrows.get(slot) {
            self.current_arrow = *kind;
        }
    }
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

/// Enemy behavior variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiType {
    Patrol,
    Aggressive,
    Ranged,
    Chase,
}

/// Enemy brain plus knockback bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ai {
    pub ai_type: AiType,
    /// Pixels, taxicab.
    pub detect_range: i32,
    /// Pixels, taxicab.
    pub attack_range: i32,
    /// Pixels either side of `patrol_start_x`.
    pub patrol_distance: i32,
    /// IU per substep.
    pub move_speed: i32,
    /// IU per substep.
    pub jump_force: i32,
    pub contact_damage: i32,
    pub flying: bool,
    /// Pixel X the patrol leg is measured from.
    pub patrol_start_x: i32,
    /// `-1` or `+1`.
    pub patrol_dir: i32,
    pub attack_timer: i32,
    pub hit_timer: i32,
    pub hit_timer_max: i32,
    pub knockback_vel_x: i32,
    pub knockback_vel_y: i32,
    pub gold_drop_min: i32,
    pub gold_drop_max: i32,
}

impl Ai {
    pub const fn is_stunned(&self) -> bool {
        self.hit_timer > 0
    }

    /// Velocity implied by the remaining stun: `knockback * hit_timer / hit_timer_max`.
    pub const fn decayed_knockback(&self) -> Velocity {
        if self.hit_timer_max <= 0 {
            return Velocity::ZERO;
        }
        Velocity {
            x: self.knockback_vel_x * self.hit_timer / self.hit_timer_max,
            y: self.knockback_vel_y * self.hit_timer / self.hit_timer_max,
        }
    }

    /// Gold dropped on death: midpoint of the configured range.
    pub const fn gold_drop(&self) -> i32 {
        (self.gold_drop_min + self.gold_drop_max) / 2
    }
}

// ---------------------------------------------------------------------------
// Projectiles and pickups
// ---------------------------------------------------------------------------

/// Arrow flight data. The entity's position is the arrow tip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ArrowType,
    /// Pixel X at launch, for range checks.
    pub start_x: i32,
    /// IU velocity delta per frame.
    pub gravity_accel: i32,
    /// IU per substep.
    pub max_fall_speed: i32,
    /// Pixels.
    pub max_range: i32,
    pub damage: i32,
    pub is_player_owned: bool,
    pub stuck: bool,
    pub stuck_timer: i32,
    pub stuck_duration: i32,
    /// Radians, rendering only. Never read by the simulation.
    pub stuck_rotation: f32,
}

/// A gold pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gold {
    pub amount: i32,
    pub grounded: bool,
    /// Frames before the pickup can be collected.
    pub collect_delay: i32,
    /// IU velocity delta per frame.
    pub gravity: i32,
    /// 0..=100.
    pub bounce_percent: i32,
    /// Pixels.
    pub collect_radius: i32,
    pub hitbox_width: i32,
    pub hitbox_height: i32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_coordinates_round_toward_negative_infinity() {
        let p = Position { x: -1, y: 511 };
        assert_eq!(p.pixel_x(), -1);
        assert_eq!(p.pixel_y(), 1);
        assert_eq!(Position::from_pixels(80, 46).pixel_y(), 46);
        assert_eq!(Position::from_pixels(80, 46).y, 46 * 256);
    }

    #[test]
    fn heal_clamps_into_range() {
        let mut h = Health::new(50);
        h.damage(70);
        assert_eq!(h.current, -20);
        assert!(h.is_dead());
        h.heal(5);
        assert_eq!(h.current, 0);
        h.heal(500);
        assert_eq!(h.current, 50);
    }

    #[test]
    fn hitbox_mirrors_when_facing_left() {
        let hb = Hitbox::new(2, 4, 10, 20);
        assert_eq!(hb.rect_at(100, 50, true, 16), Rect::new(102, 54, 10, 20));
        // 16 - 2 - 10 = 4
        assert_eq!(hb.rect_at(100, 50, false, 16), Rect::new(104, 54, 10, 20));
    }

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.overlaps(&Rect::new(9, 9, 5, 5)));
        assert!(!a.overlaps(&Rect::new(10, 0, 5, 5)));
        assert!(!a.overlaps(&Rect::new(0, 10, 5, 5)));
        assert_eq!(a.right(), 9);
        assert_eq!(a.bottom(), 9);
    }

    #[test]
    fn movement_begin_substep_caches_ground() {
        let mut m = Movement {
            on_ground: true,
            on_wall_left: true,
            ..Default::default()
        };
        m.begin_substep();
        assert!(m.was_on_ground);
        assert!(!m.on_ground);
        assert!(!m.on_wall_left);
    }

    #[test]
    fn knockback_decays_proportionally_to_zero() {
        let mut ai = Ai {
            ai_type: AiType::Patrol,
            detect_range: 0,
            attack_range: 0,
            patrol_distance: 0,
            move_speed: 0,
            jump_force: 0,
            contact_damage: 0,
            flying: false,
            patrol_start_x: 0,
            patrol_dir: -1,
            attack_timer: 0,
            hit_timer: 10,
            hit_timer_max: 10,
            knockback_vel_x: 100,
            knockback_vel_y: -35,
            gold_drop_min: 3,
            gold_drop_max: 8,
        };
        assert_eq!(ai.decayed_knockback(), Velocity::new(100, -35));
        ai.hit_timer = 5;
        assert_eq!(ai.decayed_knockback(), Velocity::new(50, -17));
        ai.hit_timer = 0;
        assert_eq!(ai.decayed_knockback(), Velocity::ZERO);
        assert_eq!(ai.gold_drop(), 5);
    }

    #[test]
    fn select_slot_keeps_current_arrow_equipped() {
        let mut p = Player::new(ArrowType::PLAYER_LOADOUT);
        p.select_slot(2);
        assert_eq!(p.current_arrow, ArrowType::Long);
        p.select_slot(9);
        assert_eq!(p.current_arrow, ArrowType::Long);
        assert!(p.equipped_arrows.contains(&p.current_arrow));
    }
}
