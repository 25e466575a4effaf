//! Fixed-point unit conversion.
//!
//! The simulation runs at 60 frames per second with ten physics substeps per
//! frame. Velocities are stored in internal units (IU) per substep and
//! accelerations in IU of velocity change per frame, so the two conversion
//! divisors below are `60 * 10` and `60 * 60 * 10`.
//!
//! These functions run once at config build time. Their float inputs never
//! reach the simulation; only the integer results do.

pub use quiver_ecs::components::{PIXEL_SHIFT, POSITION_SCALE};

/// Simulation frames per second.
pub const FRAMES_PER_SECOND: i32 = 60;

/// Physics substeps per frame at normal speed.
pub const SUB_STEPS: u32 = 10;

/// Substeps per frame while the arrow wheel is open.
pub const SLOW_MOTION_SUB_STEPS: u32 = 1;

const VELOCITY_DIVISOR: i64 = 600;
const ACCELERATION_DIVISOR: i64 = 36_000;

/// Pixels per second to IU per substep, rounded down.
pub fn velocity_to_iu(px_per_sec: f64) -> i32 {
    (px_per_sec * POSITION_SCALE as f64 / VELOCITY_DIVISOR as f64).floor() as i32
}

/// Pixels per second squared to IU of velocity change per frame, rounded down.
pub fn acceleration_to_iu(px_per_sec2: f64) -> i32 {
    (px_per_sec2 * POSITION_SCALE as f64 / ACCELERATION_DIVISOR as f64).floor() as i32
}

/// Seconds to whole frames, rounded to nearest.
pub fn seconds_to_frames(seconds: f64) -> i32 {
    (seconds * FRAMES_PER_SECOND as f64).round() as i32
}

/// IU per substep back to pixels per second.
pub fn velocity_from_iu(iu: i32) -> f64 {
    iu as f64 * VELOCITY_DIVISOR as f64 / POSITION_SCALE as f64
}

/// IU per frame back to pixels per second squared.
pub fn acceleration_from_iu(iu: i32) -> f64 {
    iu as f64 * ACCELERATION_DIVISOR as f64 / POSITION_SCALE as f64
}

/// `value * pct / 100`, truncating toward zero.
#[inline]
pub const fn percent(value: i32, pct: i32) -> i32 {
    value * pct / 100
}

/// Integer magnitude approximation: `max(|x|,|y|) + min(|x|,|y|) / 2`.
///
/// Within about 12% of the true length, and exact on the axes.
#[inline]
pub fn approx_magnitude(x: i32, y: i32) -> i32 {
    let (ax, ay) = (x.abs(), y.abs());
    ax.max(ay) + ax.min(ay) / 2
}

/// Scale `(x, y)` to approximately `length` using [`approx_magnitude`].
/// A zero vector stays zero.
pub fn scale_to(x: i32, y: i32, length: i32) -> (i32, i32) {
    let mag = approx_magnitude(x, y);
    if mag == 0 {
        return (0, 0);
    }
    let x = (x as i64 * length as i64 / mag as i64) as i32;
    let y = (y as i64 * length as i64 / mag as i64) as i32;
    (x, y)
}

/// Step `value` toward `target` by at most `step`, never overshooting.
#[inline]
pub fn approach(value: i32, target: i32, step: i32) -> i32 {
    if value < target {
        (value + step).min(target)
    } else if value > target {
        (value - step).max(target)
    } else {
        value
    }
}
