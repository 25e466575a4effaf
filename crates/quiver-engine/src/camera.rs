//! Logical-screen camera.
//!
//! The camera is a pure function of the player position and the stage size,
//! so it never needs to be stored or replayed. Hosts use it to draw; the
//! simulation uses it to turn cursor coordinates into world pixels.

use serde::{Deserialize, Serialize};

/// Top-left world pixel of the visible screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
}

impl Camera {
    /// Centre a `screen`-sized view on `focus`, clamped to `stage` (both in
    /// pixels). A stage smaller than the screen pins the camera at 0.
    pub fn centered_on(focus: (i32, i32), screen: (i32, i32), stage: (i32, i32)) -> Self {
        let clamp = |center: i32, view: i32, extent: i32| {
            let max = (extent - view).max(0);
            (center - view / 2).clamp(0, max)
        };
        Self {
            x: clamp(focus.0, screen.0, stage.0),
            y: clamp(focus.1, screen.1, stage.1),
        }
    }

    /// Screen pixel to world pixel.
    pub fn to_world(&self, sx: i32, sy: i32) -> (i32, i32) {
        (sx + self.x, sy + self.y)
    }
}
