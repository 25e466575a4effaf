//! Hitstop, screen shake and the game-state machine.

use serde::{Deserialize, Serialize};

use crate::damage::DamageResult;
use crate::units::percent;

/// Top-level game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Playing,
    GameOver,
}

/// Frame-level impact feedback carried between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feedback {
    /// Remaining frames of whole-simulation pause.
    pub hitstop: i32,
    /// Current shake intensity.
    pub shake: i32,
}

impl Feedback {
    /// Fold a frame's combat result in. Larger values win.
    pub fn absorb(&mut self, result: &DamageResult) {
        self.hitstop = self.hitstop.max(result.hitstop_frames);
        self.shake = self.shake.max(result.screen_shake);
    }

    /// Consume one paused frame. Returns `true` if the frame was swallowed.
    pub fn consume_hitstop(&mut self) -> bool {
        if self.hitstop > 0 {
            self.hitstop -= 1;
            true
        } else {
            false
        }
    }

    /// Geometric integer decay of the shake intensity.
    pub fn decay_shake(&mut self, decay_pct: i32) {
        self.shake = percent(self.shake, decay_pct);
    }
}
