//! Per-frame input records.
//!
//! [`InputState`] is what the host samples each frame. [`FrameInput`] adds the
//! frame number and is the unit a replay stores. The field names on the wire
//! are the short keys replay files use; `false` booleans are omitted.

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Button and cursor state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InputState {
    #[serde(rename = "l", default, skip_serializing_if = "is_false")]
    pub left: bool,
    #[serde(rename = "r", default, skip_serializing_if = "is_false")]
    pub right: bool,
    #[serde(rename = "u", default, skip_serializing_if = "is_false")]
    pub up: bool,
    #[serde(rename = "d", default, skip_serializing_if = "is_false")]
    pub down: bool,
    /// Jump held.
    #[serde(rename = "j", default, skip_serializing_if = "is_false")]
    pub jump: bool,
    /// Jump went down this frame.
    #[serde(rename = "jp", default, skip_serializing_if = "is_false")]
    pub jump_pressed: bool,
    /// Jump went up this frame.
    #[serde(rename = "jr", default, skip_serializing_if = "is_false")]
    pub jump_released: bool,
    #[serde(rename = "dsh", default, skip_serializing_if = "is_false")]
    pub dash: bool,
    /// Cursor X in logical screen pixels.
    #[serde(rename = "mx", default)]
    pub mouse_x: i32,
    /// Cursor Y in logical screen pixels.
    #[serde(rename = "my", default)]
    pub mouse_y: i32,
    /// Fire.
    #[serde(rename = "mc", default, skip_serializing_if = "is_false")]
    pub mouse_click: bool,
    /// Arrow wheel opened.
    #[serde(rename = "rcp", default, skip_serializing_if = "is_false")]
    pub right_click_pressed: bool,
    /// Arrow wheel closed.
    #[serde(rename = "rcr", default, skip_serializing_if = "is_false")]
    pub right_click_released: bool,
}

impl InputState {
    /// No buttons, cursor at the origin.
    pub const IDLE: InputState = InputState {
        left: false,
        right: false,
        up: false,
        down: false,
        jump: false,
        jump_pressed: false,
        jump_released: false,
        dash: false,
        mouse_x: 0,
        mouse_y: 0,
        mouse_click: false,
        right_click_pressed: false,
        right_click_released: false,
    };

    /// Whether any button is down or changed this frame.
    pub fn any_button(&self) -> bool {
        self.left
            || self.right
            || self.up
            || self.down
            || self.jump
            || self.jump_pressed
            || self.jump_released
            || self.dash
            || self.mouse_click
            || self.right_click_pressed
            || self.right_click_released
    }
}

/// One replay record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(rename = "f")]
    pub frame: u64,
    #[serde(flatten)]
    pub state: InputState,
}

impl FrameInput {
    pub fn new(frame: u64, state: InputState) -> Self {
        Self { frame, state }
    }
}
