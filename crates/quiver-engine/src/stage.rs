//! Read-only tile grid.
//!
//! The simulation only ever asks a [`Stage`] whether a pixel is solid, what
//! kind of tile covers it and how much that tile hurts. [`TileStage`] is the
//! grid implementation built from a [`StageDef`] document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use quiver_ecs::components::AiType;

use crate::spawn::PLAYER_SPRITE_HEIGHT;

/// Kind of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Empty,
    Wall,
    Spike,
}

impl TileType {
    /// Walls and spikes both block movement.
    pub const fn is_solid(self) -> bool {
        !matches!(self, TileType::Empty)
    }
}

/// The queries the simulation makes against level geometry.
///
/// Any query outside the grid answers as a wall.
pub trait Stage {
    fn tile_type_at(&self, px: i32, py: i32) -> TileType;

    fn tile_damage_at(&self, px: i32, py: i32) -> i32;

    fn is_solid_at(&self, px: i32, py: i32) -> bool {
        self.tile_type_at(px, py).is_solid()
    }

    /// Tile edge length in pixels.
    fn tile_size(&self) -> i32;

    /// Player spawn, top-left pixel.
    fn spawn(&self) -> (i32, i32);

    /// Grid size in pixels.
    fn pixel_size(&self) -> (i32, i32);
}

// ---------------------------------------------------------------------------
// StageDef
// ---------------------------------------------------------------------------

/// Roster entry: one enemy spawned at a seeded X inside `x_min..=x_max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub ai: AiType,
    pub x_min: i32,
    pub x_max: i32,
    /// Top-left pixel Y.
    pub y: i32,
    #[serde(default)]
    pub facing_right: bool,
}

/// Serialized stage document.
///
/// `rows` is ASCII art, one string per tile row: `#` wall, `^` spike, `.` or
/// space empty, `P` the (empty) tile the player spawns in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDef {
    pub name: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: i32,
    #[serde(default = "default_spike_damage")]
    pub spike_damage: i32,
    pub rows: Vec<String>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Frames between the last enemy dying and the roster respawning.
    /// Zero disables respawning.
    #[serde(default)]
    pub respawn_delay_frames: i32,
}

fn default_tile_size() -> i32 {
    16
}

fn default_spike_damage() -> i32 {
    10
}

impl StageDef {
    pub fn from_json_str(json: &str) -> Result<Self, StageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Errors produced while building a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to read stage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stage JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stage has no tiles")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("stage has no player spawn tile 'P'")]
    MissingSpawn,

    #[error("second player spawn at row {row}, column {col}")]
    DuplicateSpawn { row: usize, col: usize },

    #[error("tile size must be positive, got {0}")]
    BadTileSize(i32),

    #[error("enemy spawn {index} has an empty X range {x_min}..={x_max}")]
    InvalidEnemySpawn { index: usize, x_min: i32, x_max: i32 },
}

// ---------------------------------------------------------------------------
// TileStage
// ---------------------------------------------------------------------------

/// Dense tile grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStage {
    name: String,
    tiles: Vec<TileType>,
    width: usize,
    height: usize,
    tile_size: i32,
    spike_damage: i32,
    spawn: (i32, i32),
}

impl TileStage {
    pub fn from_def(def: &StageDef) -> Result<Self, StageError> {
        let rows: Vec<&str> = def.rows.iter().map(String::as_str).collect();
        let stage = Self::from_ascii(&def.name, &rows, def.tile_size, def.spike_damage)?;
        for (index, e) in def.enemies.iter().enumerate() {
            if e.x_min > e.x_max {
                return Err(StageError::InvalidEnemySpawn {
                    index,
                    x_min: e.x_min,
                    x_max: e.x_max,
                });
            }
        }
        Ok(stage)
    }

    /// Build from ASCII rows (see [`StageDef`] for the glyphs).
    pub fn from_ascii(
        name: &str,
        rows: &[&str],
        tile_size: i32,
        spike_damage: i32,
    ) -> Result<Self, StageError> {
        if tile_size <= 0 {
            return Err(StageError::BadTileSize(tile_size));
        }
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(StageError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut spawn_tile: Option<(usize, usize)> = None;
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(StageError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let tile = match glyph {
                    '#' => TileType::Wall,
                    '^' => TileType::Spike,
                    '.' | ' ' => TileType::Empty,
                    'P' => {
                        if spawn_tile.is_some() {
                            return Err(StageError::DuplicateSpawn { row, col });
                        }
                        spawn_tile = Some((col, row));
                        TileType::Empty
                    }
                    _ => return Err(StageError::UnknownGlyph { glyph, row, col }),
                };
                tiles.push(tile);
            }
        }

        let (sx, sy) = spawn_tile.ok_or(StageError::MissingSpawn)?;
        // Sprite bottom sits on the spawn tile's bottom row.
        let spawn = (
            sx as i32 * tile_size,
            (sy as i32 + 1) * tile_size - PLAYER_SPRITE_HEIGHT,
        );

        Ok(Self {
            name: name.to_owned(),
            tiles,
            width,
            height,
            tile_size,
            spike_damage,
            spawn,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid size in tiles.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn tile(&self, px: i32, py: i32) -> Option<TileType> {
        let tx = px.div_euclid(self.tile_size);
        let ty = py.div_euclid(self.tile_size);
        if tx < 0 || ty < 0 {
            return None;
        }
        let (tx, ty) = (tx as usize, ty as usize);
        if tx >= self.width || ty >= self.height {
            return None;
        }
        self.tiles.get(ty * self.width + tx).copied()
    }
}

impl Stage for TileStage {
    fn tile_type_at(&self, px: i32, py: i32) -> TileType {
        self.tile(px, py).unwrap_or(TileType::Wall)
    }

    fn tile_damage_at(&self, px: i32, py: i32) -> i32 {
        match self.tile_type_at(px, py) {
            TileType::Spike => self.spike_damage,
            _ => 0,
        }
    }

    fn tile_size(&self) -> i32 {
        self.tile_size
    }

    fn spawn(&self) -> (i32, i32) {
        self.spawn
    }

    fn pixel_size(&self) -> (i32, i32) {
        (
            self.width as i32 * self.tile_size,
            self.height as i32 * self.tile_size,
        )
    }
}
