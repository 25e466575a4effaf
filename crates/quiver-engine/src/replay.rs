//! Replay files: input recording, playback and determinism checks.
//!
//! A [`ReplayFile`] is the seed, the stage name and one [`FrameInput`] per
//! frame, plus optional state-hash checkpoints. Because the simulation is a
//! pure function of seed, stage, config and inputs, playing the frames back
//! on a fresh [`Scene`] reproduces the run exactly.
//!
//! # Recording
//!
//! ```
//! use quiver_engine::prelude::*;
//!
//! let def = StageDef {
//!     name: "box".to_owned(),
//!     tile_size: 16,
//!     spike_damage: 10,
//!     rows: ["#........#", "#....P...#", "##########"].map(str::to_owned).to_vec(),
//!     enemies: Vec::new(),
//!     respawn_delay_frames: 0,
//! };
//! let mut scene = Scene::new(def, PhysicsConfig::default(), 42).unwrap();
//! let mut recorder = ReplayRecorder::new(42, "box", "2024-01-01T00:00:00Z", 10);
//!
//! for f in 0..30 {
//!     let input = FrameInput::new(f, InputState { right: f > 10, ..InputState::IDLE });
//!     recorder.record(input, Some(scene.state_hash())).unwrap();
//!     scene.tick(&input.state);
//! }
//!
//! let file = recorder.finish();
//! assert_eq!(file.frames.len(), 30);
//! assert_eq!(file.checkpoints.len(), 3);
//! ```
//!
//! # Replaying
//!
//! ```no_run
//! use quiver_engine::prelude::*;
//!
//! # let (def, file): (StageDef, ReplayFile) = todo!();
//! let mut scene = Scene::new(def, PhysicsConfig::default(), file.seed).unwrap();
//! let result = replay(&mut scene, &file).expect("replay should succeed");
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::input::FrameInput;
use crate::scene::Scene;
use crate::stage::StageDef;

/// The only replay format version this crate reads and writes.
pub const REPLAY_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to access replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid replay JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported replay version {found:?} (expected \"1.0\")")]
    UnsupportedVersion { found: String },

    #[error("replay frame out of sequence: expected frame {expected}, found {found}")]
    FrameGap { expected: u64, found: u64 },

    #[error("replay checkpoint at frame {frame} is past the last frame ({frames} recorded)")]
    CheckpointOutOfRange { frame: u64, frames: u64 },
}

// ---------------------------------------------------------------------------
// ReplayFile
// ---------------------------------------------------------------------------

/// State hash recorded before a frame ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub frame: u64,
    pub hash: String,
}

/// A recorded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFile {
    pub version: String,
    pub seed: i64,
    /// Stage name the session was played on.
    pub stage: String,
    /// ISO-8601 timestamp supplied by the host.
    #[serde(rename = "startTime")]
    pub start_time: String,
    /// One input per frame, in order, no gaps.
    pub frames: Vec<FrameInput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkpoints: Vec<Checkpoint>,
}

impl ReplayFile {
    /// Check version, frame contiguity and checkpoint range.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.version != REPLAY_VERSION {
            return Err(ReplayError::UnsupportedVersion {
                found: self.version.clone(),
            });
        }
        for (i, frame) in self.frames.iter().enumerate() {
            let expected = i as u64;
            if frame.frame != expected {
                return Err(ReplayError::FrameGap {
                    expected,
                    found: frame.frame,
                });
            }
        }
        let frames = self.frames.len() as u64;
        if let Some(cp) = self.checkpoints.iter().find(|cp| cp.frame >= frames) {
            return Err(ReplayError::CheckpointOutOfRange {
                frame: cp.frame,
                frames,
            });
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReplayError> {
        let file: ReplayFile = serde_json::from_str(json)?;
        if let Err(err) = file.validate() {
            tracing::warn!(%err, stage = %file.stage, "rejecting malformed replay");
            return Err(err);
        }
        Ok(file)
    }

    pub fn to_json_string(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Write the replay as pretty JSON. An empty replay is not written and
    /// `Ok(false)` is returned.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<bool, ReplayError> {
        if self.frames.is_empty() {
            return Ok(false);
        }
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        tracing::debug!(
            path = %path.display(),
            frames = self.frames.len(),
            "replay saved"
        );
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayFile`] one frame at a time.
///
/// Call [`record`](Self::record) before ticking the frame, passing the state
/// hash of the scene at that moment. Hashes are kept every
/// `checkpoint_interval` frames; an interval of 0 keeps every hash supplied.
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    file: ReplayFile,
    checkpoint_interval: u64,
}

impl ReplayRecorder {
    pub fn new(
        seed: i64,
        stage: impl Into<String>,
        start_time: impl Into<String>,
        checkpoint_interval: u64,
    ) -> Self {
        Self {
            file: ReplayFile {
                version: REPLAY_VERSION.to_owned(),
                seed,
                stage: stage.into(),
                start_time: start_time.into(),
                frames: Vec::new(),
                checkpoints: Vec::new(),
            },
            checkpoint_interval,
        }
    }

    /// Append one frame.
    ///
    /// # Errors
    ///
    /// [`ReplayError::FrameGap`] if `input.frame` is not the next frame
    /// number. Nothing is recorded in that case.
    pub fn record(&mut self, input: FrameInput, state_hash: Option<String>) -> Result<(), ReplayError> {
        let expected = self.file.frames.len() as u64;
        if input.frame != expected {
            return Err(ReplayError::FrameGap {
                expected,
                found: input.frame,
            });
        }
        self.file.frames.push(input);

        if let Some(hash) = state_hash {
            let keep = self.checkpoint_interval == 0 || input.frame % self.checkpoint_interval == 0;
            if keep {
                self.file.checkpoints.push(Checkpoint {
                    frame: input.frame,
                    hash,
                });
            }
        }
        Ok(())
    }

    pub fn frames_recorded(&self) -> u64 {
        self.file.frames.len() as u64
    }

    pub fn finish(self) -> ReplayFile {
        self.file
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Every frame ran and every checkpoint matched.
    pub completed: bool,
    pub frames_replayed: u64,
    /// First checkpoint whose hash did not match.
    pub first_divergence: Option<ReplayDivergence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub frame: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

/// Play `file` on `scene`, checking every checkpoint before its frame runs.
///
/// The scene is rebuilt from its own stage and config with the replay's seed,
/// so any progress it had is discarded. Playback stops at the first
/// divergence.
///
/// # Errors
///
/// Returns an error if the file is malformed or was recorded on a different
/// stage. The scene is not modified in that case.
pub fn replay(scene: &mut Scene, file: &ReplayFile) -> Result<ReplayResult, anyhow::Error> {
    file.validate()
        .map_err(|e| anyhow::anyhow!("invalid replay file: {e}"))?;
    if scene.stage_def().name != file.stage {
        return Err(anyhow::anyhow!(
            "replay was recorded on stage {:?} but the scene runs {:?}",
            file.stage,
            scene.stage_def().name
        ));
    }

    *scene = Scene::new(scene.stage_def().clone(), scene.config().clone(), file.seed)
        .map_err(|e| anyhow::anyhow!("failed to rebuild scene for replay: {e}"))?;

    let mut checkpoints = file.checkpoints.iter().peekable();
    let mut frames_replayed = 0u64;
    for input in &file.frames {
        if let Some(cp) = checkpoints.next_if(|cp| cp.frame == input.frame) {
            let actual_hash = scene.state_hash();
            if actual_hash != cp.hash {
                return Ok(ReplayResult {
                    completed: false,
                    frames_replayed,
                    first_divergence: Some(ReplayDivergence {
                        frame: cp.frame,
                        expected_hash: cp.hash.clone(),
                        actual_hash,
                    }),
                });
            }
        }
        scene.tick(&input.state);
        frames_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        frames_replayed,
        first_divergence: None,
    })
}

/// Outcome of [`verify_determinism`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismReport {
    pub frames_compared: u64,
    /// First frame after which the two runs disagreed.
    pub first_mismatch: Option<u64>,
}

impl DeterminismReport {
    pub fn is_deterministic(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Run `file` on two fresh scenes and compare every entity's observable
/// state after each frame.
pub fn verify_determinism(
    def: &StageDef,
    config: &PhysicsConfig,
    file: &ReplayFile,
) -> Result<DeterminismReport, anyhow::Error> {
    file.validate()
        .map_err(|e| anyhow::anyhow!("invalid replay file: {e}"))?;
    let mut a = Scene::new(def.clone(), config.clone(), file.seed)?;
    let mut b = Scene::new(def.clone(), config.clone(), file.seed)?;

    let mut frames_compared = 0u64;
    for input in &file.frames {
        a.tick(&input.state);
        b.tick(&input.state);
        frames_compared += 1;
        if a.frame_states() != b.frame_states() {
            return Ok(DeterminismReport {
                frames_compared,
                first_mismatch: Some(input.frame),
            });
        }
    }
    Ok(DeterminismReport {
        frames_compared,
        first_mismatch: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;

    fn file_with(frames: Vec<FrameInput>) -> ReplayFile {
        ReplayFile {
            version: REPLAY_VERSION.to_owned(),
            seed: 12345,
            stage: "t".to_owned(),
            start_time: "2024-01-01T00:00:00Z".to_owned(),
            frames,
            checkpoints: Vec::new(),
        }
    }

    #[test]
    fn header_uses_wire_names() {
        let file = file_with(vec![FrameInput::new(0, InputState::IDLE)]);
        let v: serde_json::Value = serde_json::from_str(&file.to_json_string().unwrap()).unwrap();
        assert_eq!(v["version"], "1.0");
        assert_eq!(v["seed"], 12345);
        assert_eq!(v["startTime"], "2024-01-01T00:00:00Z");
        assert_eq!(v["frames"][0]["f"], 0);
        assert!(v.get("checkpoints").is_none());
    }

    #[test]
    fn gaps_and_versions_are_rejected() {
        let gap = file_with(vec![
            FrameInput::new(0, InputState::IDLE),
            FrameInput::new(2, InputState::IDLE),
        ]);
        assert!(matches!(
            gap.validate(),
            Err(ReplayError::FrameGap {
                expected: 1,
                found: 2
            })
        ));

        let mut old = file_with(Vec::new());
        old.version = "0.9".to_owned();
        assert!(matches!(
            old.validate(),
            Err(ReplayError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn recorder_refuses_out_of_order_frames() {
        let mut rec = ReplayRecorder::new(1, "t", "now", 0);
        rec.record(FrameInput::new(0, InputState::IDLE), None).unwrap();
        let err = rec
            .record(FrameInput::new(5, InputState::IDLE), None)
            .unwrap_err();
        assert!(matches!(err, ReplayError::FrameGap { expected: 1, found: 5 }));
        assert_eq!(rec.frames_recorded(), 1);
    }

    #[test]
    fn recorder_keeps_checkpoints_on_the_interval() {
        let mut rec = ReplayRecorder::new(1, "t", "now", 4);
        for f in 0..10 {
            rec.record(FrameInput::new(f, InputState::IDLE), Some(format!("h{f}")))
                .unwrap();
        }
        let file = rec.finish();
        let frames: Vec<u64> = file.checkpoints.iter().map(|c| c.frame).collect();
        assert_eq!(frames, vec![0, 4, 8]);
    }

    #[test]
    fn empty_replay_is_not_saved() {
        let path = std::env::temp_dir().join("quiver-empty-replay-never-written.json");
        let _ = std::fs::remove_file(&path);
        assert!(!file_with(Vec::new()).save(&path).unwrap());
        assert!(!path.exists());
    }
}
