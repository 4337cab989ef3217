use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stimulus::StimulusIndex;

/// Grid coordinate in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Phase durations of one trial, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialDurations {
    pub display_sample: f64,
    pub post_sample_delay: f64,
    pub display_post_sample_distractors: f64,
    pub pre_target_delay: f64,
}

impl Default for TrialDurations {
    fn default() -> Self {
        Self {
            display_sample: 0.5,
            post_sample_delay: 0.5,
            display_post_sample_distractors: 0.5,
            pre_target_delay: 3.0,
        }
    }
}

impl TrialDurations {
    /// Pre-target delay once the post-sample distractor phase is carved out of it.
    ///
    /// May be negative; callers decide whether that is acceptable.
    pub fn pre_target_delay_for(&self, has_post_sample_distractors: bool) -> f64 {
        if has_post_sample_distractors {
            self.pre_target_delay - (self.post_sample_delay + self.display_post_sample_distractors)
        } else {
            self.pre_target_delay
        }
    }

    pub fn all(&self) -> [f64; 4] {
        [
            self.display_sample,
            self.post_sample_delay,
            self.display_post_sample_distractors,
            self.pre_target_delay,
        ]
    }
}

/// One row of a trial-definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDef {
    pub trial_id: String,
    pub block_count: u32,
    /// Durations as written, with the pre-target delay already adjusted.
    pub durations: TrialDurations,
    pub sample_location: Position,
    /// Target first, then the search companions.
    pub search_stim_indices: Vec<StimulusIndex>,
    pub search_stim_locations: Vec<Position>,
    pub search_stim_token_reward: Vec<i32>,
    pub post_sample_distractor_stim_indices: Vec<StimulusIndex>,
    pub post_sample_distractor_stim_locations: Vec<Position>,
}
