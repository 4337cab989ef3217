use std::fs;
use std::path::Path;

use cogex_core::{Position, TrialDurations};
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};
use crate::positions::PositionGrid;

/// Post-sample distractors shown per distractor trial.
pub const DISTRACTORS_PER_TRIAL: usize = 3;
/// Stimuli in a search display: the target plus two companions.
pub const SEARCH_DISPLAY_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub times_as_target: usize,
    /// Fraction of trials carrying post-sample distractors, in `[0, 1]`.
    pub distractor_ratio: f64,
    pub trial_id_prefix: String,
    pub num_blocks: usize,
    /// Value written to every row's BlockCount column.
    pub block_count: u32,
    pub durations: TrialDurations,
    pub layout: LayoutConfig,
    pub output: OutputNames,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            times_as_target: 1,
            distractor_ratio: 0.5,
            trial_id_prefix: String::new(),
            num_blocks: 1,
            block_count: 1,
            durations: TrialDurations::default(),
            layout: LayoutConfig::default(),
            output: OutputNames::default(),
        }
    }
}

/// Spatial and reward constants of the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: PositionGrid,
    pub sample_location: Position,
    pub post_sample_distractor_locations: [Position; DISTRACTORS_PER_TRIAL],
    pub target_reward: i32,
    pub distractor_reward: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid: PositionGrid::default(),
            sample_location: Position::ORIGIN,
            post_sample_distractor_locations: [
                Position::new(-3, 0, 0),
                Position::new(0, 0, 0),
                Position::new(3, 0, 0),
            ],
            target_reward: 2,
            distractor_reward: -1,
        }
    }
}

/// Base names of the generated files, without extension or block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNames {
    pub stim_map: String,
    pub trial_def: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            stim_map: "WorkingMemory_StimDef_array".to_string(),
            trial_def: "WorkingMemory_TrialDef_array".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GenerateError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| GenerateError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `None` when the trial count does not fit in `usize`.
    pub fn total_trials(&self, num_stimuli: usize) -> Option<usize> {
        num_stimuli.checked_mul(self.times_as_target)
    }

    /// Checks the parameters against the stimulus count they will be used with.
    pub fn validate(&self, num_stimuli: usize) -> Result<()> {
        let invalid = |msg: String| Err(GenerateError::InvalidConfig(msg));

        if num_stimuli == 0 {
            return invalid("at least one stimulus is required".into());
        }
        if self.times_as_target < 1 {
            return invalid("times_as_target must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.distractor_ratio) {
            return invalid(format!(
                "distractor_ratio must be between 0.0 and 1.0, got {}",
                self.distractor_ratio
            ));
        }
        if let Some(bad) = self
            .durations
            .all()
            .into_iter()
            .find(|d| !d.is_finite() || *d < 0.0)
        {
            return invalid(format!("durations must be finite and >= 0, got {bad}"));
        }
        let Some(trials) = self
            .total_trials(num_stimuli)
            .filter(|t| t.checked_mul(DISTRACTORS_PER_TRIAL).is_some())
        else {
            return invalid(format!(
                "{num_stimuli} stimuli x times_as_target {} is too many trials",
                self.times_as_target
            ));
        };
        if self.num_blocks < 1 || self.num_blocks > trials {
            return invalid(format!(
                "num_blocks must be between 1 and {trials}, got {}",
                self.num_blocks
            ));
        }
        Ok(())
    }
}
