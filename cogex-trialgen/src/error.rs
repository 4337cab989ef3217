use cogex_core::StimulusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("total distractor slots ({slots}) != 3 * D ({expected})")]
    DistractorSlotMismatch { slots: usize, expected: usize },

    #[error(
        "PreTargetDelayDuration < 0 for trial {trial}: pre-target delay {pre_target} \
         minus post-sample delay {post_sample_delay} and distractor display {distractor_display}"
    )]
    NegativePreTargetDelay {
        trial: usize,
        pre_target: f64,
        post_sample_delay: f64,
        distractor_display: f64,
    },

    #[error("not enough free coordinates: requested {requested}, {available} available")]
    InsufficientPositions { requested: usize, available: usize },

    #[error("trial {trial} needs {needed} distinct stimuli but only {available} exist")]
    NotEnoughStimuli {
        trial: usize,
        needed: usize,
        available: usize,
    },

    #[error("block count {blocks} must be between 1 and the number of trials ({trials})")]
    InvalidBlockCount { blocks: usize, trials: usize },

    #[error(transparent)]
    Stimulus(#[from] StimulusError),

    #[error("failed to read config {path}")]
    ConfigRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;
