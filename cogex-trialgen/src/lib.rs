pub mod blocks;
pub mod config;
pub mod distractors;
pub mod error;
pub mod generator;
pub mod output;
pub mod pools;
pub mod positions;
pub mod synth;

pub use blocks::split_into_blocks;
pub use config::{GeneratorConfig, LayoutConfig, OutputNames};
pub use distractors::{DistractorAssignment, assign_distractors};
pub use error::{GenerateError, Result};
pub use generator::{GeneratedSession, GenerationSummary, TrialGenerator};
pub use pools::{PoolPlan, build_pools};
pub use positions::PositionGrid;
