pub mod stimulus;
pub mod trial;

pub use stimulus::{Stimulus, StimulusError, StimulusFile, StimulusIndex, StimulusSet};
pub use trial::{Position, TrialDef, TrialDurations};
