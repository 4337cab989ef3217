use cogex_core::{StimulusSet, TrialDef};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blocks::split_into_blocks;
use crate::config::GeneratorConfig;
use crate::distractors::assign_distractors;
use crate::error::Result;
use crate::pools::{PoolPlan, build_pools};
use crate::synth::synthesize_trials;

/// Runs pool building, distractor assignment and row synthesis with one
/// random source, so a seeded `R` reproduces a session exactly.
pub struct TrialGenerator<R: Rng> {
    pub config: GeneratorConfig,
    pub rng: R,
}

/// All trials of one run plus the numbers they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSession {
    pub plan: PoolPlan,
    pub trials: Vec<TrialDef>,
    pub fallback_picks: usize,
    pub num_blocks: usize,
}

/// Run report, written next to the trial files on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub seed: Option<u64>,
    pub num_stimuli: usize,
    pub times_as_target: usize,
    pub distractor_ratio: f64,
    pub total_trials: usize,
    pub distractor_trials: usize,
    pub times_as_distractor: usize,
    pub requested_times_as_distractor: usize,
    pub fallback_picks: usize,
    pub block_sizes: Vec<usize>,
}

impl<R: Rng> TrialGenerator<R> {
    pub fn new(config: GeneratorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn generate(&mut self, stimuli: &StimulusSet) -> Result<GeneratedSession> {
        let num_stimuli = stimuli.len();
        self.config.validate(num_stimuli)?;

        let plan = build_pools(
            num_stimuli,
            self.config.times_as_target,
            self.config.distractor_ratio,
            &mut self.rng,
        );
        info!(
            total_trials = plan.total_trials,
            distractor_trials = plan.distractor_trials,
            times_as_distractor = plan.times_as_distractor,
            "built target and distractor pools for {num_stimuli} stimuli"
        );

        let assignment = assign_distractors(
            &plan.target_pool,
            &plan.distractor_pool,
            plan.distractor_trials,
            num_stimuli,
            &mut self.rng,
        )?;
        debug!(
            distractor_trials = assignment.distractor_trial_count(),
            "marked distractor trials"
        );
        if assignment.fallback_picks > 0 {
            info!(
                fallback_picks = assignment.fallback_picks,
                "some distractors were substituted outside the pool"
            );
        }

        let trials = synthesize_trials(
            &self.config,
            num_stimuli,
            &plan.target_pool,
            &assignment,
            &mut self.rng,
        )?;

        Ok(GeneratedSession {
            plan,
            trials,
            fallback_picks: assignment.fallback_picks,
            num_blocks: self.config.num_blocks,
        })
    }

    pub fn summary(
        &self,
        session: &GeneratedSession,
        seed: Option<u64>,
    ) -> Result<GenerationSummary> {
        Ok(GenerationSummary {
            seed,
            num_stimuli: session.plan.num_stimuli,
            times_as_target: self.config.times_as_target,
            distractor_ratio: self.config.distractor_ratio,
            total_trials: session.plan.total_trials,
            distractor_trials: session.plan.distractor_trials,
            times_as_distractor: session.plan.times_as_distractor,
            requested_times_as_distractor: session.plan.requested_times_as_distractor,
            fallback_picks: session.fallback_picks,
            block_sizes: session.blocks()?.iter().map(|b| b.len()).collect(),
        })
    }
}

impl GeneratedSession {
    pub fn blocks(&self) -> Result<Vec<&[TrialDef]>> {
        split_into_blocks(&self.trials, self.num_blocks)
    }
}
