//! Greedy distractor assignment.
//!
//! Distractor trials take their three post-sample distractors from the
//! shuffled distractor pool in order. A slot that would repeat the target or
//! a distractor already picked for the trial is swapped with the first usable
//! later slot. When the pool has nothing usable left, a random valid stimulus
//! is substituted; such picks do not consume a pool slot.

use cogex_core::StimulusIndex;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::config::DISTRACTORS_PER_TRIAL;
use crate::error::{GenerateError, Result};

/// Attempts per pick before settling for the first valid stimulus.
pub const MAX_PICK_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistractorAssignment {
    /// One flag per trial; exactly D are set.
    pub is_distractor: Vec<bool>,
    /// Empty for plain trials, three indices for distractor trials.
    pub distractors: Vec<Vec<StimulusIndex>>,
    /// Picks that were substituted instead of drawn from the pool.
    pub fallback_picks: usize,
}

impl DistractorAssignment {
    pub fn distractor_trial_count(&self) -> usize {
        self.is_distractor.iter().filter(|&&d| d).count()
    }
}

pub fn assign_distractors<R: Rng + ?Sized>(
    target_pool: &[StimulusIndex],
    distractor_pool: &[StimulusIndex],
    num_distractor_trials: usize,
    num_stimuli: usize,
    rng: &mut R,
) -> Result<DistractorAssignment> {
    let total_trials = target_pool.len();
    if num_distractor_trials > total_trials {
        return Err(GenerateError::InvalidConfig(format!(
            "{num_distractor_trials} distractor trials requested but only {total_trials} trials exist"
        )));
    }
    if let Some(&bad) = target_pool.iter().find(|&&t| t >= num_stimuli) {
        return Err(GenerateError::InvalidConfig(format!(
            "target {bad} out of range for {num_stimuli} stimuli"
        )));
    }

    let mut is_distractor = vec![false; total_trials];
    is_distractor[..num_distractor_trials].fill(true);
    is_distractor.shuffle(rng);

    let expected = DISTRACTORS_PER_TRIAL * num_distractor_trials;
    if distractor_pool.len() != expected {
        return Err(GenerateError::DistractorSlotMismatch {
            slots: distractor_pool.len(),
            expected,
        });
    }

    let mut slots = distractor_pool.to_vec();
    let mut cursor = 0;
    let mut fallback_picks = 0;
    let mut distractors = Vec::with_capacity(total_trials);

    for (trial, &target) in target_pool.iter().enumerate() {
        if !is_distractor[trial] {
            distractors.push(Vec::new());
            continue;
        }

        let mut assigned: Vec<StimulusIndex> = Vec::with_capacity(DISTRACTORS_PER_TRIAL);
        for _ in 0..DISTRACTORS_PER_TRIAL {
            let mut attempts = 0;
            loop {
                if cursor >= slots.len() {
                    let pick = random_fallback(num_stimuli, target, &assigned, rng);
                    debug!(trial, target, pick, "distractor pool exhausted, substituting");
                    assigned.push(pick);
                    fallback_picks += 1;
                    break;
                }

                let candidate = slots[cursor];
                if is_valid(candidate, target, &assigned) {
                    assigned.push(candidate);
                    cursor += 1;
                    break;
                }

                let swap = (cursor + 1..slots.len()).find(|&j| is_valid(slots[j], target, &assigned));
                match swap {
                    Some(j) => slots.swap(cursor, j),
                    None => {
                        let pick = random_fallback(num_stimuli, target, &assigned, rng);
                        debug!(trial, target, pick, "no usable slot left to swap in, substituting");
                        assigned.push(pick);
                        fallback_picks += 1;
                        break;
                    }
                }

                attempts += 1;
                if attempts > MAX_PICK_ATTEMPTS {
                    let pick = valid_choices(num_stimuli, target, &assigned)
                        .first()
                        .copied()
                        .unwrap_or_else(|| wrap_after(target, num_stimuli));
                    debug!(trial, target, pick, "retry cap reached, substituting");
                    assigned.push(pick);
                    fallback_picks += 1;
                    break;
                }
            }
        }
        distractors.push(assigned);
    }

    Ok(DistractorAssignment {
        is_distractor,
        distractors,
        fallback_picks,
    })
}

fn is_valid(candidate: StimulusIndex, target: StimulusIndex, assigned: &[StimulusIndex]) -> bool {
    candidate != target && !assigned.contains(&candidate)
}

fn valid_choices(
    num_stimuli: usize,
    target: StimulusIndex,
    assigned: &[StimulusIndex],
) -> Vec<StimulusIndex> {
    (0..num_stimuli)
        .filter(|&s| is_valid(s, target, assigned))
        .collect()
}

/// Uniform pick among valid stimuli, or the stimulus after the target when
/// there is none (e.g. a single-stimulus run).
fn random_fallback<R: Rng + ?Sized>(
    num_stimuli: usize,
    target: StimulusIndex,
    assigned: &[StimulusIndex],
    rng: &mut R,
) -> StimulusIndex {
    valid_choices(num_stimuli, target, assigned)
        .choose(rng)
        .copied()
        .unwrap_or_else(|| wrap_after(target, num_stimuli))
}

fn wrap_after(target: StimulusIndex, num_stimuli: usize) -> StimulusIndex {
    (target + 1) % num_stimuli
}
