//! Target and distractor role pools.
//!
//! Every stimulus is the target of `times_as_target` trials. A share of the
//! trials (the distractor ratio) additionally shows three post-sample
//! distractors, so the distractor pool must hold `3 * D` slots spread evenly
//! over the stimuli.

use cogex_core::StimulusIndex;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::warn;

use crate::config::DISTRACTORS_PER_TRIAL;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolPlan {
    pub num_stimuli: usize,
    /// T
    pub total_trials: usize,
    /// D
    pub distractor_trials: usize,
    pub times_as_distractor: usize,
    /// Value before the slot-count correction, equal to `times_as_distractor`
    /// when no correction was needed.
    pub requested_times_as_distractor: usize,
    pub target_pool: Vec<StimulusIndex>,
    pub distractor_pool: Vec<StimulusIndex>,
}

impl PoolPlan {
    pub fn was_adjusted(&self) -> bool {
        self.times_as_distractor != self.requested_times_as_distractor
    }

    pub fn distractor_slots(&self) -> usize {
        self.distractor_trials * DISTRACTORS_PER_TRIAL
    }
}

/// Rounds half to even, so 2.5 becomes 2 and 3.5 becomes 4.
fn round_count(value: f64) -> usize {
    value.round_ties_even().max(0.0) as usize
}

pub fn build_pools<R: Rng + ?Sized>(
    num_stimuli: usize,
    times_as_target: usize,
    distractor_ratio: f64,
    rng: &mut R,
) -> PoolPlan {
    // callers validate the config first, which bounds 3 * T
    let total_trials = num_stimuli * times_as_target;
    let distractor_trials = round_count(total_trials as f64 * distractor_ratio);
    let requested =
        round_count(DISTRACTORS_PER_TRIAL as f64 * times_as_target as f64 * distractor_ratio);

    let slots = DISTRACTORS_PER_TRIAL * distractor_trials;
    let mut times_as_distractor = requested;
    if num_stimuli.checked_mul(times_as_distractor) != Some(slots) {
        // Lossy: the integer division may still leave the pool short of 3 * D.
        times_as_distractor = slots.checked_div(num_stimuli).unwrap_or(0);
        warn!(
            requested,
            roles = num_stimuli.saturating_mul(requested),
            slots,
            adjusted = times_as_distractor,
            "num_stimuli * times_as_distractor != 3 * D, adjusting times_as_distractor"
        );
    }

    let target_pool = repeated_pool(num_stimuli, times_as_target, rng);
    let distractor_pool = repeated_pool(num_stimuli, times_as_distractor, rng);

    PoolPlan {
        num_stimuli,
        total_trials,
        distractor_trials,
        times_as_distractor,
        requested_times_as_distractor: requested,
        target_pool,
        distractor_pool,
    }
}

/// Each index in `0..num_stimuli` repeated `times` times, shuffled.
fn repeated_pool<R: Rng + ?Sized>(num_stimuli: usize, times: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<StimulusIndex> = (0..num_stimuli)
        .flat_map(|stim| std::iter::repeat_n(stim, times))
        .collect();
    pool.shuffle(rng);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn counts(pool: &[usize], num_stimuli: usize) -> Vec<usize> {
        let mut counts = vec![0; num_stimuli];
        for &s in pool {
            counts[s] += 1;
        }
        counts
    }

    #[test]
    fn five_stimuli_twice_each() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = build_pools(5, 2, 0.5, &mut rng);

        assert_eq!(plan.total_trials, 10);
        assert_eq!(plan.distractor_trials, 5);
        assert_eq!(plan.times_as_distractor, 3);
        assert!(!plan.was_adjusted());
        assert_eq!(counts(&plan.target_pool, 5), vec![2; 5]);
        assert_eq!(counts(&plan.distractor_pool, 5), vec![3; 5]);
        assert_eq!(plan.distractor_pool.len(), plan.distractor_slots());
    }

    #[test]
    fn zero_ratio_builds_no_distractors() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = build_pools(4, 3, 0.0, &mut rng);

        assert_eq!(plan.total_trials, 12);
        assert_eq!(plan.distractor_trials, 0);
        assert_eq!(plan.times_as_distractor, 0);
        assert!(plan.distractor_pool.is_empty());
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_count(2.5), 2);
        assert_eq!(round_count(3.5), 4);
        assert_eq!(round_count(1.5), 2);
        assert_eq!(round_count(0.4), 0);
    }

    #[test]
    fn mismatched_roles_are_corrected_by_integer_division() {
        // T = 5, D = round(2.5) = 2, requested = round(1.5) = 2, 5 * 2 != 6
        let mut rng = StdRng::seed_from_u64(11);
        let plan = build_pools(5, 1, 0.5, &mut rng);

        assert_eq!(plan.distractor_trials, 2);
        assert_eq!(plan.requested_times_as_distractor, 2);
        assert_eq!(plan.times_as_distractor, 1);
        assert!(plan.was_adjusted());
        // the correction cannot reach 3 * D here
        assert_eq!(plan.distractor_pool.len(), 5);
        assert_ne!(plan.distractor_pool.len(), plan.distractor_slots());
    }

    #[test]
    fn same_seed_same_pools() {
        let a = build_pools(8, 3, 0.25, &mut StdRng::seed_from_u64(99));
        let b = build_pools(8, 3, 0.25, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
