use std::collections::HashSet;

use cogex_core::{StimulusIndex, TrialDef};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{GeneratorConfig, SEARCH_DISPLAY_SIZE};
use crate::distractors::DistractorAssignment;
use crate::error::{GenerateError, Result};

const SEARCH_COMPANIONS: usize = SEARCH_DISPLAY_SIZE - 1;

/// Builds one [`TrialDef`] per target, in target-pool order.
pub fn synthesize_trials<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    num_stimuli: usize,
    target_pool: &[StimulusIndex],
    assignment: &DistractorAssignment,
    rng: &mut R,
) -> Result<Vec<TrialDef>> {
    target_pool
        .iter()
        .enumerate()
        .map(|(trial, &target)| {
            synthesize_trial(
                config,
                num_stimuli,
                trial,
                target,
                &assignment.distractors[trial],
                rng,
            )
        })
        .collect()
}

/// `distractors` is empty for trials without a post-sample distractor display.
pub fn synthesize_trial<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    num_stimuli: usize,
    trial: usize,
    target: StimulusIndex,
    distractors: &[StimulusIndex],
    rng: &mut R,
) -> Result<TrialDef> {
    let layout = &config.layout;
    let has_distractors = !distractors.is_empty();

    let pre_target_delay = config.durations.pre_target_delay_for(has_distractors);
    if pre_target_delay < 0.0 {
        return Err(GenerateError::NegativePreTargetDelay {
            trial,
            pre_target: config.durations.pre_target_delay,
            post_sample_delay: config.durations.post_sample_delay,
            distractor_display: config.durations.display_post_sample_distractors,
        });
    }

    let mut candidates: Vec<StimulusIndex> = if has_distractors {
        distractors.to_vec()
    } else {
        (0..num_stimuli).filter(|&s| s != target).collect()
    };
    if candidates.len() < SEARCH_COMPANIONS {
        return Err(GenerateError::NotEnoughStimuli {
            trial,
            needed: SEARCH_DISPLAY_SIZE,
            available: num_stimuli,
        });
    }
    let (companions, _) = candidates.partial_shuffle(rng, SEARCH_COMPANIONS);

    let mut search_stim_indices = Vec::with_capacity(SEARCH_DISPLAY_SIZE);
    search_stim_indices.push(target);
    search_stim_indices.extend_from_slice(companions);

    let used = HashSet::from([layout.sample_location]);
    let search_stim_locations = layout
        .grid
        .pick_positions(SEARCH_DISPLAY_SIZE, &used, rng)?;

    let mut search_stim_token_reward = vec![layout.distractor_reward; SEARCH_DISPLAY_SIZE];
    search_stim_token_reward[0] = layout.target_reward;

    let (post_indices, post_locations) = if has_distractors {
        (
            distractors.to_vec(),
            layout.post_sample_distractor_locations.to_vec(),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    let mut durations = config.durations;
    durations.pre_target_delay = pre_target_delay;

    Ok(TrialDef {
        trial_id: format!("{}{}", config.trial_id_prefix, trial + 1),
        block_count: config.block_count,
        durations,
        sample_location: layout.sample_location,
        search_stim_indices,
        search_stim_locations,
        search_stim_token_reward,
        post_sample_distractor_stim_indices: post_indices,
        post_sample_distractor_stim_locations: post_locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{Position, TrialDurations};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(pre_target_delay: f64) -> GeneratorConfig {
        GeneratorConfig {
            trial_id_prefix: "WMn1.TDSIM".into(),
            durations: TrialDurations {
                display_sample: 0.5,
                post_sample_delay: 0.5,
                display_post_sample_distractors: 0.5,
                pre_target_delay,
            },
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn distractor_trial_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        let t = synthesize_trial(&config(3.0), 6, 4, 5, &[1, 3, 0], &mut rng).unwrap();

        assert_eq!(t.trial_id, "WMn1.TDSIM5");
        assert_eq!(t.block_count, 1);
        assert_eq!(t.durations.pre_target_delay, 2.0);
        assert_eq!(t.durations.display_sample, 0.5);
        assert_eq!(t.sample_location, Position::ORIGIN);
        assert_eq!(t.search_stim_indices[0], 5);

        assert_eq!(t.search_stim_indices.len(), 3);
        assert!(t.search_stim_indices[1..].iter().all(|s| [1, 3, 0].contains(s)));
        assert_ne!(t.search_stim_indices[1], t.search_stim_indices[2]);
        assert_eq!(t.search_stim_token_reward, vec![2, -1, -1]);

        assert_eq!(t.search_stim_locations.len(), 3);
        assert!(!t.search_stim_locations.contains(&Position::ORIGIN));

        assert!(!t.post_sample_distractor_stim_indices.is_empty());
        assert_eq!(t.post_sample_distractor_stim_indices, vec![1, 3, 0]);
        assert_eq!(
            t.post_sample_distractor_stim_locations,
            vec![
                Position::new(-3, 0, 0),
                Position::new(0, 0, 0),
                Position::new(3, 0, 0)
            ]
        );
    }

    #[test]
    fn plain_trial_picks_random_non_target_companions() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let t = synthesize_trial(&config(0.5), 4, 0, 2, &[], &mut rng).unwrap();
            // no post-sample display, so the short delay is fine
            assert_eq!(t.durations.pre_target_delay, 0.5);
            assert!(t.post_sample_distractor_stim_indices.is_empty());
            assert!(t.post_sample_distractor_stim_locations.is_empty());

            let companions = &t.search_stim_indices[1..];
            assert!(companions.iter().all(|&s| s != 2 && s < 4));
            assert_ne!(companions[0], companions[1]);
        }
    }

    #[test]
    fn negative_pre_target_delay_aborts() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = synthesize_trial(&config(0.5), 6, 7, 0, &[1, 2, 3], &mut rng).unwrap_err();
        match err {
            GenerateError::NegativePreTargetDelay {
                trial, pre_target, ..
            } => {
                assert_eq!(trial, 7);
                assert_eq!(pre_target, 0.5);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn two_stimuli_cannot_fill_a_search_display() {
        let mut rng = StdRng::seed_from_u64(4);
        let err = synthesize_trial(&config(3.0), 2, 0, 1, &[], &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::NotEnoughStimuli {
                needed: 3,
                available: 2,
                ..
            }
        ));
    }
}
