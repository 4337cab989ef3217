//! Tab-delimited stimulus map and trial-definition files.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cogex_core::{Stimulus, TrialDef};
use tracing::info;

use crate::config::OutputNames;
use crate::error::Result;
use crate::generator::GeneratedSession;

pub const STIM_MAP_HEADER: [&str; 2] = ["StimIndex", "FileName"];

pub const TRIAL_DEF_HEADER: [&str; 12] = [
    "TrialID",
    "BlockCount",
    "DisplaySampleDuration",
    "PostSampleDelayDuration",
    "DisplayPostSampleDistractorsDuration",
    "PreTargetDelayDuration",
    "SampleStimLocation",
    "SearchStimIndices",
    "SearchStimLocations",
    "SearchStimTokenReward",
    "PostSampleDistractorStimIndices",
    "PostSampleDistractorStimLocations",
];

pub fn write_stim_map<W: Write, S: Stimulus>(mut w: W, stimuli: &[S]) -> Result<()> {
    writeln!(w, "{}", STIM_MAP_HEADER.join("\t"))?;
    for stim in stimuli {
        writeln!(w, "{}\t{}", stim.index(), stim.name())?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_trial_defs<W: Write>(mut w: W, trials: &[TrialDef]) -> Result<()> {
    writeln!(w, "{}", TRIAL_DEF_HEADER.join("\t"))?;
    for trial in trials {
        writeln!(w, "{}", format_trial_row(trial))?;
    }
    w.flush()?;
    Ok(())
}

/// One trial as a tab-joined row, without the line terminator.
pub fn format_trial_row(trial: &TrialDef) -> String {
    let d = &trial.durations;
    [
        trial.trial_id.clone(),
        trial.block_count.to_string(),
        format!("{:.2}", d.display_sample),
        format!("{:.2}", d.post_sample_delay),
        format!("{:.2}", d.display_post_sample_distractors),
        format!("{:.2}", d.pre_target_delay),
        trial.sample_location.to_string(),
        bracketed(&trial.search_stim_indices),
        bracketed(&trial.search_stim_locations),
        bracketed(&trial.search_stim_token_reward),
        bracketed(&trial.post_sample_distractor_stim_indices),
        bracketed(&trial.post_sample_distractor_stim_locations),
    ]
    .join("\t")
}

/// `[a,b,c]`, no spaces between items. Positions nest as `[[x, y, z],[x, y, z]]`.
fn bracketed<T: Display>(values: &[T]) -> String {
    let inner: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", inner.join(","))
}

pub fn stim_map_path(out_dir: &Path, names: &OutputNames) -> PathBuf {
    out_dir.join(format!("{}.txt", names.stim_map))
}

/// Path of the 1-based `block` file.
pub fn trial_def_path(out_dir: &Path, names: &OutputNames, block: usize) -> PathBuf {
    out_dir.join(format!("{}{}.txt", names.trial_def, block))
}

pub fn write_stim_map_file<S: Stimulus>(path: &Path, stimuli: &[S]) -> Result<()> {
    write_stim_map(BufWriter::new(File::create(path)?), stimuli)?;
    info!("wrote stimulus mapping to {}", path.display());
    Ok(())
}

/// Writes one trial-definition file per block and returns their paths.
pub fn write_session_files(
    out_dir: &Path,
    names: &OutputNames,
    session: &GeneratedSession,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (b, block) in session.blocks()?.into_iter().enumerate() {
        let path = trial_def_path(out_dir, names, b + 1);
        write_trial_defs(BufWriter::new(File::create(&path)?), block)?;
        info!(trials = block.len(), "wrote block {} trials to {}", b + 1, path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{Position, StimulusSet, TrialDurations};

    fn sample_trial() -> TrialDef {
        TrialDef {
            trial_id: "WM1".into(),
            block_count: 1,
            durations: TrialDurations {
                display_sample: 0.5,
                post_sample_delay: 0.5,
                display_post_sample_distractors: 0.5,
                pre_target_delay: 2.0,
            },
            sample_location: Position::ORIGIN,
            search_stim_indices: vec![3, 1, 4],
            search_stim_locations: vec![
                Position::new(1, 2, 0),
                Position::new(-4, -2, 0),
                Position::new(0, 1, 0),
            ],
            search_stim_token_reward: vec![2, -1, -1],
            post_sample_distractor_stim_indices: vec![1, 4, 2],
            post_sample_distractor_stim_locations: vec![
                Position::new(-3, 0, 0),
                Position::new(0, 0, 0),
                Position::new(3, 0, 0),
            ],
        }
    }

    #[test]
    fn trial_row_matches_column_format() {
        let row = format_trial_row(&sample_trial());
        assert_eq!(
            row,
            "WM1\t1\t0.50\t0.50\t0.50\t2.00\t[0, 0, 0]\t[3,1,4]\t\
             [[1, 2, 0],[-4, -2, 0],[0, 1, 0]]\t[2,-1,-1]\t[1,4,2]\t\
             [[-3, 0, 0],[0, 0, 0],[3, 0, 0]]"
        );
        assert_eq!(row.split('\t').count(), TRIAL_DEF_HEADER.len());
    }

    #[test]
    fn plain_trial_has_empty_post_sample_lists() {
        let mut trial = sample_trial();
        trial.post_sample_distractor_stim_indices.clear();
        trial.post_sample_distractor_stim_locations.clear();
        trial.durations.pre_target_delay = 3.0;

        let row = format_trial_row(&trial);
        assert!(row.ends_with("\t3.00\t[0, 0, 0]\t[3,1,4]\t[[1, 2, 0],[-4, -2, 0],[0, 1, 0]]\t[2,-1,-1]\t[]\t[]"));
    }

    #[test]
    fn stim_map_lists_names_without_extension() {
        let set = StimulusSet::from_file_names(["b.png", "a.jpg"]);
        let mut buf = Vec::new();
        write_stim_map(&mut buf, set.as_slice()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "StimIndex\tFileName\n0\ta\n1\tb\n"
        );
    }

    #[test]
    fn trial_file_starts_with_header() {
        let mut buf = Vec::new();
        write_trial_defs(&mut buf, &[sample_trial(), sample_trial()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TrialID\tBlockCount\t"));
        assert!(lines[0].ends_with("PostSampleDistractorStimLocations"));
    }

    #[test]
    fn block_files_are_numbered_from_one() {
        let names = OutputNames::default();
        let path = trial_def_path(Path::new("out"), &names, 2);
        assert_eq!(path, Path::new("out").join("WorkingMemory_TrialDef_array2.txt"));
    }
}
