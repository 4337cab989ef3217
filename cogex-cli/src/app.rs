use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cogex_core::StimulusSet;
use cogex_trialgen::output::{stim_map_path, write_session_files, write_stim_map_file};
use cogex_trialgen::{GeneratorConfig, TrialGenerator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cogex-trialgen",
    version,
    about = "Generate stimulus maps and block-split working-memory trial definitions"
)]
pub struct Args {
    /// Folder holding the stimulus files
    #[arg(long)]
    pub stim_dir: PathBuf,
    /// JSON config; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Times each stimulus appears as the target
    #[arg(long)]
    pub times_as_target: Option<usize>,
    /// Fraction of trials with 3 post-sample distractors (e.g. 0.5)
    #[arg(long)]
    pub distractor_ratio: Option<f64>,
    /// Prefix for each TrialID (e.g. WMn1.TDSIM)
    #[arg(long)]
    pub trial_id_prefix: Option<String>,
    /// Number of blocks to split the trials into
    #[arg(long)]
    pub blocks: Option<usize>,
    /// Value of the BlockCount column
    #[arg(long)]
    pub block_count: Option<u32>,
    #[arg(long)]
    pub display_sample: Option<f64>,
    #[arg(long)]
    pub post_sample_delay: Option<f64>,
    #[arg(long)]
    pub display_post_sample_distractors: Option<f64>,
    #[arg(long)]
    pub pre_target_delay: Option<f64>,
    /// Base name of the stimulus map (".txt" is appended)
    #[arg(long)]
    pub stim_map_name: Option<String>,
    /// Base name of the trial files (block number and ".txt" are appended)
    #[arg(long)]
    pub trial_def_name: Option<String>,
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Seed for reproducible output; drawn at random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

pub struct App {
    args: Args,
    config: GeneratorConfig,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn load_config(args: &Args) -> Result<GeneratorConfig> {
        let mut config = match &args.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(v) = args.times_as_target {
            config.times_as_target = v;
        }
        if let Some(v) = args.distractor_ratio {
            config.distractor_ratio = v;
        }
        if let Some(v) = &args.trial_id_prefix {
            config.trial_id_prefix = v.clone();
        }
        if let Some(v) = args.blocks {
            config.num_blocks = v;
        }
        if let Some(v) = args.block_count {
            config.block_count = v;
        }
        if let Some(v) = args.display_sample {
            config.durations.display_sample = v;
        }
        if let Some(v) = args.post_sample_delay {
            config.durations.post_sample_delay = v;
        }
        if let Some(v) = args.display_post_sample_distractors {
            config.durations.display_post_sample_distractors = v;
        }
        if let Some(v) = args.pre_target_delay {
            config.durations.pre_target_delay = v;
        }
        if let Some(v) = &args.stim_map_name {
            config.output.stim_map = v.clone();
        }
        if let Some(v) = &args.trial_def_name {
            config.output.trial_def = v.clone();
        }
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        let stimuli = StimulusSet::from_dir(&self.args.stim_dir)
            .with_context(|| format!("reading stimuli from {}", self.args.stim_dir.display()))?;
        info!("found {} stimulus files", stimuli.len());
        debug!(config = ?self.config(), "resolved configuration");

        let seed = self.args.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, "seeding generator");

        let mut generator = TrialGenerator::new(self.config, StdRng::seed_from_u64(seed));
        let session = generator.generate(&stimuli)?;
        info!(
            total_trials = session.plan.total_trials,
            distractor_trials = session.plan.distractor_trials,
            adjusted = session.plan.was_adjusted(),
            "each of {} stimuli appears {} times as a distractor",
            stimuli.len(),
            session.plan.times_as_distractor
        );

        let out_dir = &self.args.out_dir;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        let names = &generator.config.output;
        write_stim_map_file(&stim_map_path(out_dir, names), stimuli.as_slice())
            .context("writing stimulus map")?;
        write_session_files(out_dir, names, &session).context("writing trial definitions")?;

        if let Some(path) = &self.args.summary {
            let summary = generator.summary(&session, Some(seed))?;
            let file = File::create(path)
                .with_context(|| format!("creating summary file {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
            info!("run summary saved to {}", path.display());
        }

        info!("all done");
        Ok(())
    }
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}
