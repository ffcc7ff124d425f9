// Pipeline orchestration: load each format, aggregate every player, filter by
// the inclusion thresholds, then write profiles and the merged index.
//
// Formats are independent and may run on the rayon pool. Each produces its
// own IndexBuilder; merging and all file writes happen on the calling thread.

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::batting::{self, BattingProfile};
use crate::bowling::{self, BowlingProfile};
use crate::config::{Config, Thresholds};
use crate::estimator::SeedSource;
use crate::index::IndexBuilder;
use crate::loader::{self, LoadError};
use crate::model::{Delivery, Role};
use crate::writer::{self, WriteError};

/// Fatal pipeline failures. Load problems never surface here: a format that
/// cannot be read is skipped and reported in the summary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Write(#[from] WriteError),
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub format: String,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub deliveries: usize,
    pub batters_written: usize,
    pub bowlers_written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub formats: Vec<FormatSummary>,
    /// Formats with no usable raw data.
    pub skipped_formats: Vec<String>,
    pub teams: usize,
    pub index_path: PathBuf,
}

impl PipelineSummary {
    pub fn batters_written(&self) -> usize {
        self.formats.iter().map(|f| f.batters_written).sum()
    }

    pub fn bowlers_written(&self) -> usize {
        self.formats.iter().map(|f| f.bowlers_written).sum()
    }
}

/// Everything one format contributes, before anything touches disk.
#[derive(Debug, Clone)]
pub struct FormatOutput {
    pub summary: FormatSummary,
    pub batters: Vec<BattingProfile>,
    pub bowlers: Vec<BowlingProfile>,
    pub index: IndexBuilder,
}

// ---------------------------------------------------------------------------
// Inclusion
// ---------------------------------------------------------------------------

pub fn accept_batter(profile: &BattingProfile, thresholds: &Thresholds) -> bool {
    profile.stats.balls_faced >= thresholds.min_balls_faced
}

pub fn accept_bowler(profile: &BowlingProfile, thresholds: &Thresholds) -> bool {
    profile.stats.overs >= thresholds.min_overs
}

// ---------------------------------------------------------------------------
// Per-format processing
// ---------------------------------------------------------------------------

/// Load and aggregate one format. `Ok(None)` means the format had no usable
/// data and was skipped.
pub fn process_format(config: &Config, format: &str) -> Result<Option<FormatOutput>, LoadError> {
    info!(format, "processing format");
    let Some(load) = loader::load_format(&config.raw_dir, format, config.parallel)? else {
        return Ok(None);
    };
    let table = &load.table;
    let seeds = SeedSource::new(config.seed);

    let mut striker_groups: Vec<_> = table.by_striker().into_iter().collect();
    striker_groups.sort_by(|a, b| a.0.cmp(b.0));
    let mut bowler_groups: Vec<_> = table.by_bowler().into_iter().collect();
    bowler_groups.sort_by(|a, b| a.0.cmp(b.0));

    let build_batter = |(name, faced): &(&str, Vec<&Delivery>)| {
        let weights = config.estimator.zone_weights_for(name);
        batting::build_profile(name, format, faced, &seeds, &weights)
            .filter(|p| accept_batter(p, &config.thresholds))
    };
    let build_bowler = |(name, bowled): &(&str, Vec<&Delivery>)| {
        let preference = config.estimator.preference_for(name);
        bowling::build_profile(name, format, bowled, &seeds, &preference)
            .filter(|p| accept_bowler(p, &config.thresholds))
    };

    let (batters, bowlers): (Vec<BattingProfile>, Vec<BowlingProfile>) = if config.parallel {
        (
            striker_groups.par_iter().filter_map(build_batter).collect(),
            bowler_groups.par_iter().filter_map(build_bowler).collect(),
        )
    } else {
        (
            striker_groups.iter().filter_map(build_batter).collect(),
            bowler_groups.iter().filter_map(build_bowler).collect(),
        )
    };

    let mut index = IndexBuilder::new();
    for p in &batters {
        index.insert(&p.team, format, Role::Batter, &p.name);
    }
    for p in &bowlers {
        index.insert(&p.team, format, Role::Bowler, &p.name);
    }

    let summary = FormatSummary {
        format: format.to_string(),
        files_loaded: load.files_loaded,
        files_skipped: load.files_skipped,
        deliveries: table.len(),
        batters_written: batters.len(),
        bowlers_written: bowlers.len(),
    };
    info!(
        format,
        deliveries = summary.deliveries,
        batters = summary.batters_written,
        bowlers = summary.bowlers_written,
        "format aggregated"
    );

    Ok(Some(FormatOutput {
        summary,
        batters,
        bowlers,
        index,
    }))
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Process every configured format and persist the artifacts.
///
/// The index file is always written, even when no format produced data.
pub fn run(config: &Config) -> Result<PipelineSummary, PipelineError> {
    let outputs: Vec<(&str, Result<Option<FormatOutput>, LoadError>)> = if config.parallel {
        config
            .formats
            .par_iter()
            .map(|f| (f.as_str(), process_format(config, f)))
            .collect()
    } else {
        config
            .formats
            .iter()
            .map(|f| (f.as_str(), process_format(config, f)))
            .collect()
    };
    persist(config, outputs)
}

/// Write every format's profiles in order, merge the per-format indexes and
/// write the index. Formats that failed to load are skipped with a warning.
fn persist<'a>(
    config: &Config,
    outputs: impl IntoIterator<Item = (&'a str, Result<Option<FormatOutput>, LoadError>)>,
) -> Result<PipelineSummary, PipelineError> {
    writer::prepare_dir(&config.processed_dir)?;

    let mut index = IndexBuilder::new();
    let mut summary = PipelineSummary::default();
    for (format, output) in outputs {
        let output = match output {
            Ok(Some(output)) => output,
            Ok(None) => {
                warn!(format, "format skipped");
                summary.skipped_formats.push(format.to_string());
                continue;
            }
            Err(e) => {
                warn!(format, "format skipped, failed to load: {}", e);
                summary.skipped_formats.push(format.to_string());
                continue;
            }
        };

        for p in &output.batters {
            let path =
                writer::write_profile(&config.processed_dir, &p.name, format, Role::Batter, p)?;
            debug!(path = %path.display(), "wrote batting profile");
        }
        for p in &output.bowlers {
            let path =
                writer::write_profile(&config.processed_dir, &p.name, format, Role::Bowler, p)?;
            debug!(path = %path.display(), "wrote bowling profile");
        }

        index.merge(output.index);
        summary.formats.push(output.summary);
    }

    summary.index_path = writer::write_index(&config.processed_dir, &index)?;
    summary.teams = index.team_count();
    info!(
        teams = summary.teams,
        batters = summary.batters_written(),
        bowlers = summary.bowlers_written(),
        "index written to {}",
        summary.index_path.display()
    );

    Ok(summary)
}
