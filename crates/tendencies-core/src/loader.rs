// Delivery loading from Cricsheet CSV2 match files.
//
// Each format directory holds one CSV per match (plus `*_info.csv` metadata
// files, which are ignored). Files are read independently; a file that fails
// to parse is logged and skipped so one bad match never costs the format.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::model::{Delivery, DeliveryTable, Extras};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("malformed ball {value:?} in {path} at record {record}")]
    Ball {
        path: String,
        record: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Cricsheet CSV2 row. Columns not named here (season, venue, extras total)
/// are ignored; extras are rebuilt from their components.
#[derive(Debug, Deserialize)]
struct RawDelivery {
    match_id: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    innings: u32,
    ball: String,
    #[serde(default)]
    batting_team: String,
    #[serde(default)]
    bowling_team: String,
    striker: String,
    #[serde(default)]
    non_striker: String,
    bowler: String,
    runs_off_bat: u32,
    #[serde(default)]
    wides: Option<u32>,
    #[serde(default)]
    noballs: Option<u32>,
    #[serde(default)]
    byes: Option<u32>,
    #[serde(default)]
    legbyes: Option<u32>,
    #[serde(default)]
    penalty: Option<u32>,
    #[serde(default)]
    wicket_type: Option<String>,
    #[serde(default)]
    player_dismissed: Option<String>,
    #[serde(default)]
    other_wicket_type: Option<String>,
    #[serde(default)]
    other_player_dismissed: Option<String>,
}

/// Split Cricsheet's `"{completed_overs}.{ball}"` into a 1-based over and
/// the ball within it. `"0.10"` is the tenth delivery of the first over.
pub fn parse_ball(value: &str) -> Option<(u32, u32)> {
    let (over, ball) = value.trim().split_once('.')?;
    let completed: u32 = over.parse().ok()?;
    let ball: u32 = ball.parse().ok()?;
    Some((completed + 1, ball))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawDelivery {
    fn into_delivery(self, over: u32, ball_in_over: u32) -> Delivery {
        Delivery {
            row: 0,
            match_id: self.match_id.trim().to_string(),
            start_date: self.start_date,
            innings: self.innings,
            over,
            ball_in_over,
            striker: self.striker.trim().to_string(),
            non_striker: self.non_striker.trim().to_string(),
            bowler: self.bowler.trim().to_string(),
            batting_team: self.batting_team.trim().to_string(),
            bowling_team: self.bowling_team.trim().to_string(),
            runs_off_bat: self.runs_off_bat,
            extras: Extras {
                wides: self.wides.unwrap_or(0),
                noballs: self.noballs.unwrap_or(0),
                byes: self.byes.unwrap_or(0),
                legbyes: self.legbyes.unwrap_or(0),
                penalty: self.penalty.unwrap_or(0),
            },
            wicket_type: non_empty(self.wicket_type),
            player_dismissed: non_empty(self.player_dismissed),
            other_wicket_type: non_empty(self.other_wicket_type),
            other_player_dismissed: non_empty(self.other_player_dismissed),
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parse every row of one match. Any malformed row fails the whole file.
fn load_match_from_reader<R: Read>(rdr: R, label: &str) -> Result<Vec<Delivery>, LoadError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut deliveries = Vec::new();
    for (record, result) in reader.deserialize::<RawDelivery>().enumerate() {
        let raw = result.map_err(|e| LoadError::Csv {
            path: label.to_string(),
            source: e,
        })?;
        let (over, ball) = parse_ball(&raw.ball).ok_or_else(|| LoadError::Ball {
            path: label.to_string(),
            record,
            value: raw.ball.clone(),
        })?;
        deliveries.push(raw.into_delivery(over, ball));
    }
    Ok(deliveries)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load the deliveries of a single match file.
pub fn load_match_file(path: &Path) -> Result<Vec<Delivery>, LoadError> {
    let label = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: label.clone(),
        source: e,
    })?;
    load_match_from_reader(file, &label)
}

/// Match files eligible for loading: `*.csv` not containing `_info`, sorted
/// by file name so the concatenated table is reproducible.
pub fn list_match_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".csv") && !name.contains("_info") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Outcome of loading one format directory.
#[derive(Debug, Clone)]
pub struct FormatLoad {
    pub table: DeliveryTable,
    pub files_loaded: usize,
    pub files_skipped: usize,
}

/// Load every match file of `format` under `raw_dir/<format>/` into one table.
///
/// Returns `Ok(None)` when the directory is missing, holds no eligible files,
/// or every file failed to parse. A failure to list an existing directory is
/// an error; the pipeline skips the format either way.
pub fn load_format(
    raw_dir: &Path,
    format: &str,
    parallel: bool,
) -> Result<Option<FormatLoad>, LoadError> {
    let dir = raw_dir.join(format);
    if !dir.is_dir() {
        warn!(format, dir = %dir.display(), "no raw data directory, skipping format");
        return Ok(None);
    }

    let files = list_match_files(&dir)?;
    if files.is_empty() {
        warn!(format, dir = %dir.display(), "no match files found, skipping format");
        return Ok(None);
    }

    let results: Vec<Result<Vec<Delivery>, LoadError>> = if parallel {
        files.par_iter().map(|p| load_match_file(p)).collect()
    } else {
        files.iter().map(|p| load_match_file(p)).collect()
    };

    let mut deliveries = Vec::new();
    let mut files_loaded = 0;
    let mut files_skipped = 0;
    for result in results {
        match result {
            Ok(mut rows) => {
                files_loaded += 1;
                deliveries.append(&mut rows);
            }
            Err(e) => {
                files_skipped += 1;
                warn!(format, "skipping match file: {}", e);
            }
        }
    }

    if files_loaded == 0 {
        warn!(format, files_skipped, "every match file failed to parse, skipping format");
        return Ok(None);
    }

    debug!(format, files_loaded, files_skipped, deliveries = deliveries.len(), "format loaded");
    Ok(Some(FormatLoad {
        table: DeliveryTable::new(format, deliveries),
        files_loaded,
        files_skipped,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
