// Artifact persistence: one JSON file per profile plus the index.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::index::IndexBuilder;
use crate::model::Role;

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Lower-cased name with spaces replaced by underscores.
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// `{slug}_{format}_{bat|bowl}.json`
pub fn profile_file_name(name: &str, format: &str, role: Role) -> String {
    format!("{}_{}_{}.json", slug(name), format, role.short_code())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriteError> {
    let bytes = serde_json::to_vec(value).map_err(|e| WriteError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, bytes).map_err(|e| WriteError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Create the output directory if needed.
pub fn prepare_dir(dir: &Path) -> Result<(), WriteError> {
    std::fs::create_dir_all(dir).map_err(|e| WriteError::Io {
        path: dir.display().to_string(),
        source: e,
    })
}

/// Write one profile, overwriting any previous artifact for the same key.
pub fn write_profile<T: Serialize>(
    dir: &Path,
    name: &str,
    format: &str,
    role: Role,
    profile: &T,
) -> Result<PathBuf, WriteError> {
    let path = dir.join(profile_file_name(name, format, role));
    write_json(&path, profile)?;
    Ok(path)
}

pub fn write_index(dir: &Path, index: &IndexBuilder) -> Result<PathBuf, WriteError> {
    let path = dir.join(INDEX_FILE);
    write_json(&path, index)?;
    Ok(path)
}
