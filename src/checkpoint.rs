//! Durable watch state and run output
//!
//! Both files are replaced as a whole: the new content goes to a temporary
//! file in the same directory, which is then renamed over the old one.

use crate::{
    error::CheckpointError,
    state::{InflationResult, WatchState},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    state_path: PathBuf,
    result_path: PathBuf,
}

impl CheckpointStore {
    pub fn new(state_path: impl Into<PathBuf>, result_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            result_path: result_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn result_path(&self) -> &Path {
        &self.result_path
    }

    /// Prior watch state, if a readable one exists
    #[instrument(skip(self), fields(path = %self.state_path.display()))]
    pub fn load(&self) -> Option<WatchState> {
        if !self.state_path.exists() {
            debug!("No checkpoint found");
            return None;
        }
        match read_json::<WatchState>(&self.state_path) {
            Ok(state) => {
                info!("Resuming from checkpoint at cursor {}", state.cursor);
                Some(state)
            }
            Err(e) => {
                warn!("Ignoring unreadable checkpoint: {e}");
                None
            }
        }
    }

    pub fn save(&self, state: &WatchState) -> Result<(), CheckpointError> {
        write_json(&self.state_path, state)?;
        debug!("Saved checkpoint at cursor {}", state.cursor);
        Ok(())
    }

    pub fn write_result(&self, result: &InflationResult) -> Result<(), CheckpointError> {
        write_json(&self.result_path, result)?;
        info!(
            "Wrote inflation result for ledger {} to {}",
            result.ledger_sequence,
            self.result_path.display()
        );
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let bytes = fs::read(path).map_err(|source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CheckpointError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    let io_err = |source: std::io::Error| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| CheckpointError::Serde {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
