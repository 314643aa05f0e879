//! On-disk run layout
//!
//! ```text
//! <directory>/
//!   run_config.json
//!   snapshots/iteration_000000.json
//!   ledger/iteration_000000.json
//! ```
//!
//! Every file is written to a temporary file in the target directory and
//! renamed into place without clobbering, so a reader never sees a partial
//! document and a persisted iteration is never rewritten. The snapshot of an
//! iteration is written before its ledger entry; the ledger entry marks the
//! iteration as complete.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use units::Time;

use crate::config::SimulationConfig;
use crate::engine::EngineSnapshot;
use crate::error::PersistenceError;
use crate::registry::RegistrySnapshot;

const RUN_CONFIG: &str = "run_config.json";
const SNAPSHOTS: &str = "snapshots";
const LEDGER: &str = "ledger";

/// Configuration of a run together with the values fixed at its start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub config: SimulationConfig,
    pub advance_duration: Time,
}

fn iteration_file(iteration: u64) -> String {
    format!("iteration_{iteration:06}.json")
}

fn parse_iteration_file(name: &str) -> Option<u64> {
    name.strip_prefix("iteration_")?.strip_suffix(".json")?.parse().ok()
}

#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Creates the directory layout under `root`
    pub fn create(root: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let root = root.as_ref().to_path_buf();
        for dir in [root.join(SNAPSHOTS), root.join(LEDGER)] {
            fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        }
        Ok(Self { root })
    }

    /// Opens an existing run directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let root = root.as_ref().to_path_buf();
        let ledger = root.join(LEDGER);
        if !ledger.is_dir() {
            return Err(PersistenceError::Empty(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, iteration: u64) -> PathBuf {
        self.root.join(SNAPSHOTS).join(iteration_file(iteration))
    }

    fn ledger_path(&self, iteration: u64) -> PathBuf {
        self.root.join(LEDGER).join(iteration_file(iteration))
    }

    fn write_new<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PersistenceError> {
        if path.exists() {
            return Err(PersistenceError::AlreadyPersisted(path.to_path_buf()));
        }
        let dir = path.parent().unwrap_or(&self.root);
        let mut file = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer(&mut writer, value)?;
            writer.flush().map_err(|e| PersistenceError::io(path, e))?;
        }
        file.as_file().sync_all().map_err(|e| PersistenceError::io(path, e))?;
        file.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                PersistenceError::AlreadyPersisted(path.to_path_buf())
            } else {
                PersistenceError::Persist(e)
            }
        })?;
        debug!("persisted {}", path.display());
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T, PersistenceError> {
        let file = fs::File::open(path).map_err(|e| PersistenceError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<(), PersistenceError> {
        self.write_new(&self.root.join(RUN_CONFIG), manifest)
    }

    pub fn load_manifest(&self) -> Result<RunManifest, PersistenceError> {
        self.read(&self.root.join(RUN_CONFIG))
    }

    pub fn write_snapshot(&self, iteration: u64, snapshot: &EngineSnapshot) -> Result<(), PersistenceError> {
        self.write_new(&self.snapshot_path(iteration), snapshot)
    }

    pub fn load_snapshot(&self, iteration: u64) -> Result<EngineSnapshot, PersistenceError> {
        self.read(&self.snapshot_path(iteration))
    }

    pub fn write_ledger(&self, ledger: &RegistrySnapshot) -> Result<(), PersistenceError> {
        self.write_new(&self.ledger_path(ledger.iteration), ledger)
    }

    pub fn load_ledger(&self, iteration: u64) -> Result<RegistrySnapshot, PersistenceError> {
        let ledger: RegistrySnapshot = self.read(&self.ledger_path(iteration))?;
        if ledger.iteration != iteration {
            return Err(PersistenceError::Inconsistent {
                iteration,
                message: format!("file holds iteration {}", ledger.iteration),
            });
        }
        Ok(ledger)
    }

    fn list(&self, subdir: &str) -> Result<Vec<u64>, PersistenceError> {
        let dir = self.root.join(subdir);
        let entries = fs::read_dir(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

        let mut iterations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PersistenceError::io(&dir, e))?;
            if let Some(k) = entry.file_name().to_str().and_then(parse_iteration_file) {
                iterations.push(k);
            }
        }
        iterations.sort_unstable();
        Ok(iterations)
    }

    /// Iterations with a complete ledger entry, ascending
    pub fn iterations(&self) -> Result<Vec<u64>, PersistenceError> {
        self.list(LEDGER)
    }

    /// Deletes snapshots of iterations that never got a ledger entry
    ///
    /// Such a snapshot is left behind when a run stops between writing an
    /// iteration's snapshot and its ledger entry.
    ///
    /// # Returns
    ///
    /// The iterations whose snapshots were removed
    pub fn discard_incomplete(&self) -> Result<Vec<u64>, PersistenceError> {
        let complete = self.iterations()?;
        let mut discarded = Vec::new();
        for k in self.list(SNAPSHOTS)? {
            if complete.binary_search(&k).is_err() {
                let path = self.snapshot_path(k);
                fs::remove_file(&path).map_err(|e| PersistenceError::io(&path, e))?;
                warn!("removed incomplete snapshot {}", path.display());
                discarded.push(k);
            }
        }
        Ok(discarded)
    }

    pub fn latest_iteration(&self) -> Result<u64, PersistenceError> {
        self.iterations()?
            .last()
            .copied()
            .ok_or_else(|| PersistenceError::Empty(self.root.clone()))
    }

    /// Full ledger history keyed by iteration
    pub fn load_ledger_history(&self) -> Result<BTreeMap<u64, RegistrySnapshot>, PersistenceError> {
        self.iterations()?
            .into_iter()
            .map(|k| self.load_ledger(k).map(|ledger| (k, ledger)))
            .collect()
    }
}
