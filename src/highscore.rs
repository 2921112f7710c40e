//! Best-score persistence.
//!
//! The engine only sees the [`HighScoreStore`] trait. The binary uses a
//! [`JsonFileStore`] under the user data directory; tests use [`MemoryStore`].

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "snake";
const FILE_NAME: &str = "highscore.json";

#[derive(Debug, thiserror::Error)]
pub enum HighScoreError {
    #[error("high score I/O on '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("corrupt high score file '{path}': {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },

    #[error("no data directory available for the high score file")]
    NoDataDir,
}

pub trait HighScoreStore {
    fn load(&self) -> Result<u64, HighScoreError>;
    fn save(&mut self, value: u64) -> Result<(), HighScoreError>;
}

#[derive(Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileStore { path: path.as_ref().to_path_buf() }
    }

    /// `<data dir>/snake/highscore.json`
    pub fn in_data_dir() -> Result<Self, HighScoreError> {
        let dir = dirs::data_dir().ok_or(HighScoreError::NoDataDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> HighScoreError {
        HighScoreError::Io { path: self.path.clone(), source }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u64, HighScoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_err(e)),
        };

        let file: HighScoreFile = serde_json::from_str(&raw)
            .map_err(|source| HighScoreError::Corrupt { path: self.path.clone(), source })?;
        Ok(file.high_score)
    }

    fn save(&mut self, value: u64) -> Result<(), HighScoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let json = serde_json::to_string_pretty(&HighScoreFile { high_score: value })
            .map_err(|source| HighScoreError::Corrupt { path: self.path.clone(), source })?;
        fs::write(&self.path, json).map_err(|e| self.io_err(e))
    }
}

/// In-process store. Clones share the same value, so a test can keep a
/// handle while the engine owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    value: Rc<Cell<u64>>,
}

impl MemoryStore {
    pub fn new(initial: u64) -> Self {
        MemoryStore { value: Rc::new(Cell::new(initial)) }
    }

    pub fn get(&self) -> u64 {
        self.value.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, HighScoreError> {
        Ok(self.value.get())
    }

    fn save(&mut self, value: u64) -> Result<(), HighScoreError> {
        self.value.set(value);
        Ok(())
    }
}
