//! Known-bad symbol pairs
//!
//! Pairs the quote service could not price in a previous run. Stored as a
//! JSON array of `[symbol, symbol]`; order inside a pair does not matter.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::CatalogError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadPairs {
    pairs: Vec<(String, String)>,
}

impl BadPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk. A missing file is an empty list.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let buf = match fs::read(path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No bad pairs file at {}", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(CatalogError::Unavailable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let pairs: Self = serde_json::from_slice(&buf).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        info!("🚫 Loaded {} known bad pairs", pairs.len());
        Ok(pairs)
    }

    /// Write the list as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check both directions
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Add a pair unless it is already known. Returns whether it was new.
    pub fn insert(&mut self, a: &str, b: &str) -> bool {
        if self.contains(a, b) {
            return false;
        }
        self.pairs.push((a.to_string(), b.to_string()));
        true
    }

    pub fn merge(&mut self, other: &BadPairs) -> usize {
        other
            .pairs
            .iter()
            .filter(|(a, b)| self.insert(a, b))
            .count()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }
}
