//! Class index → human-readable label mapping.
//!
//! Loaded once at startup from a JSON file (`classes.txt` in the usual
//! deployment) and shared read-only afterwards. Two shapes are accepted:
//!
//! - an object keyed by decimal index strings: `{"0": "tench", "1": "goldfish"}`
//! - a plain array where the position is the index: `["tench", "goldfish"]`

use std::{collections::HashMap, path::Path};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading a [`LabelStore`]. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum LabelStoreError {
    #[error("failed to read label file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("label file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("label key `{0}` is not a non-negative integer")]
    InvalidKey(String),

    #[error("label for index {0} must be a string")]
    InvalidLabel(usize),

    #[error("label file must be a JSON object or array")]
    UnsupportedShape,

    #[error("label file contains no labels")]
    Empty,
}

/// Read-only mapping from class index to label.
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    labels: HashMap<usize, String>,
}

impl LabelStore {
    /// Reads and parses the label file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelStoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LabelStoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json_str(&raw)?;
        info!(count = store.len(), path = %path.display(), "label store loaded");
        Ok(store)
    }

    /// Parses labels from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, LabelStoreError> {
        let value: Value = serde_json::from_str(raw)?;
        let mut labels = HashMap::new();

        match value {
            Value::Object(map) => {
                for (key, label) in map {
                    let index = key
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| LabelStoreError::InvalidKey(key.clone()))?;
                    let Value::String(label) = label else {
                        return Err(LabelStoreError::InvalidLabel(index));
                    };
                    labels.insert(index, label);
                }
            }
            Value::Array(items) => {
                for (index, label) in items.into_iter().enumerate() {
                    let Value::String(label) = label else {
                        return Err(LabelStoreError::InvalidLabel(index));
                    };
                    labels.insert(index, label);
                }
            }
            _ => return Err(LabelStoreError::UnsupportedShape),
        }

        if labels.is_empty() {
            return Err(LabelStoreError::Empty);
        }
        Ok(Self { labels })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(usize, String)> for LabelStore {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}
