use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("label file contains no labels")]
    Empty,
}

/// Ordered class labels, as the classifier was trained on them.
///
/// Line order defines the index each probability maps to, so the set is
/// loaded once at startup and never reordered. `index_of` returns the first
/// occurrence when a label appears twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Loads labels from a text file, one label per line.
    pub fn from_file(path: &Path) -> Result<Self, LabelError> {
        let text = std::fs::read_to_string(path).map_err(|e| LabelError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text)
    }

    /// Parses label text: one label per line, surrounding whitespace
    /// trimmed, blank lines skipped.
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let labels: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }
        Ok(Self { labels })
    }

    pub fn from_labels(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }
        Ok(Self { labels })
    }

    /// Index of the first occurrence of `label`, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
