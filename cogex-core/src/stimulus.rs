use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zero-based stimulus identifier, stable for one run.
pub type StimulusIndex = usize;

/// Defines stimuli and the names they are exported under
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    fn index(&self) -> StimulusIndex;
    /// File name with its extension stripped.
    fn name(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StimulusError {
    #[error("stimulus directory {0} not found or not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to list stimulus directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stimulus file name {0:?} is not valid UTF-8")]
    InvalidFileName(std::ffi::OsString),
    #[error("no stimulus files found in {0}")]
    Empty(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusFile {
    pub index: StimulusIndex,
    pub file_name: String,
    pub name: String,
}

impl Stimulus for StimulusFile {
    fn index(&self) -> StimulusIndex {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sorted, indexed set of stimulus files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StimulusSet {
    files: Vec<StimulusFile>,
}

impl StimulusSet {
    /// Lists the regular files of `dir` that qualify as stimuli.
    ///
    /// Hidden files (leading `.`) and Unity-style `.meta` sidecars are skipped.
    /// Indices follow the sorted file name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, StimulusError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(StimulusError::NotADirectory(dir.to_path_buf()));
        }
        let io_err = |source| StimulusError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let file_name = entry.file_name();
            if !is_eligible(file_name.as_encoded_bytes()) {
                continue;
            }
            // follows symlinks, like a plain isfile check
            if entry.path().is_file() {
                let name = file_name
                    .into_string()
                    .map_err(StimulusError::InvalidFileName)?;
                names.push(name);
            }
        }

        let set = Self::from_file_names(names);
        if set.is_empty() {
            return Err(StimulusError::Empty(dir.to_path_buf()));
        }
        Ok(set)
    }

    /// Builds a set from already-listed file names, applying the same
    /// filtering and ordering as [`StimulusSet::from_dir`].
    pub fn from_file_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n| is_eligible(n.as_bytes()))
            .collect();
        names.sort();

        let files = names
            .into_iter()
            .enumerate()
            .map(|(index, file_name)| StimulusFile {
                index,
                name: strip_extension(&file_name).to_string(),
                file_name,
            })
            .collect();
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StimulusFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[StimulusFile] {
        &self.files
    }
}

impl<'a> IntoIterator for &'a StimulusSet {
    type Item = &'a StimulusFile;
    type IntoIter = std::slice::Iter<'a, StimulusFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Works on raw name bytes so skipped entries never need to be valid UTF-8.
fn is_eligible(name: &[u8]) -> bool {
    const META: &[u8] = b".meta";
    let is_meta = name.len() >= META.len()
        && name[name.len() - META.len()..].eq_ignore_ascii_case(META);
    !name.starts_with(b".") && !is_meta
}

/// Strips the last extension; a name without one is returned unchanged.
fn strip_extension(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}
