//! Conversion of every spec file below a directory.
//!
//! Files are converted independently and in parallel. A failure in one file
//! never stops the others; every outcome ends up in the [`Summary`].

use std::path::{Path, PathBuf};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    Config,
    storage::spec_file::{FileError, Outcome, convert_file},
};

/// The per-file results of converting several files.
#[derive(Debug, Default)]
pub struct Summary {
    results: Vec<(PathBuf, Result<Outcome, FileError>)>,
}

impl Summary {
    /// Iterates over the results in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Result<Outcome, FileError>)> {
        self.results
            .iter()
            .map(|(path, result)| (path.as_path(), result))
    }

    /// Iterates over the files that failed to convert.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FileError)> {
        self.iter()
            .filter_map(|(path, result)| result.as_ref().err().map(|e| (path, e)))
    }

    /// The number of files that finished with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results
            .iter()
            .filter(|(_, result)| result.as_ref().is_ok_and(|o| *o == outcome))
            .count()
    }

    /// The number of files that were processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no files were processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether every file converted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }
}

impl FromIterator<(PathBuf, Result<Outcome, FileError>)> for Summary {
    fn from_iter<I: IntoIterator<Item = (PathBuf, Result<Outcome, FileError>)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Finds the files below `root` that are candidates for conversion.
///
/// Directories named in the configuration's exclude list are skipped. The
/// paths are returned sorted.
#[must_use]
pub fn collect_paths(root: &Path, config: &Config) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && config.is_excluded(entry.file_name()))
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && config.is_candidate(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Converts each file in place.
#[must_use]
pub fn convert_all(paths: &[PathBuf], config: &Config) -> Summary {
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| (path.clone(), convert_file(path, config.skip_unchanged)))
        .collect();
    results.into_iter().collect()
}

/// Converts every candidate file below `root` in place.
#[must_use]
pub fn convert_directory(root: &Path, config: &Config) -> Summary {
    let paths = collect_paths(root, config);
    tracing::debug!("Found {} files below {}", paths.len(), root.display());
    convert_all(&paths, config)
}
