use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{ConvertError, DocumentModel};

/// What happened to a file that converted successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The converted document was written back.
    Converted,
    /// The file already held the converted document and was left alone.
    Unchanged,
}

/// Errors that can occur when converting a file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The file's content could not be converted.
    #[error("{}: {source}", path.display())]
    Convert {
        /// The file being converted.
        path: PathBuf,
        /// Why conversion was abandoned.
        #[source]
        source: ConvertError,
    },
}

impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// The conversion failure, if that is what went wrong.
    #[must_use]
    pub const fn convert_error(&self) -> Option<ConvertError> {
        match self {
            Self::Convert { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// Reads and parses the document at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if it has no title or no
/// content to convert.
pub fn read_document(path: &Path) -> Result<DocumentModel, FileError> {
    let text = std::fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
    DocumentModel::parse(&text).map_err(|source| {
        tracing::warn!("Not converting {}: {source}", path.display());
        FileError::Convert {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Writes `contents` to `path`.
///
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_document(path: &Path, contents: &str) -> Result<(), FileError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(contents.as_bytes())?;
        writer.flush()
    };
    write().map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts the file at `path` in place.
///
/// If `skip_unchanged` is set and the converted document is identical to the
/// file's current content, the file is not rewritten. A file that fails to
/// convert is never touched.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read or written, or
/// cannot be converted.
pub fn convert_file(path: &Path, skip_unchanged: bool) -> Result<Outcome, FileError> {
    let original = std::fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
    let converted = crate::convert(&original).map_err(|source| {
        tracing::warn!("Not converting {}: {source}", path.display());
        FileError::Convert {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if skip_unchanged && converted == original {
        tracing::debug!("{} is already converted", path.display());
        return Ok(Outcome::Unchanged);
    }

    write_document(path, &converted)?;
    tracing::info!("Converted {}", path.display());
    Ok(Outcome::Converted)
}
