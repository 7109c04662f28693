//! Loading of trending-list snapshot files
//!
//! The scraper writes one CSV file per scan of the trending list. A corpus is
//! either every file of a directory whose name matches a glob pattern, or an
//! explicit list of files.
//!
//! ```no_run
//! use youtrend_dataset::loader::DatasetSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = DatasetSource::directory("data/snapshots", "dataset*").load()?;
//! println!("{} observations", frame.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::frame::{Frame, FrameError};

pub const DEFAULT_PATTERN: &str = "dataset*";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("no file matching '{pattern}' in {}", dir.display())]
    NotFound { dir: PathBuf, pattern: String },
    #[display("file {} does not exist", path.display())]
    FileNotFound { path: PathBuf },
    #[display("invalid file pattern '{pattern}'")]
    InvalidPattern { pattern: String, source: regex::Error },
    #[display("failed to list {}", dir.display())]
    Walk { dir: PathBuf, source: walkdir::Error },
    #[from]
    #[display("{_0}")]
    Frame(FrameError),
}

/// Where snapshot files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Files directly inside `dir` whose name matches the glob `pattern`.
    Directory { dir: PathBuf, pattern: String },
    /// Explicit files, loaded in the given order.
    Files(Vec<PathBuf>),
}

impl DatasetSource {
    pub fn directory<P, S>(dir: P, pattern: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self::Directory {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::Files(files.into_iter().map(Into::into).collect())
    }

    /// Resolves the list of files to read.
    pub fn resolve(&self) -> Result<Vec<PathBuf>, LoadError> {
        match self {
            Self::Directory { dir, pattern } => {
                let files = matching_files(dir, pattern)?;
                if files.is_empty() {
                    return Err(LoadError::NotFound {
                        dir: dir.clone(),
                        pattern: pattern.clone(),
                    });
                }
                Ok(files)
            }
            Self::Files(files) => {
                if let Some(missing) = files.iter().find(|path| !path.is_file()) {
                    return Err(LoadError::FileNotFound {
                        path: missing.clone(),
                    });
                }
                Ok(files.clone())
            }
        }
    }

    /// Reads every file and concatenates them into one unlabeled table.
    pub fn load(&self) -> Result<Frame, LoadError> {
        let files = self.resolve()?;
        let frames = files
            .iter()
            .map(|path| -> Result<Frame, LoadError> {
                let mut frame = Frame::read_csv(path)?;
                frame.drop_unnamed_index();
                tracing::debug!(path = %path.display(), rows = frame.len(), "loaded snapshot");
                Ok(frame)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let frame = Frame::concat(frames);
        tracing::info!(
            files = files.len(),
            rows = frame.len(),
            "loaded snapshot corpus"
        );
        Ok(frame)
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, LoadError> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|source| LoadError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let matcher = glob_to_regex(pattern)?;
    let mut files = vec![];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| LoadError::Walk {
            dir: dir.to_owned(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| matcher.is_match(name))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
