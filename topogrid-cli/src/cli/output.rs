//! Artifact files written by the CLI.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{Span, field, info, instrument, warn};

use super::commands::CliError;

/// What happened to one artifact path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    /// The file was created or replaced.
    Written,
    /// The file already existed and overwriting was not requested.
    SkippedExisting,
}

/// A path paired with the outcome of writing it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactRecord {
    /// Destination of the artifact.
    pub path: PathBuf,
    /// Whether the artifact was written or kept.
    pub outcome: WriteOutcome,
}

/// Writes artifacts, honouring the `--overwrite` flag.
///
/// Contents are staged in a temporary file beside the destination and moved
/// into place only once complete, so a failed write leaves nothing behind.
/// Without overwrite the move refuses to replace an existing file, which is
/// then kept and reported as [`WriteOutcome::SkippedExisting`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArtifactWriter {
    overwrite: bool,
}

impl ArtifactWriter {
    /// Creates a writer; `overwrite` replaces existing files.
    #[must_use]
    pub const fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Returns whether `path` would be skipped, letting callers avoid
    /// building contents that will not be written.
    #[must_use]
    pub fn would_skip(&self, path: &Path) -> bool {
        !self.overwrite && path.exists()
    }

    /// Writes `contents` to `path`.
    ///
    /// # Errors
    /// Returns [`CliError::Io`] when the file cannot be staged, written or
    /// moved into place.
    #[instrument(
        name = "cli.write_artifact",
        skip_all,
        err,
        fields(path = field::Empty, bytes = contents.len())
    )]
    pub fn write(&self, path: &Path, contents: &str) -> Result<ArtifactRecord, CliError> {
        Span::current().record("path", field::display(path.display()));
        self.write_with(path, |out| out.write_all(contents.as_bytes()))
    }

    fn write_with<F>(&self, path: &Path, render: F) -> Result<ArtifactRecord, CliError>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(|source| CliError::io(path, source))?;
        {
            let mut out = BufWriter::new(staged.as_file_mut());
            render(&mut out)
                .and_then(|()| out.flush())
                .map_err(|source| CliError::io(path, source))?;
        }
        let placed = if self.overwrite {
            staged.persist(path)
        } else {
            staged.persist_noclobber(path)
        };
        match placed {
            Ok(_) => {
                info!(path = %path.display(), "artifact written");
                Ok(ArtifactRecord {
                    path: path.to_path_buf(),
                    outcome: WriteOutcome::Written,
                })
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                warn!(
                    path = %path.display(),
                    "artifact already exists; keeping it (pass --overwrite to replace)"
                );
                Ok(ArtifactRecord {
                    path: path.to_path_buf(),
                    outcome: WriteOutcome::SkippedExisting,
                })
            }
            Err(err) => Err(CliError::io(path, err.error)),
        }
    }

    /// Records a skip for `path` without touching the filesystem.
    #[must_use]
    pub fn skipped(&self, path: &Path) -> ArtifactRecord {
        info!(path = %path.display(), "artifact exists; not regenerating");
        ArtifactRecord {
            path: path.to_path_buf(),
            outcome: WriteOutcome::SkippedExisting,
        }
    }
}

/// Reads a UTF-8 text artifact.
///
/// # Errors
/// Returns [`CliError::Io`] naming `path` when the read fails.
pub fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::io(path, source))
}

/// Creates `dir` and any missing parents.
///
/// # Errors
/// Returns [`CliError::Io`] naming `dir` when creation fails.
pub fn ensure_dir(dir: &Path) -> Result<(), CliError> {
    fs::create_dir_all(dir).map_err(|source| CliError::io(dir, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use tempfile::TempDir;
    use topogrid_test_support::tracing::capture;
    use tracing::Level;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[rstest]
    fn existing_file_is_kept_without_overwrite() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("graph.mat");
        fs::write(&path, "old")?;
        let writer = ArtifactWriter::new(false);
        assert!(writer.would_skip(&path));
        let (record, layer) = capture(|| writer.write(&path, "new"));
        assert_eq!(record?.outcome, WriteOutcome::SkippedExisting);
        assert_eq!(fs::read_to_string(&path)?, "old");
        assert_eq!(layer.events_at(Level::WARN).len(), 1);
        Ok(())
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn new_file_is_written(#[case] overwrite: bool) -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("graph.csv");
        let record = ArtifactWriter::new(overwrite).write(&path, "from,to\n")?;
        assert_eq!(record.outcome, WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path)?, "from,to\n");
        Ok(())
    }

    #[rstest]
    fn overwrite_replaces_contents() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("graph.mat");
        fs::write(&path, "a much longer previous body")?;
        let writer = ArtifactWriter::new(true);
        assert!(!writer.would_skip(&path));
        writer.write(&path, "0\n")?;
        assert_eq!(fs::read_to_string(&path)?, "0\n");
        Ok(())
    }

    #[rstest]
    fn missing_parent_reports_path() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("absent").join("graph.mat");
        let err = ArtifactWriter::new(false)
            .write(&path, "0\n")
            .expect_err("parent does not exist");
        assert!(matches!(&err, CliError::Io { path: failed, .. } if failed == &path));
        Ok(())
    }

    #[rstest]
    fn failed_write_leaves_no_partial_file() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("graph.mat");
        let writer = ArtifactWriter::new(false);
        let err = writer
            .write_with(&path, |out| {
                out.write_all(b"0,1\n")?;
                Err(io::Error::other("device full"))
            })
            .expect_err("render fails midway");
        assert!(matches!(&err, CliError::Io { path: failed, .. } if failed == &path));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);

        let record = writer.write(&path, "0,1\n1,0\n")?;
        assert_eq!(record.outcome, WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path)?, "0,1\n1,0\n");
        Ok(())
    }
}
