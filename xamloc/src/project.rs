//! Batch uid management across a project's markup files.
//!
//! The filesystem sits behind [`ProjectSource`] so the batch logic can be
//! exercised against an in-memory tree, and callers can report progress and
//! cancel between files.

use std::path::{Path, PathBuf};

use crate::{
    error::Error,
    policy::LocalizabilityPolicy,
    rewriter::{RewriteMode, rewrite},
    scanner::scan,
    settings::UidGenerationMode,
};

/// Where markup files come from and how they are written back.
pub trait ProjectSource {
    /// Every markup file the batch should visit, in a stable order.
    fn markup_files(&self) -> Result<Vec<PathBuf>, Error>;

    fn read_text(&self, file: &Path) -> Result<String, Error>;

    fn write_text(&self, file: &Path, content: &str) -> Result<(), Error>;

    /// Called before writing; a source backed by version control or
    /// read-only checkouts makes the file writable here.
    fn ensure_writable(&self, file: &Path) -> Result<(), Error>;
}

/// Receives per-file progress while a batch runs.
pub trait ProgressSink {
    fn report(&mut self, current: usize, total: usize, description: &str);
}

/// Swallows all progress reports.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _current: usize, _total: usize, _description: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidOperation {
    /// Report each file's uid health without touching it.
    Check,
    /// Fill in missing uids and rename duplicates.
    Assign,
    /// Strip every uid.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Every localizable element already carries a unique uid.
    Valid,
    /// Check found problems and left the file alone.
    NeedsAttention { absent: usize, duplicate: usize },
    /// The file was rewritten.
    Updated,
    /// The file could not be processed; the batch moved on.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
    pub cancelled: bool,
}

impl BatchSummary {
    /// True when no file failed and none needs attention.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|outcome| {
            matches!(outcome.status, FileStatus::Valid | FileStatus::Updated)
        })
    }
}

/// Runs `operation` over every markup file of `source`. Cancellation is
/// polled between files; files already processed keep their outcome. An
/// internal error aborts the whole batch, any other per-file error is
/// recorded as [`FileStatus::Failed`] and the batch continues.
pub fn manage_uids(
    source: &dyn ProjectSource,
    policy: &LocalizabilityPolicy,
    operation: UidOperation,
    mode: UidGenerationMode,
    progress: &mut dyn ProgressSink,
    cancel: &dyn Fn() -> bool,
) -> Result<BatchSummary, Error> {
    let files = source.markup_files()?;
    let total = files.len();
    let mut summary = BatchSummary::default();

    for (index, file) in files.into_iter().enumerate() {
        if cancel() {
            summary.cancelled = true;
            break;
        }
        progress.report(index + 1, total, &file.display().to_string());

        let status = match process_file(source, policy, operation, mode, &file) {
            Ok(status) => status,
            Err(error @ Error::Internal(_)) => return Err(error),
            Err(error) => FileStatus::Failed(error.to_string()),
        };
        summary.outcomes.push(FileOutcome { file, status });
    }
    Ok(summary)
}

fn process_file(
    source: &dyn ProjectSource,
    policy: &LocalizabilityPolicy,
    operation: UidOperation,
    mode: UidGenerationMode,
    file: &Path,
) -> Result<FileStatus, Error> {
    let content = source.read_text(file)?;
    let mut collector = scan(&content, policy)?;

    match operation {
        UidOperation::Check => {
            if collector.all_are_valid() {
                Ok(FileStatus::Valid)
            } else {
                let (mut absent, mut duplicate) = (0, 0);
                for record in collector.records() {
                    match record.status {
                        crate::uid::UidStatus::Absent => absent += 1,
                        crate::uid::UidStatus::Duplicate => duplicate += 1,
                        _ => {}
                    }
                }
                Ok(FileStatus::NeedsAttention { absent, duplicate })
            }
        }
        UidOperation::Assign => {
            if !collector.has_uid_errors() {
                return Ok(FileStatus::Valid);
            }
            collector.resolve_uid_errors(mode)?;
            let rewritten = rewrite(&content, &collector, RewriteMode::Assign)?;
            source.ensure_writable(file)?;
            source.write_text(file, &rewritten)?;
            Ok(FileStatus::Updated)
        }
        UidOperation::Remove => {
            if collector.is_empty() || collector.all_are_absent() {
                return Ok(FileStatus::Valid);
            }
            let rewritten = rewrite(&content, &collector, RewriteMode::Remove)?;
            source.ensure_writable(file)?;
            source.write_text(file, &rewritten)?;
            Ok(FileStatus::Updated)
        }
    }
}
