//! Engine error taxonomy

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The source path is missing, not permitted, or does not decode
    /// under the configured encoding.
    #[error("cannot read source {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// A full parse was requested before a locale was selected.
    #[error("no language selected; detect or set a locale before parsing")]
    LocaleNotSelected,

    /// Parse counts do not add up. Signals an internal bug, not a bad file.
    #[error(
        "inconsistent parse result: {clipping_count} counted, {database_entries} emitted, {removed_clippings} removed"
    )]
    InconsistentResult {
        clipping_count: usize,
        database_entries: usize,
        removed_clippings: usize,
    },
}

impl EngineError {
    pub fn unreadable(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
