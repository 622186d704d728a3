//! Immutable parse summaries

use serde::Serialize;

use crate::error::EngineError;

/// Aggregate outcome of one parse. Constructed once from the parser's raw
/// counts and validated, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    /// Every separator-terminated entry encountered, valid or not.
    pub clipping_count: usize,
    /// Valid records actually emitted.
    pub database_entries: usize,
    /// Entries discarded as malformed or empty.
    pub removed_clippings: usize,
}

impl ParseResult {
    pub fn new(
        clipping_count: usize,
        database_entries: usize,
        removed_clippings: usize,
    ) -> Result<Self, EngineError> {
        if database_entries + removed_clippings != clipping_count {
            return Err(EngineError::InconsistentResult {
                clipping_count,
                database_entries,
                removed_clippings,
            });
        }
        Ok(Self {
            clipping_count,
            database_entries,
            removed_clippings,
        })
    }

    pub fn empty() -> Self {
        Self {
            clipping_count: 0,
            database_entries: 0,
            removed_clippings: 0,
        }
    }
}

impl std::fmt::Display for ParseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} parsed, {} kept, {} removed",
            self.clipping_count, self.database_entries, self.removed_clippings
        )
    }
}
