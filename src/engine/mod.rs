//! Engine facade: the single boundary every front end drives
//!
//! Synchronous and single-threaded. One parse per engine instance at a time;
//! callers needing concurrency use independent instances and do their own
//! offloading.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::locale::{self, Detection, Locale};
use crate::parse::{ClippingParser, ParseOutcome};
use crate::preview::{self, Preview};
use crate::report::ParseResult;
use crate::source::TextEncoding;

pub const DEFAULT_PREVIEW_LINES: usize = 40;

#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub source_path: Option<PathBuf>,
    pub encoding: TextEncoding,
    pub locale: Option<Locale>,
    pub preview_max_lines: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            source_path: None,
            encoding: TextEncoding::default(),
            locale: None,
            preview_max_lines: DEFAULT_PREVIEW_LINES,
        }
    }
}

pub struct ParserEngine {
    pub options: ParserOptions,
    last_result: Option<ParseResult>,
}

impl ParserEngine {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            last_result: None,
        }
    }

    pub fn generate_preview(&self, path: &Path) -> Result<Preview, EngineError> {
        preview::generate_preview(path, self.options.encoding, self.options.preview_max_lines)
    }

    pub fn detect_language(&self, preview: &Preview) -> Detection {
        locale::detect_language(preview)
    }

    pub fn verify_compatibility(
        &self,
        locale: Locale,
        sample: Option<&str>,
        preview: &Preview,
    ) -> bool {
        locale::verify_compatibility(locale, sample, preview)
    }

    pub fn parse_from_path(&mut self, path: &Path) -> Result<ParseOutcome, EngineError> {
        let parser = self.parser()?;
        let outcome = parser.parse_path(path, self.options.encoding)?;
        self.options.source_path = Some(path.to_path_buf());
        self.last_result = Some(outcome.result);
        Ok(outcome)
    }

    /// In-memory twin of `parse_from_path`, for callers that already hold
    /// the content (a web shell posting the file body, tests).
    #[allow(dead_code)]
    pub fn parse_from_content(&mut self, text: &str) -> Result<ParseOutcome, EngineError> {
        let parser = self.parser()?;
        let outcome = parser.parse_content(text)?;
        self.last_result = Some(outcome.result);
        Ok(outcome)
    }

    /// Summary of the most recent parse, if any.
    pub fn report_result(&self) -> Option<ParseResult> {
        self.last_result
    }

    fn parser(&self) -> Result<ClippingParser, EngineError> {
        let locale = self.options.locale.ok_or(EngineError::LocaleNotSelected)?;
        Ok(ClippingParser::new(locale))
    }
}
