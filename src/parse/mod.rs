//! Clipping parsing: splits an export into entries and emits typed records
//!
//! Entries are separated by a fixed repeated-character line (locale
//! independent). Each entry is a title line, a locale-specific header and a
//! note body. Malformed entries are counted and dropped, never fatal.

pub mod store;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::cli::ParseArgs;
use crate::config::Config;
use crate::engine::{ParserEngine, ParserOptions};
use crate::error::EngineError;
use crate::locale::{Locale, LocaleGrammar};
use crate::preview;
use crate::report::ParseResult;
use crate::source::{SourceLines, TextEncoding, content_lines};
use store::ClippingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClippingKind {
    Highlight,
    Note,
    Bookmark,
}

impl std::fmt::Display for ClippingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Highlight => f.write_str("highlight"),
            Self::Note => f.write_str("note"),
            Self::Bookmark => f.write_str("bookmark"),
        }
    }
}

/// One valid clipping. Invalid entries are never materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClippingRecord {
    pub title: String,
    pub author: Option<String>,
    pub location: String,
    pub added_on: Option<NaiveDateTime>,
    pub note_text: String,
    pub kind: ClippingKind,
}

/// Records plus the aggregate counts they came with.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub records: Vec<ClippingRecord>,
    pub result: ParseResult,
}

/// A separator is a run of one repeated non-alphanumeric character
/// (`==========` in every known export).
fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) if !first.is_alphanumeric() => {
            trimmed.chars().count() >= 5 && chars.all(|c| c == first)
        }
        _ => false,
    }
}

pub struct ClippingParser {
    grammar: LocaleGrammar,
}

impl ClippingParser {
    pub fn new(locale: Locale) -> Self {
        Self {
            grammar: locale.grammar(),
        }
    }

    /// Streams the file line by line; the whole export is never resident.
    pub fn parse_path(&self, path: &Path, encoding: TextEncoding) -> Result<ParseOutcome, EngineError> {
        self.parse_lines(SourceLines::open(path, encoding)?)
    }

    /// Same semantics as `parse_path` for already-resident content; the two
    /// must produce identical records for identical content.
    pub fn parse_content(&self, text: &str) -> Result<ParseOutcome, EngineError> {
        self.parse_lines(content_lines(text).map(Ok))
    }

    fn parse_lines<I>(&self, lines: I) -> Result<ParseOutcome, EngineError>
    where
        I: IntoIterator<Item = Result<String, EngineError>>,
    {
        let mut records = Vec::new();
        let mut clipping_count = 0usize;
        let mut removed = 0usize;
        let mut block: Vec<String> = Vec::new();

        for line in lines {
            let line = line?;
            if !is_separator(&line) {
                block.push(line);
                continue;
            }
            // Only separator-terminated blocks count as entries.
            if block.iter().any(|l| !l.trim().is_empty()) {
                clipping_count += 1;
                match self.parse_entry(&block) {
                    Some(record) => records.push(record),
                    None => {
                        removed += 1;
                        tracing::debug!(entry = clipping_count, "discarded malformed or empty entry");
                    }
                }
            }
            block.clear();
        }

        // A block without a terminating separator is a truncated fragment,
        // not an entry.
        if block.iter().any(|l| !l.trim().is_empty()) {
            tracing::debug!(lines = block.len(), "ignoring trailing fragment");
        }

        let result = ParseResult::new(clipping_count, records.len(), removed)?;
        Ok(ParseOutcome { records, result })
    }

    fn parse_entry(&self, block: &[String]) -> Option<ClippingRecord> {
        let (header_idx, fields) = block
            .iter()
            .enumerate()
            .find_map(|(i, line)| self.grammar.parse_header(line).map(|f| (i, f)))?;

        let title_line = block[..header_idx]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("");
        let (title, author) = split_title_author(title_line);
        let note_text = block[header_idx + 1..].join("\n").trim().to_string();

        // Bookmarks carry no text by design; a location token is enough.
        let bookmark = fields.kind == ClippingKind::Bookmark && !fields.location.is_empty();
        if title.is_empty() && note_text.is_empty() && !bookmark {
            return None;
        }

        Some(ClippingRecord {
            title,
            author,
            location: fields.location,
            added_on: fields.timestamp,
            note_text,
            kind: fields.kind,
        })
    }
}

/// "Title (Author)" with the author in the last parenthetical; titles with
/// their own parentheses keep them.
fn split_title_author(line: &str) -> (String, Option<String>) {
    let line = line.trim();
    if let Some(stripped) = line.strip_suffix(')') {
        if let Some((title, author)) = stripped.rsplit_once('(') {
            let title = title.trim();
            let author = author.trim();
            if !title.is_empty() && !author.is_empty() {
                return (title.to_string(), Some(author.to_string()));
            }
        }
    }
    (line.to_string(), None)
}

pub fn run(args: ParseArgs) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();

    let encoding = preview::resolve_encoding(args.encoding.as_deref(), &cfg)?;
    let mut engine = ParserEngine::new(ParserOptions {
        source_path: Some(args.input.clone()),
        encoding,
        locale: None,
        preview_max_lines: cfg.general.preview_max_lines,
    });

    let preview = engine.generate_preview(&args.input)?;

    let locale = match args.lang.as_deref().or(cfg.general.language.as_deref()) {
        Some(name) => Locale::from_name(name).context(format!(
            "Unknown language '{name}' (supported: english, spanish)"
        ))?,
        None => match engine.detect_language(&preview).locale {
            Some(locale) => {
                println!("{}", format!("[Detect] Language: {locale}").cyan());
                locale
            }
            None => anyhow::bail!(
                "Could not detect the file language; pass --lang english or --lang spanish"
            ),
        },
    };
    engine.options.locale = Some(locale);

    if !engine.verify_compatibility(locale, None, &preview) {
        if args.force {
            tracing::warn!(%locale, "compatibility check failed, parsing anyway");
            println!(
                "{}",
                format!("[WARN] File does not look like {locale} clippings; continuing (--force)")
                    .yellow()
            );
        } else {
            anyhow::bail!(
                "File does not look like {} clippings. Select the correct language with --lang, \
                 or use --force to parse anyway.",
                locale
            );
        }
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Parsing {}", args.input.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = engine.parse_from_path(&args.input)?;

    pb.finish_and_clear();

    if let Some(source) = engine.options.source_path.as_deref() {
        tracing::debug!(source = %source.display(), "parse finished");
    }

    let result = engine.report_result().unwrap_or_else(ParseResult::empty);
    println!(
        "{}",
        format!("[Parse] {} clippings parsed", result.clipping_count).green()
    );

    let database = args
        .database
        .clone()
        .or_else(|| cfg.storage.database_path.clone().map(PathBuf::from));

    if let Some(db_path) = database {
        let mut store = ClippingStore::open(&db_path)?;
        let stored = store.insert_all(&outcome.records)?;
        println!(
            "{}",
            format!(
                "[OK] {stored} clippings added to database, {} empty or malformed clippings removed",
                result.removed_clippings
            )
            .green()
        );
        println!("  Database: {}", db_path.display());
    } else {
        println!(
            "{}",
            format!(
                "[OK] {} valid clippings, {} empty or malformed clippings removed",
                result.database_entries, result.removed_clippings
            )
            .green()
        );
    }

    if let Some(json_path) = &args.json {
        let file = File::create(json_path)
            .context(format!("Failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &outcome.records)
            .context("Failed to write JSON output")?;
        println!("  JSON: {}", json_path.display());
    }

    if result.database_entries == 0 {
        println!(
            "{}",
            "[WARN] No valid clippings found; check the file and selected language".yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SEPARATOR: &str = "==========";

    fn entry(title: &str, header: &str, note: &str) -> String {
        format!("{title}\n{header}\n\n{note}\n{SEPARATOR}\n")
    }

    fn english_header(n: u32) -> String {
        format!("- Your Highlight on page {n} | Location {n}0-{n}5 | Added on Friday, May 30, 2014 12:05:42 AM")
    }

    fn parser() -> ClippingParser {
        ClippingParser::new(Locale::English)
    }

    #[test]
    fn test_single_entry_parses_fully() {
        let content = entry(
            "The Stranger (Albert Camus)",
            &english_header(5),
            "Mother died today.",
        );
        let outcome = parser().parse_content(&content).unwrap();

        assert_eq!(outcome.result.clipping_count, 1);
        assert_eq!(outcome.result.database_entries, 1);
        assert_eq!(outcome.result.removed_clippings, 0);

        let record = &outcome.records[0];
        assert_eq!(record.title, "The Stranger");
        assert_eq!(record.author.as_deref(), Some("Albert Camus"));
        assert_eq!(record.location, "page 5 | Location 50-55");
        assert_eq!(record.note_text, "Mother died today.");
        assert_eq!(record.kind, ClippingKind::Highlight);
        assert!(record.added_on.is_some());
    }

    #[test]
    fn test_empty_middle_entry_is_removed() {
        let content = format!(
            "{}{}{}",
            entry("Book One (A)", &english_header(1), "First note."),
            entry("", &english_header(2), "   "),
            entry("Book Three (C)", &english_header(3), "Third note."),
        );
        let outcome = parser().parse_content(&content).unwrap();

        assert_eq!(outcome.result.clipping_count, 3);
        assert_eq!(outcome.result.database_entries, 2);
        assert_eq!(outcome.result.removed_clippings, 1);
        assert_eq!(outcome.records[0].title, "Book One");
        assert_eq!(outcome.records[1].title, "Book Three");
    }

    #[test]
    fn test_truncated_trailing_fragment_is_not_counted() {
        let content = format!(
            "{}{}Book Three (C)\n- Your High",
            entry("Book One (A)", &english_header(1), "First note."),
            entry("Book Two (B)", &english_header(2), "Second note."),
        );
        let outcome = parser().parse_content(&content).unwrap();

        assert_eq!(outcome.result.clipping_count, 2);
        assert_eq!(outcome.result.database_entries, 2);
        assert_eq!(outcome.result.removed_clippings, 0);
    }

    #[test]
    fn test_empty_source_yields_zero_counts() {
        let outcome = parser().parse_content("").unwrap();
        assert_eq!(outcome.result.clipping_count, 0);
        assert_eq!(outcome.result.database_entries, 0);
        assert_eq!(outcome.result.removed_clippings, 0);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_unparseable_header_is_removed() {
        let content = format!("Some Book (X)\nnot a header line\n\ntext\n{SEPARATOR}\n");
        let outcome = parser().parse_content(&content).unwrap();
        assert_eq!(outcome.result.clipping_count, 1);
        assert_eq!(outcome.result.database_entries, 0);
        assert_eq!(outcome.result.removed_clippings, 1);
    }

    #[test]
    fn test_bookmark_without_note_text_is_kept() {
        let content = format!(
            "Some Book (X)\n- Your Bookmark on page 40 | Added on Monday, December 2, 2013 10:35:42 PM\n\n{SEPARATOR}\n"
        );
        let outcome = parser().parse_content(&content).unwrap();
        assert_eq!(outcome.result.database_entries, 1);
        assert_eq!(outcome.records[0].kind, ClippingKind::Bookmark);
        assert!(outcome.records[0].note_text.is_empty());
    }

    #[test]
    fn test_empty_bookmark_title_still_valid_with_location() {
        let content = format!(
            "\n- Your Bookmark on page 40 | Added on Monday, December 2, 2013 10:35:42 PM\n\n{SEPARATOR}\n"
        );
        let outcome = parser().parse_content(&content).unwrap();
        assert_eq!(outcome.result.database_entries, 1);
        assert_eq!(outcome.result.removed_clippings, 0);
    }

    #[test]
    fn test_path_and_content_parse_identically() {
        let content = format!(
            "{}{}",
            entry("Book One (A)", &english_header(1), "First note.\nSecond line."),
            entry("", &english_header(2), ""),
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("My Clippings.txt");
        fs::write(&path, &content).unwrap();

        let parser = parser();
        let from_path = parser.parse_path(&path, TextEncoding::Utf8).unwrap();
        let from_content = parser.parse_content(&content).unwrap();

        assert_eq!(from_path.result, from_content.result);
        assert_eq!(from_path.records, from_content.records);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = entry("Book (A)", &english_header(7), "Same every time.");
        let parser = parser();
        let first = parser.parse_content(&content).unwrap();
        let second = parser.parse_content(&content).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.result, second.result);
    }

    #[test]
    fn test_spanish_entries_parse_with_spanish_grammar() {
        let content = format!(
            "El extranjero (Albert Camus)\n\
             - Mi subrayado en la página 5 | posición 64-65 | Añadido el viernes, 30 de mayo de 2014 22:19:57\n\
             \n\
             Hoy ha muerto mamá.\n\
             {SEPARATOR}\n"
        );
        let outcome = ClippingParser::new(Locale::Spanish)
            .parse_content(&content)
            .unwrap();
        assert_eq!(outcome.result.database_entries, 1);
        assert_eq!(outcome.records[0].title, "El extranjero");
        assert_eq!(outcome.records[0].author.as_deref(), Some("Albert Camus"));
    }

    #[test]
    fn test_whitespace_only_note_counts_as_empty() {
        let content = format!("\n{}\n\n   \n\t\n{SEPARATOR}\n", english_header(1));
        let outcome = parser().parse_content(&content).unwrap();
        assert_eq!(outcome.result.clipping_count, 1);
        assert_eq!(outcome.result.removed_clippings, 1);
    }

    #[test]
    fn test_separator_shape() {
        assert!(is_separator("=========="));
        assert!(is_separator("  ----------  "));
        assert!(!is_separator("====")); // too short
        assert!(!is_separator("==========x"));
        assert!(!is_separator("aaaaaaaaaa")); // alphanumeric runs are text
        assert!(!is_separator(""));
    }

    #[test]
    fn test_title_with_parentheses_keeps_inner_ones() {
        let (title, author) = split_title_author("Thinking (Fast and Slow) (Daniel Kahneman)");
        assert_eq!(title, "Thinking (Fast and Slow)");
        assert_eq!(author.as_deref(), Some("Daniel Kahneman"));

        let (title, author) = split_title_author("No Author Here");
        assert_eq!(title, "No Author Here");
        assert_eq!(author, None);
    }
}
