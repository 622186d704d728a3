//! Bounded file previews for language detection and verification

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::cli::PreviewArgs;
use crate::config::Config;
use crate::error::EngineError;
use crate::source::{SourceLines, TextEncoding};

/// The first lines of a clippings file. Built once, read-only, discarded
/// after a locale decision is made.
#[derive(Debug, Clone)]
pub struct Preview {
    lines: Vec<String>,
}

impl Preview {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

/// Reads at most `max_lines` lines from the source. Never loads the whole
/// file, so previews of large exports stay cheap.
pub fn generate_preview(
    path: &Path,
    encoding: TextEncoding,
    max_lines: usize,
) -> Result<Preview, EngineError> {
    let mut lines = Vec::new();
    for line in SourceLines::open(path, encoding)? {
        lines.push(line?);
        if lines.len() >= max_lines {
            break;
        }
    }
    Ok(Preview::from_lines(lines))
}

pub fn run(args: PreviewArgs) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();

    let encoding = resolve_encoding(args.encoding.as_deref(), &cfg)?;
    let max_lines = args.lines.unwrap_or(cfg.general.preview_max_lines);

    let preview = generate_preview(&args.input, encoding, max_lines)?;

    println!(
        "{}",
        format!("[Preview] {} ({} lines max)", args.input.display(), max_lines).green()
    );

    if preview.is_empty() {
        println!("{}", "[WARN] File is empty".yellow());
        return Ok(());
    }

    for line in preview.lines() {
        println!("{line}");
    }

    Ok(())
}

/// CLI arg wins over config; both fall back to strict UTF-8.
pub fn resolve_encoding(arg: Option<&str>, cfg: &Config) -> Result<TextEncoding> {
    let name = arg.unwrap_or(&cfg.general.encoding);
    TextEncoding::from_name(name).context(format!(
        "Unknown encoding '{name}' (supported: utf-8, utf-8-lossy, latin1)"
    ))
}
