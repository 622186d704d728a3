//! Encoded line-by-line reading of clippings sources

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Strict UTF-8; invalid bytes fail the whole operation.
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-8-lossy" | "utf8-lossy" => Some(Self::Utf8Lossy),
            "latin1" | "latin-1" | "iso-8859-1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Lossy => "utf-8-lossy",
            Self::Latin1 => "latin1",
        }
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<String, EngineError> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(|s| s.to_string())
                .map_err(|e| EngineError::unreadable(path, format!("invalid UTF-8: {e}"))),
            Self::Utf8Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Streams decoded lines from a clippings file without loading it whole.
/// The reader owns its file handle and drops it at end of scope on every
/// exit path, including decode errors.
pub struct SourceLines {
    reader: BufReader<File>,
    encoding: TextEncoding,
    path: PathBuf,
    first: bool,
}

impl SourceLines {
    pub fn open(path: &Path, encoding: TextEncoding) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::unreadable(path, e))?;
        Ok(Self {
            reader: BufReader::new(file),
            encoding,
            path: path.to_path_buf(),
            first: true,
        })
    }
}

impl Iterator for SourceLines {
    type Item = Result<String, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                }
                if buf.ends_with(b"\r") {
                    buf.pop();
                }
                let mut line = match self.encoding.decode(&buf, &self.path) {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e)),
                };
                if self.first {
                    self.first = false;
                    if let Some(stripped) = line.strip_prefix('\u{feff}') {
                        line = stripped.to_string();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(EngineError::unreadable(&self.path, e))),
        }
    }
}

/// Splits already-resident content into the same line sequence that
/// `SourceLines` produces for the equivalent file.
pub fn content_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines().map(|l| l.to_string())
}
