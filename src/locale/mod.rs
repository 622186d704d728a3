//! Locale grammars, language detection and compatibility verification
//!
//! Each supported locale carries a small set of literal marker substrings
//! taken from that locale's clipping headers. Detection counts marker hits
//! over a preview and picks the highest scorer; verification re-applies the
//! same rule restricted to one chosen locale as a second gate before a full
//! parse. Both are cheap heuristics, not language models.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use colored::Colorize;
use regex::Regex;

use crate::cli::DetectArgs;
use crate::config::Config;
use crate::parse::ClippingKind;
use crate::preview::{self, Preview};

/// Minimum marker hits for a locale to be considered compatible with a text.
const MIN_COMPAT_HITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    English,
    Spanish,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Spanish];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "english" | "en" | "en-us" | "en-gb" => Some(Self::English),
            "spanish" | "es" | "es-es" | "es-mx" => Some(Self::Spanish),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Spanish => "spanish",
        }
    }

    /// Literal substrings whose presence is evidence for this locale's
    /// clipping-header grammar.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::English => &[
                "Your Highlight",
                "Your Note",
                "Your Bookmark",
                "Added on",
                "| Location",
                "on page",
            ],
            Self::Spanish => &[
                "Mi subrayado",
                "Mi nota",
                "Mi marcador",
                "Añadido el",
                "posición",
                "la página",
            ],
        }
    }

    pub fn grammar(&self) -> LocaleGrammar {
        LocaleGrammar::new(*self)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields extracted from one clipping header line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFields {
    pub kind: ClippingKind,
    pub location: String,
    pub timestamp: Option<NaiveDateTime>,
}

/// Compiled header grammar for one locale.
pub struct LocaleGrammar {
    locale: Locale,
    header_re: Regex,
}

impl LocaleGrammar {
    pub fn new(locale: Locale) -> Self {
        let header_re = match locale {
            // "- Your Highlight on page 5 | Location 64-65 | Added on Friday, May 30, 2014 12:05:42 AM"
            // Older exports drop "Your" and the on/at connector ("- Highlight Loc. 330-31 | ...").
            Locale::English => Regex::new(
                r"(?i)^-\s*(?:your\s+)?(highlight|note|bookmark)(?:\s+(?:on|at))?\s+(.+?)\s*\|\s*added on\s+(.+)$",
            ),
            // "- Mi subrayado en la página 5 | posición 64-65 | Añadido el viernes, 30 de mayo de 2014 22:19:57"
            Locale::Spanish => Regex::new(
                r"(?i)^-\s*(?:(?:mi|tu)\s+)?(subrayado|nota|marcador)(?:\s+(?:en|de))?\s+(.+?)\s*\|\s*añadido el\s+(.+)$",
            ),
        }
        .expect("locale header pattern is valid");
        Self { locale, header_re }
    }

    /// Parses one entry header line. `None` means the line does not follow
    /// this locale's grammar at all.
    pub fn parse_header(&self, line: &str) -> Option<HeaderFields> {
        let caps = self.header_re.captures(line.trim())?;
        let kind = self.kind_from_word(&caps[1])?;
        let location = caps[2].trim().to_string();
        // An unparseable timestamp degrades to None, it never invalidates
        // the entry.
        let timestamp = self.parse_timestamp(caps[3].trim());
        Some(HeaderFields {
            kind,
            location,
            timestamp,
        })
    }

    fn kind_from_word(&self, word: &str) -> Option<ClippingKind> {
        match word.to_lowercase().as_str() {
            "highlight" | "subrayado" => Some(ClippingKind::Highlight),
            "note" | "nota" => Some(ClippingKind::Note),
            "bookmark" | "marcador" => Some(ClippingKind::Bookmark),
            _ => None,
        }
    }

    fn parse_timestamp(&self, text: &str) -> Option<NaiveDateTime> {
        match self.locale {
            Locale::English => {
                const FORMATS: &[&str] = &[
                    "%A, %B %d, %Y %I:%M:%S %p",
                    "%A, %d %B %y %H:%M:%S",
                    "%A, %d %B %Y %H:%M:%S",
                ];
                FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            }
            Locale::Spanish => parse_spanish_timestamp(text),
        }
    }
}

/// "viernes, 30 de mayo de 2014 22:19:57" — chrono has no Spanish month
/// names, so the date part is taken apart by hand.
fn parse_spanish_timestamp(text: &str) -> Option<NaiveDateTime> {
    let cleaned = text.replace(',', " ");
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

    // Leading weekday name, if any.
    if tokens
        .first()
        .is_some_and(|t| t.chars().all(|c| c.is_alphabetic()))
    {
        tokens.remove(0);
    }

    if tokens.len() < 6 || tokens[1] != "de" || tokens[3] != "de" {
        return None;
    }

    let day: u32 = tokens[0].parse().ok()?;
    let month = spanish_month(tokens[2])?;
    let year: i32 = tokens[4].parse().ok()?;
    let time = NaiveTime::parse_from_str(tokens[5], "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(tokens[5], "%H:%M"))
        .ok()?;

    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time))
}

fn spanish_month(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => return None,
    };
    Some(month)
}

/// Outcome of language detection. `locale: None` means Unknown: no locale's
/// markers were found, or the top scorers tied and guessing would be worse
/// than asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub locale: Option<Locale>,
    pub hits: usize,
}

pub fn marker_hits(text: &str, locale: Locale) -> usize {
    locale
        .markers()
        .iter()
        .map(|marker| text.matches(marker).count())
        .sum()
}

pub fn detect_language(preview: &Preview) -> Detection {
    let text = preview.text();
    let mut scores: Vec<(Locale, usize)> = Locale::ALL
        .iter()
        .map(|&locale| (locale, marker_hits(&text, locale)))
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let (best, hits) = scores[0];
    let runner_up = scores.get(1).map_or(0, |&(_, h)| h);

    if hits == 0 || hits == runner_up {
        Detection { locale: None, hits }
    } else {
        Detection {
            locale: Some(best),
            hits,
        }
    }
}

/// Second gate before a full parse: does the text look like `locale`'s
/// clippings format at all? Catches a user overriding the detected language
/// with the wrong one. The caller decides whether a `false` verdict blocks
/// the parse or is overridden.
pub fn verify_compatibility(locale: Locale, sample: Option<&str>, preview: &Preview) -> bool {
    let mut hits = marker_hits(&preview.text(), locale);
    if let Some(sample) = sample {
        hits += marker_hits(sample, locale);
    }
    hits >= MIN_COMPAT_HITS
}

pub fn run(args: DetectArgs) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();

    let encoding = preview::resolve_encoding(args.encoding.as_deref(), &cfg)?;
    let max_lines = args.lines.unwrap_or(cfg.general.preview_max_lines);

    let preview = preview::generate_preview(&args.input, encoding, max_lines)?;

    println!(
        "{}",
        format!("[Detect] {}", args.input.display()).green()
    );

    let text = preview.text();
    for locale in Locale::ALL {
        println!("  {}: {} marker hit(s)", locale, marker_hits(&text, locale));
    }

    match detect_language(&preview) {
        Detection {
            locale: Some(locale),
            hits,
        } => {
            println!(
                "{}",
                format!("[OK] Detected language: {locale} ({hits} hits)").green()
            );
        }
        Detection { locale: None, .. } => {
            println!(
                "{}",
                "[WARN] Language unknown; pass --lang to parse explicitly".yellow()
            );
        }
    }

    Ok(())
}
