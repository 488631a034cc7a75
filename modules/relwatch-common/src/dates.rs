//! Date normalization for the shapes news sites print dates in.
//!
//! Nothing here fails loudly: an unparseable or out-of-range date is `None`,
//! which callers treat as "unknown date".

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RelwatchError;
use crate::lexicon::fold;

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:\b|T)").expect("valid regex"));
static DAY_FIRST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4})\b").expect("valid regex"));
static DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("valid regex"));
static SLASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"));
static DASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b").expect("valid regex"));
static MONTH_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\s+(\p{L}+)\.?,?\s+(\d{4})\b").expect("valid regex"));

/// Month names keyed by their folded spelling. Turkish first, English after.
const MONTH_NAMES: &[(&str, u32)] = &[
    ("ocak", 1),
    ("şubat", 2),
    ("mart", 3),
    ("nisan", 4),
    ("mayıs", 5),
    ("haziran", 6),
    ("temmuz", 7),
    ("ağustos", 8),
    ("eylül", 9),
    ("ekim", 10),
    ("kasım", 11),
    ("aralık", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// A source's declared date layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "DD.MM.YYYY")]
    DayMonthYearDotted,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYearSlashed,
    #[serde(rename = "DD-MM-YYYY")]
    DayMonthYearDashed,
    #[serde(rename = "YYYY-MM-DD")]
    Iso,
}

impl DateFormat {
    fn pattern(self) -> &'static Regex {
        match self {
            DateFormat::DayMonthYearDotted => &DOTTED_RE,
            DateFormat::DayMonthYearSlashed => &SLASHED_RE,
            DateFormat::DayMonthYearDashed => &DASHED_RE,
            DateFormat::Iso => &ISO_RE,
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DateFormat::DayMonthYearDotted => "DD.MM.YYYY",
            DateFormat::DayMonthYearSlashed => "DD/MM/YYYY",
            DateFormat::DayMonthYearDashed => "DD-MM-YYYY",
            DateFormat::Iso => "YYYY-MM-DD",
        };
        f.write_str(s)
    }
}

impl FromStr for DateFormat {
    type Err = RelwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DD.MM.YYYY" => Ok(DateFormat::DayMonthYearDotted),
            "DD/MM/YYYY" => Ok(DateFormat::DayMonthYearSlashed),
            "DD-MM-YYYY" => Ok(DateFormat::DayMonthYearDashed),
            "YYYY-MM-DD" => Ok(DateFormat::Iso),
            other => Err(RelwatchError::Config(format!("unsupported date format '{other}'"))),
        }
    }
}

/// Normalize `raw` to a calendar date.
///
/// Tried in order: the `hint` layout, ISO, day-first numeric (`.`, `/` or
/// `-` separated), then day + month name + year.
pub fn normalize(raw: &str, hint: Option<DateFormat>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(format) = hint {
        if let Some(date) = match_numeric(format.pattern(), raw, format == DateFormat::Iso) {
            return Some(date);
        }
    }

    match_numeric(&ISO_RE, raw, true)
        .or_else(|| match_numeric(&DAY_FIRST_RE, raw, false))
        .or_else(|| match_month_name(raw))
}

/// Find the first date embedded in free text (article bodies, markdown).
/// Day-first shapes win over ISO, the way news copy is usually written.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    if text.trim().is_empty() {
        return None;
    }
    match_numeric(&DOTTED_RE, text, false)
        .or_else(|| match_numeric(&SLASHED_RE, text, false))
        .or_else(|| match_numeric(&DASHED_RE, text, false))
        .or_else(|| match_month_name(text))
        .or_else(|| match_numeric(&ISO_RE, text, true))
}

/// Parse and validate a strict `YYYY-MM-DD` string, for user-supplied bounds.
pub fn parse_iso(raw: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| RelwatchError::InvalidDate(raw.to_string()))
}

fn match_numeric(re: &Regex, text: &str, year_first: bool) -> Option<NaiveDate> {
    re.captures_iter(text).find_map(|caps| {
        let a: u32 = caps[1].parse().ok()?;
        let b: u32 = caps[2].parse().ok()?;
        let c: u32 = caps[3].parse().ok()?;
        if year_first {
            NaiveDate::from_ymd_opt(a as i32, b, c)
        } else {
            NaiveDate::from_ymd_opt(c as i32, b, a)
        }
    })
}

fn match_month_name(text: &str) -> Option<NaiveDate> {
    MONTH_NAME_RE.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn month_number(name: &str) -> Option<u32> {
    let folded = fold(name);
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| fold(candidate) == folded)
        .map(|(_, n)| *n)
}
