//! Date and time-of-day tokens parsed out of titles.

use std::sync::OnceLock;

use regex::Regex;

/// Key used when a title carries no recognisable date.
pub const UNKNOWN_DATE: &str = "unknown-date";

const MONTHS: &[(&str, &str, &str)] = &[
    ("jan", "jan", "Jan"),
    ("feb", "feb", "Feb"),
    ("mar", "mar", "Mar"),
    ("apr", "apr", "Apr"),
    ("may", "may", "May"),
    ("jun", "jun", "Jun"),
    ("jul", "jul", "Jul"),
    ("aug", "aug", "Aug"),
    ("sep", "sep", "Sep"),
    ("oct", "oct", "Oct"),
    ("nov", "nov", "Nov"),
    ("dec", "dec", "Dec"),
];

/// A parsed date: a stable key fragment and an optional display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    pub key: String,
    pub label: Option<String>,
}

impl DateToken {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            key: UNKNOWN_DATE.to_string(),
            label: None,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.key != UNKNOWN_DATE
    }
}

/// A parsed time of day such as `3:30 PM ET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeToken {
    pub key: String,
    pub label: String,
}

fn month_day_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?",
        )
        .expect("month/day pattern is valid")
    })
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date pattern is valid"))
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b(?:\s*(et|est|edt|ct|cst|cdt|pt|pst|pdt|utc)\b)?")
            .expect("time pattern is valid")
    })
}

/// Find a `month day [year]` date in folded text.
#[must_use]
pub fn parse_month_day(folded: &str) -> Option<DateToken> {
    let caps = month_day_regex().captures(folded)?;
    let month_word = caps.get(1)?.as_str();
    let (_, month_key, month_label) = MONTHS
        .iter()
        .find(|(prefix, _, _)| month_word.starts_with(prefix))?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }

    match caps.get(3) {
        Some(year) => Some(DateToken {
            key: format!("{month_key}-{day}-{}", year.as_str()),
            label: Some(format!("{month_label} {day}, {}", year.as_str())),
        }),
        None => Some(DateToken {
            key: format!("{month_key}-{day}"),
            label: Some(format!("{month_label} {day}")),
        }),
    }
}

/// True for month names and their abbreviations.
#[must_use]
pub fn is_month_word(token: &str) -> bool {
    month_day_regex().is_match(&format!("{token} 1"))
}

/// Find a `YYYY-MM-DD` date, used as a fallback from category or slug.
#[must_use]
pub fn parse_iso_date(text: &str) -> Option<DateToken> {
    let found = iso_date_regex().find(text)?;
    Some(DateToken {
        key: found.as_str().to_string(),
        label: Some(found.as_str().to_string()),
    })
}

/// Find an `h[:mm] am|pm [tz]` time of day in folded text.
#[must_use]
pub fn parse_time(folded: &str) -> Option<TimeToken> {
    let caps = time_regex().captures(folded)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let minutes = caps.get(2).map(|m| m.as_str());
    let meridiem = caps.get(3)?.as_str();
    let zone = caps.get(4).map(|z| canonical_zone(z.as_str()));

    let (mut key, mut label) = match minutes {
        Some(mm) if mm != "00" => (
            format!("{hour}-{mm}{meridiem}"),
            format!("{hour}:{mm}{}", meridiem.to_ascii_uppercase()),
        ),
        _ => (
            format!("{hour}{meridiem}"),
            format!("{hour}{}", meridiem.to_ascii_uppercase()),
        ),
    };
    if let Some(zone) = zone {
        key.push('-');
        key.push_str(zone);
        label.push(' ');
        label.push_str(&zone.to_ascii_uppercase());
    }

    Some(TimeToken { key, label })
}

fn canonical_zone(zone: &str) -> &'static str {
    match zone {
        "et" | "est" | "edt" => "et",
        "ct" | "cst" | "cdt" => "ct",
        "pt" | "pst" | "pdt" => "pt",
        _ => "utc",
    }
}
