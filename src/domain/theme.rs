//! Themes: clusters of contracts that express the same underlying question.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::alert::Alert;
use super::classification::AlertClassification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKind {
    PriceBand,
    IntradayDirection,
    Matchup,
    Generic,
}

impl ThemeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceBand => "price_band",
            Self::IntradayDirection => "intraday_direction",
            Self::Matchup => "matchup",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing one contract title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    /// Deterministic grouping key.
    pub key: String,
    pub label: String,
    /// Contract-specific short title shown under the theme (e.g. `Above 100k`).
    pub short_title: String,
    pub kind: ThemeKind,
}

/// An alert together with its (optional) classification and parsed theme.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMember {
    pub alert: Alert,
    pub classification: Option<AlertClassification>,
    pub theme: ThemeInfo,
}

/// A group of alerts sharing one theme key.
///
/// `members` is never empty and is ordered so that `members[0]` is the
/// representative.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub key: String,
    pub label: String,
    pub kind: ThemeKind,
    pub members: Vec<ThemeMember>,
}

impl Theme {
    /// The representative member.
    #[must_use]
    pub fn representative(&self) -> &ThemeMember {
        &self.members[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
