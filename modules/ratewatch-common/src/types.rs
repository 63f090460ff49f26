use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RatewatchError;

// --- Agency ---

/// Rating agencies recognised in announcement text. `Unknown` renders as `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agency {
    #[serde(rename = "Fitch Ratings")]
    FitchRatings,
    #[serde(rename = "Moody's")]
    Moodys,
    #[serde(rename = "S&P Global Ratings")]
    SpGlobal,
    #[serde(rename = "DBRS Morningstar")]
    DbrsMorningstar,
    #[serde(rename = "KBRA")]
    Kbra,
    #[serde(rename = "A.M. Best")]
    AmBest,
    #[serde(rename = "Scope Ratings")]
    ScopeRatings,
    #[serde(rename = "-")]
    Unknown,
}

impl Agency {
    pub fn label(&self) -> &'static str {
        match self {
            Agency::FitchRatings => "Fitch Ratings",
            Agency::Moodys => "Moody's",
            Agency::SpGlobal => "S&P Global Ratings",
            Agency::DbrsMorningstar => "DBRS Morningstar",
            Agency::Kbra => "KBRA",
            Agency::AmBest => "A.M. Best",
            Agency::ScopeRatings => "Scope Ratings",
            Agency::Unknown => "-",
        }
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- RatingAction ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingAction {
    Affirmed,
    Upgrade,
    Downgrade,
    NewRating,
    Other,
}

impl fmt::Display for RatingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RatingAction::Affirmed => "Affirmed",
            RatingAction::Upgrade => "Upgrade",
            RatingAction::Downgrade => "Downgrade",
            RatingAction::NewRating => "NewRating",
            RatingAction::Other => "Other",
        };
        f.write_str(s)
    }
}

// --- Outlook ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outlook {
    Stable,
    Positive,
    Negative,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outlook::Stable => "Stable",
            Outlook::Positive => "Positive",
            Outlook::Negative => "Negative",
        };
        f.write_str(s)
    }
}

impl FromStr for Outlook {
    type Err = RatewatchError;

    /// Accepts the Portuguese vocabulary used in announcements as well as the
    /// English names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estável" | "estavel" | "stable" => Ok(Outlook::Stable),
            "positiva" | "positivo" | "positive" => Ok(Outlook::Positive),
            "negativa" | "negativo" | "negative" => Ok(Outlook::Negative),
            _ => Err(RatewatchError::InvalidOutlook(s.to_string())),
        }
    }
}

// --- RatingGrade ---

static GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:AAA|AA|A|BBB|BB|B|CCC|CC|C)[+-]?\(bra\)$").expect("valid regex")
});

/// A national-scale grade such as `AA+(bra)`. Only obtainable through
/// [`RatingGrade::parse`], so every value matches the grade grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingGrade(String);

impl RatingGrade {
    pub fn parse(token: &str) -> Result<Self, RatewatchError> {
        let token = token.trim();
        if GRADE_RE.is_match(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(RatewatchError::InvalidGrade(token.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RatingGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RatingGrade {
    type Err = RatewatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// --- RatingActionRecord ---

/// One harvested rating action. Field names on the wire match the report
/// contract; unknown grades and outlooks are written as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingActionRecord {
    pub agency: Agency,
    pub company: String,
    #[serde(with = "empty_as_none")]
    pub rating_previous: Option<RatingGrade>,
    #[serde(with = "empty_as_none")]
    pub rating_current: Option<RatingGrade>,
    #[serde(with = "empty_as_none")]
    pub outlook_previous: Option<Outlook>,
    #[serde(with = "empty_as_none")]
    pub outlook_current: Option<Outlook>,
    pub action: RatingAction,
    pub date: String,
    pub link: String,
}

/// Semantic identity of a record within one run: two detail pages describing
/// the same event share this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub company: String,
    pub rating_current: Option<RatingGrade>,
    pub action: RatingAction,
}

impl RatingActionRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            company: self.company.clone(),
            rating_current: self.rating_current.clone(),
            action: self.action,
        }
    }

    pub fn has_company(&self) -> bool {
        !self.company.trim().is_empty()
    }
}

/// Serde adapter writing `None` as `""` and reading blank strings back as `None`.
mod empty_as_none {
    use super::*;

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: fmt::Display,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
