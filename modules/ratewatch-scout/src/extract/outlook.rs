//! Outlook before and after the action.

use std::sync::LazyLock;

use regex::Regex;

use ratewatch_common::Outlook;

use super::{Chain, Strategy, Transition};

const VOCABULARY: &str = "estável|estavel|positiva|positivo|negativa|negativo|stable|positive|negative";

fn compile(pattern: &str) -> Regex {
    Regex::new(&pattern.replace("{vocab}", VOCABULARY)).expect("valid regex")
}

static FROM_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:de|from)\s+({vocab})\b"));

static TO_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:para|to)\s+({vocab})\b"));

static LABELLED_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:outlook|perspectiva|perspective).*?\b({vocab})\b"));

/// One outlook pattern; the first capture group is the outlook word.
pub struct OutlookPattern {
    name: &'static str,
    regex: &'static LazyLock<Regex>,
}

impl Strategy<str, Outlook> for OutlookPattern {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, text: &str) -> Option<Outlook> {
        let caps = self.regex.captures(text)?;
        caps[1].parse().ok()
    }
}

pub struct OutlookExtractor {
    previous: Chain<str, Outlook>,
    current: Chain<str, Outlook>,
}

impl OutlookExtractor {
    /// "de X" / "from X" gives the previous outlook. "para Y" / "to Y" gives
    /// the current one, falling back to the first outlook word after an
    /// "Outlook"/"Perspective"/"Perspectiva" label.
    pub fn standard() -> Self {
        Self {
            previous: Chain::new("outlook_previous").then(OutlookPattern {
                name: "from",
                regex: &FROM_RE,
            }),
            current: Chain::new("outlook_current")
                .then(OutlookPattern {
                    name: "to",
                    regex: &TO_RE,
                })
                .then(OutlookPattern {
                    name: "labelled",
                    regex: &LABELLED_RE,
                }),
        }
    }

    pub fn extract(&self, text: &str) -> Transition<Outlook> {
        Transition {
            previous: self.previous.resolve(text),
            current: self.current.resolve(text),
        }
    }
}
