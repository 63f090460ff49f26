//! Company name fallbacks: the page heading first, then the announcement prose.
//!
//! Inside each strategy the first pattern that matches decides the outcome;
//! a match that is rejected (issuance vocabulary) does not fall through to
//! the strategy's later patterns.

use std::sync::LazyLock;

use regex::Regex;

use super::{clean_text, Chain, DetailPage, Strategy};

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
}

static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"ratings? da ([^;,.]+)",
        r"ratings? of ([^;,.]+)",
        r"downgrades ([^;,.]+)",
        r"affirms ([^;,.]+)",
        r"upgrades ([^;,.]+)",
        r"assigns ([^;,.]+)",
        r"places ([^;,.]+)",
        r"revises ([^;,.]+)",
        r"publishes ([^;,.]+)",
    ])
});

static HEADING_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) ratings?| at | to | para | em ").expect("valid regex"));

static TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"ratings? .*? da (.+?)[,;.]",
        r"rating .*? de (.+?)[,;.]",
    ])
});

static TEXT_CONNECTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:e de sua|com perspectiva|com outlook|para|em)\s").expect("valid regex")
});

static TEXT_ISSUE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*e de sua .*").expect("valid regex"));

static CORPORATE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bS\.?A?\.?$").expect("valid regex"));

static ISSUANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)emiss[aã]o|deb[eê]nture").expect("valid regex"));

/// Rewrite a trailing `S`, `S.`, `SA` or `S.A` to `S.A.`.
pub fn normalize_corporate_suffix(company: &str) -> String {
    CORPORATE_SUFFIX_RE.replace(company, "S.A.").into_owned()
}

/// Names that still mention an issuance are instrument descriptions, not issuers.
pub fn mentions_issuance(company: &str) -> bool {
    ISSUANCE_RE.is_match(company)
}

fn accept(company: String) -> Option<String> {
    let company = company.trim().to_string();
    if company.is_empty() || mentions_issuance(&company) {
        return None;
    }
    Some(company)
}

/// Entity named in the page heading ("Fitch Affirms X", "Ratings da X").
pub struct HeadingCompany;

impl Strategy<DetailPage, String> for HeadingCompany {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn attempt(&self, page: &DetailPage) -> Option<String> {
        let heading = clean_text(page.heading.as_deref()?);
        let caps = HEADING_PATTERNS.iter().find_map(|p| p.captures(&heading))?;

        let span = caps.get(1)?.as_str();
        let span = HEADING_TAIL_RE.splitn(span, 2).next().unwrap_or_default();
        accept(normalize_corporate_suffix(&clean_text(span)))
    }
}

/// Entity named in the Portuguese prose ("ratings ... da X, ...").
pub struct FreeTextCompany;

impl Strategy<DetailPage, String> for FreeTextCompany {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn attempt(&self, page: &DetailPage) -> Option<String> {
        let caps = TEXT_PATTERNS.iter().find_map(|p| p.captures(&page.text))?;

        let span = clean_text(caps.get(1)?.as_str());
        let span = span.split(',').next().unwrap_or_default();
        let span = TEXT_CONNECTOR_RE.splitn(span, 2).next().unwrap_or_default();
        let span = TEXT_ISSUE_TAIL_RE.replace(span, "");
        accept(normalize_corporate_suffix(span.trim()))
    }
}

/// Company fallbacks used when the ratings table yields nothing.
pub fn chain() -> Chain<DetailPage, String> {
    Chain::new("company")
        .then(HeadingCompany)
        .then(FreeTextCompany)
}
