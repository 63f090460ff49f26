//! Agency detection by name signature.

use regex::Regex;

use ratewatch_common::Agency;

use super::{Chain, Strategy};

/// Signatures in priority order. Word boundaries keep short names such as
/// `fitch` or `kbra` from matching inside longer words.
const SIGNATURES: &[(Agency, &str)] = &[
    (Agency::FitchRatings, r"\bfitch\b"),
    (Agency::Moodys, r"\bmoody['’]s\b"),
    (Agency::SpGlobal, r"s&p|\bstandard (?:and|&) poor"),
    (Agency::DbrsMorningstar, r"\bdbrs\b"),
    (Agency::Kbra, r"\bkbra\b"),
    (Agency::AmBest, r"\ba\.m\. best\b"),
    (Agency::ScopeRatings, r"\bscope ratings\b"),
];

/// Matches one agency's name signature anywhere in the text.
pub struct AgencySignature {
    agency: Agency,
    pattern: Regex,
}

impl AgencySignature {
    fn new(agency: Agency, pattern: &str) -> Self {
        Self {
            agency,
            pattern: Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
        }
    }
}

impl Strategy<str, Agency> for AgencySignature {
    fn name(&self) -> &'static str {
        self.agency.label()
    }

    fn attempt(&self, text: &str) -> Option<Agency> {
        self.pattern.is_match(text).then_some(self.agency)
    }
}

pub fn chain() -> Chain<str, Agency> {
    SIGNATURES
        .iter()
        .fold(Chain::new("agency"), |chain, (agency, pattern)| {
            chain.then(AgencySignature::new(*agency, pattern))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<Agency> {
        chain().resolve(text)
    }

    #[test]
    fn recognises_each_agency() {
        assert_eq!(detect("A Fitch Ratings afirmou"), Some(Agency::FitchRatings));
        assert_eq!(detect("Moody's Local Brasil"), Some(Agency::Moodys));
        assert_eq!(detect("Moody’s rebaixou"), Some(Agency::Moodys));
        assert_eq!(detect("S&P Global Ratings elevou"), Some(Agency::SpGlobal));
        assert_eq!(detect("Standard and Poor's"), Some(Agency::SpGlobal));
        assert_eq!(detect("DBRS Morningstar confirmed"), Some(Agency::DbrsMorningstar));
        assert_eq!(detect("KBRA assigns"), Some(Agency::Kbra));
        assert_eq!(detect("A.M. Best affirms"), Some(Agency::AmBest));
        assert_eq!(detect("Scope Ratings GmbH"), Some(Agency::ScopeRatings));
    }

    #[test]
    fn signature_does_not_match_inside_words() {
        assert_eq!(detect("Fitchburg Gas and Electric"), None);
        assert_eq!(detect("kbrasil holdings"), None);
    }

    #[test]
    fn first_signature_in_priority_order_wins() {
        assert_eq!(
            detect("Moody's e Fitch publicaram no mesmo dia"),
            Some(Agency::FitchRatings)
        );
    }

    #[test]
    fn unknown_text_has_no_agency() {
        assert_eq!(detect("Comunicado ao mercado"), None);
    }
}
