//! Action classification by announcement verb.

use ratewatch_common::RatingAction;

use super::{Chain, Strategy};

/// Verbs, Portuguese first, checked in priority order.
const ACTION_VERBS: &[(RatingAction, &[&str])] = &[
    (RatingAction::Affirmed, &["afirmou", "affirmed", "affirms"]),
    (RatingAction::Upgrade, &["elevou", "upgraded", "upgrades"]),
    (RatingAction::Downgrade, &["rebaixou", "downgraded", "downgrades"]),
    (RatingAction::NewRating, &["atribuiu", "assigned", "assigns"]),
];

pub struct ActionKeywords {
    action: RatingAction,
    verbs: &'static [&'static str],
}

impl Strategy<str, RatingAction> for ActionKeywords {
    fn name(&self) -> &'static str {
        self.verbs[0]
    }

    fn attempt(&self, text: &str) -> Option<RatingAction> {
        let lower = text.to_lowercase();
        self.verbs
            .iter()
            .any(|verb| lower.contains(verb))
            .then_some(self.action)
    }
}

pub fn chain() -> Chain<str, RatingAction> {
    ACTION_VERBS
        .iter()
        .fold(Chain::new("action"), |chain, &(action, verbs)| {
            chain.then(ActionKeywords { action, verbs })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portuguese_verbs() {
        let chain = chain();
        assert_eq!(chain.resolve("A Fitch Afirmou o rating"), Some(RatingAction::Affirmed));
        assert_eq!(chain.resolve("a fitch elevou"), Some(RatingAction::Upgrade));
        assert_eq!(chain.resolve("a fitch rebaixou"), Some(RatingAction::Downgrade));
        assert_eq!(chain.resolve("a fitch atribuiu"), Some(RatingAction::NewRating));
    }

    #[test]
    fn english_verbs() {
        assert_eq!(
            chain().resolve("Fitch Upgrades Horizonte Telecom"),
            Some(RatingAction::Upgrade)
        );
    }

    #[test]
    fn affirmation_takes_priority() {
        assert_eq!(
            chain().resolve("A Fitch elevou o IDR e afirmou o rating nacional"),
            Some(RatingAction::Affirmed)
        );
    }

    #[test]
    fn no_verb_means_no_action() {
        assert_eq!(chain().resolve("Comentário setorial"), None);
    }
}
