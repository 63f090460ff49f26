//! Field extraction from rating-action announcements.
//!
//! Every field is resolved by an ordered [`Chain`] of strategies; the first
//! strategy that produces a value wins. Extraction is pure: the same
//! [`DetailPage`] always yields the same record.

pub mod action;
pub mod agency;
pub mod company;
pub mod grades;
pub mod outlook;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use ratewatch_common::{
    Agency, Outlook, RatingAction, RatingActionRecord, RatingGrade,
};

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse every whitespace run to one space and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// --- Strategy / Chain ---

pub trait Strategy<I: ?Sized, O>: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, input: &I) -> Option<O>;
}

/// Ordered fallback chain. Order is priority.
pub struct Chain<I: ?Sized, O> {
    field: &'static str,
    strategies: Vec<Box<dyn Strategy<I, O>>>,
}

impl<I: ?Sized, O> Chain<I, O> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl Strategy<I, O> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Apply strategies in order and return the first result.
    pub fn resolve(&self, input: &I) -> Option<O> {
        self.strategies.iter().find_map(|strategy| {
            let out = strategy.attempt(input)?;
            debug!(field = self.field, strategy = strategy.name(), "Strategy matched");
            Some(out)
        })
    }
}

// --- Extractor input ---

/// One row of the structured ratings table: entity, current rating, prior rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// What the pipeline reads off a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Announcement body, whitespace-collapsed.
    pub text: String,
    /// Primary heading, if the page has one.
    pub heading: Option<String>,
    /// Ratings table rows, `None` when no table appeared in time.
    pub table: Option<Vec<TableRow>>,
}

impl DetailPage {
    pub fn from_text(text: &str) -> Self {
        Self {
            text: clean_text(text),
            heading: None,
            table: None,
        }
    }

    pub fn with_heading(mut self, heading: &str) -> Self {
        self.heading = Some(clean_text(heading));
        self
    }

    pub fn with_table(mut self, rows: Vec<TableRow>) -> Self {
        self.table = Some(rows);
        self
    }
}

/// Previous/current pair for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<T> {
    pub previous: Option<T>,
    pub current: Option<T>,
}

// Derived Default would require `T: Default`.
impl<T> Default for Transition<T> {
    fn default() -> Self {
        Self {
            previous: None,
            current: None,
        }
    }
}

// --- RecordExtractor ---

/// Assembles a [`RatingActionRecord`] from a detail page.
///
/// Company and rating resolve on separate tracks: the table is tried first
/// for both, the heading and free text back-fill the company, and free text
/// back-fills the rating whenever the table gave none.
pub struct RecordExtractor {
    agency: Chain<str, Agency>,
    company: Chain<DetailPage, String>,
    rating: Chain<str, Transition<RatingGrade>>,
    outlook: outlook::OutlookExtractor,
    action: Chain<str, RatingAction>,
}

impl RecordExtractor {
    pub fn standard() -> Self {
        Self {
            agency: agency::chain(),
            company: company::chain(),
            rating: grades::text_chain(),
            outlook: outlook::OutlookExtractor::standard(),
            action: action::chain(),
        }
    }

    pub fn agency(&self, text: &str) -> Agency {
        self.agency.resolve(text).unwrap_or(Agency::Unknown)
    }

    pub fn action(&self, text: &str) -> RatingAction {
        self.action.resolve(text).unwrap_or(RatingAction::Other)
    }

    pub fn outlook(&self, text: &str) -> Transition<Outlook> {
        self.outlook.extract(text)
    }

    /// Company and rating transition, following the two-track resolution order.
    pub fn company_and_rating(&self, page: &DetailPage) -> (String, Transition<RatingGrade>) {
        let table_hit = page.table.as_deref().and_then(grades::entity_from_table);

        let (mut company, mut rating) = match table_hit {
            Some(hit) => (hit.entity, hit.grades),
            None => (String::new(), Transition::default()),
        };

        if company.is_empty() && rating.current.is_none() {
            company = self.company.resolve(page).unwrap_or_default();
        }

        if rating.current.is_none() {
            rating = self.rating.resolve(page.text.as_str()).unwrap_or_default();
        }

        (company, rating)
    }

    pub fn extract(&self, page: &DetailPage, date: &str, link: &str) -> RatingActionRecord {
        let (company, rating) = self.company_and_rating(page);
        let outlook = self.outlook(&page.text);

        RatingActionRecord {
            agency: self.agency(&page.text),
            company,
            rating_previous: rating.previous,
            rating_current: rating.current,
            outlook_previous: outlook.previous,
            outlook_current: outlook.current,
            action: self.action(&page.text),
            date: clean_text(date),
            link: link.to_string(),
        }
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(token: &str) -> Option<RatingGrade> {
        Some(RatingGrade::parse(token).unwrap())
    }

    const LINK: &str = "https://www.fitchratings.com/research/x";

    #[test]
    fn empty_transition_needs_no_default_payload() {
        let rating: Transition<RatingGrade> = Transition::default();
        let outlook: Transition<Outlook> = Transition::default();
        assert_eq!(rating.current, None);
        assert_eq!(outlook.previous, None);
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  12\n\t Mar   2025 "), "12 Mar 2025");
    }

    #[test]
    fn affirmation_in_free_text() {
        let page = DetailPage::from_text(
            "Fitch afirmou os Ratings Nacionais de Longo Prazo da Empresa Alfa S.A. em \
             'AA+(bra)', com Perspectiva Estável.",
        );
        let record = RecordExtractor::standard().extract(&page, "12 Mar 2025", LINK);
        assert_eq!(record.agency, Agency::FitchRatings);
        assert_eq!(record.company, "Empresa Alfa S.A.");
        assert_eq!(record.action, RatingAction::Affirmed);
        assert_eq!(record.rating_current, grade("AA+(bra)"));
        assert_eq!(record.rating_previous, None);
        assert_eq!(record.outlook_current, Some(Outlook::Stable));
    }

    #[test]
    fn explicit_transition_sets_both_grades() {
        let page = DetailPage::from_text(
            "A Fitch elevou o Rating Nacional de Longo Prazo da Gama Energia S.A. \
             de 'A-(bra)' para 'A(bra)'. A Perspectiva é Estável.",
        );
        let record = RecordExtractor::standard().extract(&page, "1 Abr 2025", LINK);
        assert_eq!(record.rating_previous, grade("A-(bra)"));
        assert_eq!(record.rating_current, grade("A(bra)"));
        assert_eq!(record.action, RatingAction::Upgrade);
    }

    #[test]
    fn table_supplies_company_and_grades() {
        let page = DetailPage::from_text("Fitch afirmou os ratings. Perspectiva Negativa.")
            .with_table(vec![
                TableRow::new(["Delta Saneamento S.A.", "BBB(bra) Afirmado", "BBB(bra)"]),
            ]);
        let record = RecordExtractor::standard().extract(&page, "2 Abr 2025", LINK);
        assert_eq!(record.company, "Delta Saneamento S.A.");
        assert_eq!(record.rating_current, grade("BBB(bra)"));
        assert_eq!(record.rating_previous, grade("BBB(bra)"));
        assert_eq!(record.outlook_current, Some(Outlook::Negative));
    }

    #[test]
    fn debt_only_table_falls_back_to_heading() {
        let page = DetailPage::from_text(
            "A Fitch afirmou o rating 'AA(bra)' das notas. Perspectiva Estável.",
        )
        .with_heading("Fitch Affirms Omega Holding; Outlook Stable")
        .with_table(vec![TableRow::new([
            "Omega Holding Senior Notes",
            "AA(bra)",
            "AA(bra)",
        ])]);
        let record = RecordExtractor::standard().extract(&page, "3 Abr 2025", LINK);
        assert_eq!(record.company, "Omega Holding");
        assert_eq!(record.rating_current, grade("AA(bra)"));
    }

    #[test]
    fn table_row_without_entity_is_ignored() {
        let page = DetailPage::from_text("Rating 'BB(bra)' afirmado.")
            .with_heading("Fitch Rebaixa Ratings da Zeta Log para 'BB(bra)'")
            .with_table(vec![TableRow::new(["", "BB(bra)", ""])]);
        let (company, rating) = RecordExtractor::standard().company_and_rating(&page);
        assert_eq!(company, "Zeta Log");
        assert_eq!(rating.current, grade("BB(bra)"));
    }

    #[test]
    fn nothing_recognisable_yields_empty_company_and_defaults() {
        let page = DetailPage::from_text("Comunicado sem conteúdo de rating.");
        let record = RecordExtractor::standard().extract(&page, " 4  Abr 2025 ", LINK);
        assert!(record.company.is_empty());
        assert_eq!(record.agency, Agency::Unknown);
        assert_eq!(record.action, RatingAction::Other);
        assert_eq!(record.rating_current, None);
        assert_eq!(record.date, "4 Abr 2025");
    }

    #[test]
    fn extraction_is_deterministic() {
        let page = DetailPage::from_text(
            "A Fitch rebaixou o Rating Nacional da Beta Corp, de 'A(bra)' para 'BBB(bra)'. \
             A Perspectiva foi revisada de Estável para Negativa.",
        );
        let extractor = RecordExtractor::standard();
        let first = extractor.extract(&page, "5 Abr 2025", LINK);
        for _ in 0..5 {
            assert_eq!(extractor.extract(&page, "5 Abr 2025", LINK), first);
        }
        assert_eq!(first.outlook_previous, Some(Outlook::Stable));
        assert_eq!(first.outlook_current, Some(Outlook::Negative));
        assert_eq!(first.action, RatingAction::Downgrade);
    }

    struct Fixed(&'static str, Option<u8>);

    impl Strategy<str, u8> for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn attempt(&self, _input: &str) -> Option<u8> {
            self.1
        }
    }

    #[test]
    fn chain_returns_first_success_in_order() {
        let chain = Chain::new("test")
            .then(Fixed("none", None))
            .then(Fixed("first", Some(1)))
            .then(Fixed("second", Some(2)));
        assert_eq!(chain.resolve("x"), Some(1));
        assert_eq!(chain.strategy_names(), vec!["none", "first", "second"]);
    }

    #[test]
    fn empty_chain_resolves_nothing() {
        let chain: Chain<str, u8> = Chain::new("test");
        assert_eq!(chain.resolve("x"), None);
    }
}
