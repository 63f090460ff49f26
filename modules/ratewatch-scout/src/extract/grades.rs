//! Rating grades: the structured table first, then quoted grades in prose.

use std::sync::LazyLock;

use regex::Regex;

use ratewatch_common::RatingGrade;

use super::{clean_text, Chain, Strategy, TableRow, Transition};

static GRADE_SCAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:AAA|AA|A|BBB|BB|B|CCC|CC|C)[+-]?\(bra\)").expect("valid regex")
});

static EXPLICIT_TRANSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:de|from)\s+['‘]?([A-Za-z+\-]+\(bra\))['’]?\s+(?:para|to)\s+['‘]?([A-Za-z+\-]+\(bra\))['’]?",
    )
    .expect("valid regex")
});

static QUOTED_GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)['‘]([A-Za-z+\-]+\(bra\))['’]").expect("valid regex")
});

/// Table rows naming a debt instrument rather than the issuer.
const DEBT_ROW_KEYWORDS: &[&str] = &[
    "/",
    "bond",
    "note",
    "notes",
    "debenture",
    "debentures",
    "debênture",
    "senior",
    "secured",
    "unsecured",
    "emissão",
    "emission",
];

pub fn is_debt_instrument(entity: &str) -> bool {
    let lower = entity.to_lowercase();
    DEBT_ROW_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// First grammar-valid grade inside a table cell.
pub fn find_grade(cell: &str) -> Option<RatingGrade> {
    let m = GRADE_SCAN_RE.find(cell)?;
    RatingGrade::parse(m.as_str()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHit {
    pub entity: String,
    pub grades: Transition<RatingGrade>,
}

/// First issuer row with a valid current grade. Cells are entity, current
/// rating, prior rating; rows with fewer cells are ignored.
pub fn entity_from_table(rows: &[TableRow]) -> Option<TableHit> {
    rows.iter().find_map(|row| {
        let [entity, current, prior, ..] = row.cells.as_slice() else {
            return None;
        };

        let entity = clean_text(entity);
        if entity.is_empty() || is_debt_instrument(&entity) {
            return None;
        }

        let current = find_grade(&clean_text(current))?;
        Some(TableHit {
            entity,
            grades: Transition {
                previous: find_grade(&clean_text(prior)),
                current: Some(current),
            },
        })
    })
}

/// "de 'X' para 'Y'" or "from 'X' to 'Y'" stated outright.
pub struct ExplicitTransition;

impl Strategy<str, Transition<RatingGrade>> for ExplicitTransition {
    fn name(&self) -> &'static str {
        "explicit_transition"
    }

    fn attempt(&self, text: &str) -> Option<Transition<RatingGrade>> {
        let caps = EXPLICIT_TRANSITION_RE.captures(text)?;
        let current = RatingGrade::parse(&caps[2]).ok()?;
        Some(Transition {
            previous: RatingGrade::parse(&caps[1]).ok(),
            current: Some(current),
        })
    }
}

/// Quoted grades in document order, without an explicit transition phrase.
/// The first quoted grade is taken as current and the second as previous.
pub struct QuotedGrades;

impl Strategy<str, Transition<RatingGrade>> for QuotedGrades {
    fn name(&self) -> &'static str {
        "quoted_grades"
    }

    fn attempt(&self, text: &str) -> Option<Transition<RatingGrade>> {
        let mut grades = QUOTED_GRADE_RE
            .captures_iter(text)
            .filter_map(|caps| RatingGrade::parse(&caps[1]).ok());

        let current = grades.next()?;
        Some(Transition {
            previous: grades.next(),
            current: Some(current),
        })
    }
}

pub fn text_chain() -> Chain<str, Transition<RatingGrade>> {
    Chain::new("rating")
        .then(ExplicitTransition)
        .then(QuotedGrades)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(token: &str) -> RatingGrade {
        RatingGrade::parse(token).unwrap()
    }

    fn row(cells: [&str; 3]) -> TableRow {
        TableRow::new(cells)
    }

    #[test]
    fn explicit_transition_wins() {
        let t = text_chain()
            .resolve("elevou o rating de 'A-(bra)' para 'A(bra)' e afirmou 'F1(bra)'")
            .unwrap();
        assert_eq!(t.previous, Some(grade("A-(bra)")));
        assert_eq!(t.current, Some(grade("A(bra)")));
    }

    #[test]
    fn english_transition_reads_from_then_to() {
        let t = text_chain()
            .resolve("Fitch downgraded the National Long-Term Rating from 'A(bra)' to 'BBB(bra)'.")
            .unwrap();
        assert_eq!(t.previous, Some(grade("A(bra)")));
        assert_eq!(t.current, Some(grade("BBB(bra)")));
    }

    #[test]
    fn explicit_transition_accepts_typographic_quotes() {
        let t = text_chain()
            .resolve("rebaixou de ‘BBB+(bra)’ para ‘BBB(bra)’.")
            .unwrap();
        assert_eq!(t.previous, Some(grade("BBB+(bra)")));
        assert_eq!(t.current, Some(grade("BBB(bra)")));
    }

    #[test]
    fn two_quoted_grades_assign_first_as_current() {
        let t = text_chain()
            .resolve("Rating elevado para 'AA(bra)'. Anteriormente o rating era 'AA-(bra)'.")
            .unwrap();
        assert_eq!(t.current, Some(grade("AA(bra)")));
        assert_eq!(t.previous, Some(grade("AA-(bra)")));
    }

    #[test]
    fn single_quoted_grade_is_current_only() {
        let t = text_chain().resolve("afirmou em 'AA+(bra)', com Perspectiva Estável").unwrap();
        assert_eq!(t.current, Some(grade("AA+(bra)")));
        assert_eq!(t.previous, None);
    }

    #[test]
    fn tokens_outside_grammar_are_never_assigned() {
        assert_eq!(text_chain().resolve("o rating 'Foo(bra)' e 'AAAA(bra)'"), None);
        let t = text_chain()
            .resolve("ratings 'Xyz(bra)', 'BB-(bra)' e 'Q(bra)'")
            .unwrap();
        assert_eq!(t.current, Some(grade("BB-(bra)")));
        assert_eq!(t.previous, None);
    }

    #[test]
    fn no_grades_yields_nothing() {
        assert_eq!(text_chain().resolve("Fitch publica comentário setorial."), None);
    }

    #[test]
    fn table_returns_first_issuer_row() {
        let hit = entity_from_table(&[
            row(["Empresa Alfa S.A.", "AA+(bra) Afirmado", "AA+(bra)"]),
            row(["Empresa Beta S.A.", "A(bra)", "A-(bra)"]),
        ])
        .unwrap();
        assert_eq!(hit.entity, "Empresa Alfa S.A.");
        assert_eq!(hit.grades.current, Some(grade("AA+(bra)")));
        assert_eq!(hit.grades.previous, Some(grade("AA+(bra)")));
    }

    #[test]
    fn table_skips_debt_rows_and_rows_without_grade() {
        let hit = entity_from_table(&[
            row(["Omega Holding Senior Notes", "AA(bra)", "AA(bra)"]),
            row(["1ª Emissão de Debêntures", "AA(bra)", ""]),
            row(["Omega Holding", "Retirado", "AA(bra)"]),
            row(["Omega Energia", "BB+(bra)", ""]),
        ])
        .unwrap();
        assert_eq!(hit.entity, "Omega Energia");
        assert_eq!(hit.grades.current, Some(grade("BB+(bra)")));
        assert_eq!(hit.grades.previous, None);
    }

    #[test]
    fn table_with_only_debt_rows_yields_nothing() {
        assert_eq!(
            entity_from_table(&[row(["Omega Holding Senior Notes", "AA(bra)", "AA(bra)"])]),
            None
        );
    }

    #[test]
    fn short_rows_are_ignored() {
        assert_eq!(
            entity_from_table(&[TableRow::new(["Empresa", "AA(bra)"])]),
            None
        );
    }

    #[test]
    fn debt_keywords_are_case_insensitive() {
        assert!(is_debt_instrument("USD 500mn SENIOR UNSECURED"));
        assert!(is_debt_instrument("Série 2021/1"));
        assert!(!is_debt_instrument("Banco Sigma S.A."));
    }
}
