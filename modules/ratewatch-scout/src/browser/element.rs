use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use super::BrowserError;

/// Elements rendered as their own line in inner text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// Elements whose content never contributes to inner text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector).map_err(|_| BrowserError::InvalidSelector(selector.to_string()))
}

/// The DOM of the currently loaded page, kept as source so it can move
/// freely between tasks.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: &str, html: String) -> Self {
        Self {
            url: url.to_string(),
            html,
        }
    }

    pub fn has(&self, selector: &str) -> Result<bool, BrowserError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    pub fn locate_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        let elements = document.select(&selector).map(Element::from_ref).collect();
        Ok(elements)
    }
}

/// Owned snapshot of one DOM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    html: String,
    text: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub(crate) fn from_ref(el: ElementRef<'_>) -> Self {
        Self {
            tag: el.value().name().to_string(),
            html: el.html(),
            text: inner_text(el),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Rendered text: block elements break lines, runs of spaces collapse,
    /// script and style content is dropped.
    pub fn inner_text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Descendants of this element matching `selector`, in document order.
    pub fn locate_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.wrapped_html());
        let Some(root) = fragment
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == self.tag)
        else {
            return Ok(Vec::new());
        };
        Ok(root.select(&selector).map(Element::from_ref).collect())
    }

    pub fn locate_first(&self, selector: &str) -> Result<Option<Element>, BrowserError> {
        Ok(self.locate_all(selector)?.into_iter().next())
    }

    /// Table parts are dropped by the HTML parser outside a table context,
    /// so re-parsing them needs the enclosing structure back.
    fn wrapped_html(&self) -> String {
        match self.tag.as_str() {
            "td" | "th" => format!("<table><tbody><tr>{}</tr></tbody></table>", self.html),
            "tr" => format!("<table><tbody>{}</tbody></table>", self.html),
            "tbody" | "thead" | "tfoot" | "caption" => format!("<table>{}</table>", self.html),
            _ => self.html.clone(),
        }
    }
}

fn inner_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageSnapshot {
        PageSnapshot::new("https://example.com", html.to_string())
    }

    #[test]
    fn inner_text_breaks_blocks_and_collapses_spaces() {
        let snapshot = page(
            "<div class='x'><h1>  Fitch   Afirma </h1><p>Linha <b>um</b></p><p>Linha dois</p>\
             <script>var x = 1;</script></div>",
        );
        let el = snapshot.locate_all(".x").unwrap().remove(0);
        assert_eq!(el.inner_text(), "Fitch Afirma\nLinha um\nLinha dois");
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let snapshot = page("<p id='p'>Perspectiva <em>Est</em>ável</p>");
        let el = snapshot.locate_all("#p").unwrap().remove(0);
        assert_eq!(el.inner_text(), "Perspectiva Estável");
    }

    #[test]
    fn attributes_are_case_insensitive_by_name() {
        let snapshot = page("<a class='t' HREF='/research/abc'>Title</a>");
        let el = snapshot.locate_all("a.t").unwrap().remove(0);
        assert_eq!(el.attribute("href"), Some("/research/abc"));
        assert_eq!(el.attribute("title"), None);
    }

    #[test]
    fn nested_locate_is_scoped_to_descendants() {
        let snapshot = page(
            "<div class='row'><span class='d'>1</span></div>\
             <div class='row'><span class='d'>2</span><span class='d'>3</span></div>",
        );
        let rows = snapshot.locate_all(".row").unwrap();
        assert_eq!(rows.len(), 2);
        let second: Vec<_> = rows[1]
            .locate_all(".d")
            .unwrap()
            .iter()
            .map(|e| e.inner_text().to_string())
            .collect();
        assert_eq!(second, vec!["2", "3"]);
    }

    #[test]
    fn table_rows_keep_their_cells_when_reparsed() {
        let snapshot = page(
            "<table><tbody><tr class='r'><td class='c'>Empresa</td><td class='c'>AA(bra)</td></tr></tbody></table>",
        );
        let row = snapshot.locate_all("tr.r").unwrap().remove(0);
        let cells = row.locate_all("td.c").unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].inner_text(), "AA(bra)");
    }

    #[test]
    fn invalid_selector_is_reported() {
        let err = page("<p></p>").locate_all("p[").unwrap_err();
        assert!(matches!(err, BrowserError::InvalidSelector(_)));
    }

    #[test]
    fn has_reports_presence() {
        let snapshot = page("<div class='rt-table'></div>");
        assert!(snapshot.has(".rt-table").unwrap());
        assert!(!snapshot.has(".frw-RAC").unwrap());
    }
}
