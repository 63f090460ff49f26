//! Site contract: the search query and the selectors the pipeline relies on.

use url::Url;

pub const RESULTS_CONTAINER: &str = ".frw-column__main";
pub const RESULT_BLOCK: &str = ".frw-column__main > .frw-article-data";
pub const TITLE_LINK: &str = ".frw-article-data--title a";
pub const DATE_DAY: &str = ".frw-date__1";
pub const DATE_MONTH_YEAR: &str = ".frw-date__2";

pub const DETAIL_BODY: &str = ".frw-RAC";
pub const DETAIL_HEADING: &str = "h1";
pub const RATINGS_TABLE: &str = ".rt-table";
pub const TABLE_ROWS: &str = ".rt-tbody .rt-tr-group";
pub const TABLE_CELLS: &str = ".rt-td";

/// Parameters of the one search the pipeline issues per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub date_value: String,
    pub expanded: String,
    pub language: String,
    pub report_type: String,
    pub sector: String,
    pub region: String,
    pub country: String,
    pub topic: String,
    pub view_type: String,
}

impl Default for SearchQuery {
    /// Last calendar week, Portuguese rating-action commentary, any sector or region.
    fn default() -> Self {
        Self {
            date_value: "lastWeek".to_string(),
            expanded: "racs".to_string(),
            language: "Portuguese".to_string(),
            report_type: "Rating Action Commentary".to_string(),
            sector: String::new(),
            region: String::new(),
            country: String::new(),
            topic: String::new(),
            view_type: "data".to_string(),
        }
    }
}

impl SearchQuery {
    /// Full search URL against `site_url`.
    pub fn url(&self, site_url: &Url) -> Result<Url, url::ParseError> {
        let mut url = site_url.join("/search")?;
        url.query_pairs_mut()
            .append_pair("dateValue", &self.date_value)
            .append_pair("expanded", &self.expanded)
            .append_pair("filter.sector", &self.sector)
            .append_pair("filter.language", &self.language)
            .append_pair("filter.region", &self.region)
            .append_pair("filter.country", &self.country)
            .append_pair("filter.reportType", &self.report_type)
            .append_pair("filter.topic", &self.topic)
            .append_pair("viewType", &self.view_type);
        Ok(url)
    }
}

/// Absolute detail URL for an `href` taken from the result list.
pub fn resolve_link(site_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    site_url.join(href).ok().map(String::from)
}
