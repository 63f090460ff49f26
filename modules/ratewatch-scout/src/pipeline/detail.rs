use std::time::Duration;

use tracing::info;

use crate::browser::{BrowserError, BrowserSession};
use crate::extract::{DetailPage, TableRow};

use super::navigator::PageNavigator;
use super::site;

/// Loads one announcement and reads the parts extraction works from.
#[derive(Debug, Clone, Copy)]
pub struct DetailReader {
    page_timeout: Duration,
    table_timeout: Duration,
}

impl DetailReader {
    pub fn new(page_timeout: Duration, table_timeout: Duration) -> Self {
        Self {
            page_timeout,
            table_timeout,
        }
    }

    /// The ratings table is optional: when it does not appear within the
    /// table timeout the page is returned without one.
    pub async fn read<S: BrowserSession>(
        &self,
        navigator: &mut PageNavigator<S>,
        url: &str,
    ) -> Result<DetailPage, BrowserError> {
        info!(url, "Opening rating action");
        navigator
            .navigate(url, site::DETAIL_BODY, self.page_timeout)
            .await?;

        let session = navigator.session();
        let body = session
            .locate_all(site::DETAIL_BODY)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: format!("`{}` vanished after load", site::DETAIL_BODY),
            })?;
        let heading = session
            .locate_all(site::DETAIL_HEADING)?
            .into_iter()
            .next()
            .map(|h| h.inner_text().to_string());

        let mut page = DetailPage::from_text(body.inner_text());
        if let Some(heading) = heading {
            page = page.with_heading(&heading);
        }

        if navigator
            .wait_for(site::RATINGS_TABLE, self.table_timeout)
            .await?
        {
            page = page.with_table(read_table(navigator.session())?);
        }

        Ok(page)
    }
}

fn read_table<S: BrowserSession>(session: &S) -> Result<Vec<TableRow>, BrowserError> {
    session
        .locate_all(site::TABLE_ROWS)?
        .iter()
        .map(|row| {
            let cells = row.locate_all(site::TABLE_CELLS)?;
            Ok::<_, BrowserError>(TableRow::new(
                cells.iter().map(|c| c.inner_text().to_string()),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detail_page, FixtureSession};

    const URL: &str = "https://ratings.test/research/alfa";

    fn reader() -> DetailReader {
        DetailReader::new(Duration::from_secs(1), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn reads_body_heading_and_table() {
        let html = detail_page("Fitch afirmou os ratings.")
            .heading("Fitch Affirms Empresa Alfa")
            .table_row("Empresa Alfa S.A.", "AA(bra) Afirmado", "AA(bra)")
            .html();
        let mut nav = PageNavigator::new(FixtureSession::new().on_page(URL, &html));

        let page = reader().read(&mut nav, URL).await.unwrap();
        assert_eq!(page.text, "Fitch afirmou os ratings.");
        assert_eq!(page.heading.as_deref(), Some("Fitch Affirms Empresa Alfa"));
        assert_eq!(
            page.table,
            Some(vec![TableRow::new(["Empresa Alfa S.A.", "AA(bra) Afirmado", "AA(bra)"])])
        );
    }

    #[tokio::test]
    async fn missing_table_is_not_an_error() {
        let html = detail_page("Sem tabela.").html();
        let mut nav = PageNavigator::new(FixtureSession::new().on_page(URL, &html));

        let page = reader().read(&mut nav, URL).await.unwrap();
        assert_eq!(page.table, None);
        assert_eq!(page.heading, None);
    }

    #[tokio::test]
    async fn body_that_never_loads_fails_the_page() {
        let mut nav = PageNavigator::new(
            FixtureSession::new().on_page(URL, "<html><body><h1>Erro</h1></body></html>"),
        );
        let err = reader().read(&mut nav, URL).await.unwrap_err();
        assert!(matches!(err, BrowserError::NavigationTimeout { .. }));
    }
}
