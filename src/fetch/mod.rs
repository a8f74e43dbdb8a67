// src/fetch/mod.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::csv::{parse_csv, CsvTable};

/// Capability for reading the CSV resources the backend publishes.
///
/// `Ok(None)` means the resource is missing or not readable right now and is
/// treated as "no data" by callers; only transport failures are errors.
#[async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch_text(&self, path: &str) -> Result<Option<String>>;
}

/// `CsvSource` over HTTP. Requests are sent with `Cache-Control: no-store`
/// so a regenerated export is never shadowed by a cached copy.
pub struct HttpCsvSource {
    client: Client,
    base: Url,
}

impl HttpCsvSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base url {base_url}"))?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl CsvSource for HttpCsvSource {
    async fn fetch_text(&self, path: &str) -> Result<Option<String>> {
        let url = self
            .base
            .join(path)
            .with_context(|| format!("joining resource path {path}"))?;
        let resp = self
            .client
            .get(url.clone())
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            if status != StatusCode::NOT_FOUND {
                debug!(%url, %status, "csv resource unavailable");
            }
            return Ok(None);
        }

        let text = resp
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(Some(text))
    }
}

/// Fetch one resource and parse it. A missing resource comes back as an
/// empty table, indistinguishable from a header-only body.
pub async fn fetch_table(source: &dyn CsvSource, path: &str) -> Result<CsvTable> {
    match source.fetch_text(path).await? {
        Some(text) => {
            let table = parse_csv(&text);
            debug!(path, rows = table.rows.len(), "csv resource parsed");
            Ok(table)
        }
        None => Ok(CsvTable::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves fixed texts by path; `None` entries simulate a missing file.
    struct FixedSource(HashMap<&'static str, Option<&'static str>>);

    #[async_trait]
    impl CsvSource for FixedSource {
        async fn fetch_text(&self, path: &str) -> Result<Option<String>> {
            match self.0.get(path) {
                Some(Some(text)) => Ok(Some(text.to_string())),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn missing_resource_is_empty_table() {
        let source = FixedSource(HashMap::new());
        let table = fetch_table(&source, "/csv-data/nope.csv").await.unwrap();
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[tokio::test]
    async fn present_resource_is_parsed() {
        let source = FixedSource(HashMap::from([(
            "/csv-data/x.csv",
            Some("a,b\n1,2\n"),
        )]));
        let table = fetch_table(&source, "/csv-data/x.csv").await.unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("b"), "2");
    }

    #[test]
    fn base_url_must_parse() {
        assert!(HttpCsvSource::new(Client::new(), "not a url").is_err());
        assert!(HttpCsvSource::new(Client::new(), "http://localhost:5000").is_ok());
    }
}
