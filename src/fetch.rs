// src/fetch.rs

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

/// Base of the published-spreadsheet export endpoint.
static EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Where the CSV text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A sheet published to the web, addressed by spreadsheet and sheet (gid) id.
    Published {
        spreadsheet_id: String,
        sheet_id: String,
    },
    Url(Url),
    File(PathBuf),
}

impl Source {
    pub fn url(&self) -> Result<Option<Url>> {
        match self {
            Source::Published {
                spreadsheet_id,
                sheet_id,
            } => export_url(spreadsheet_id, sheet_id).map(Some),
            Source::Url(url) => Ok(Some(url.clone())),
            Source::File(_) => Ok(None),
        }
    }
}

/// Spreadsheet and sheet ids are plain tokens: ASCII letters, digits, `-`, `_`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `https://docs.google.com/spreadsheets/d/{id}/export?format=csv&gid={sheet}`
pub fn export_url(spreadsheet_id: &str, sheet_id: &str) -> Result<Url> {
    for (name, id) in [("spreadsheet id", spreadsheet_id), ("sheet id", sheet_id)] {
        if !is_valid_id(id) {
            bail!("invalid {} {:?}", name, id);
        }
    }
    let mut url = Url::parse(EXPORT_BASE)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("export base {} cannot take path segments", EXPORT_BASE))?
        .pop_if_empty()
        .push(spreadsheet_id)
        .push("export");
    url.query_pairs_mut()
        .append_pair("format", "csv")
        .append_pair("gid", sheet_id);
    Ok(url)
}

/// One GET; a non-2xx status is an error.
#[tracing::instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_csv(client: &Client, url: &Url) -> Result<String> {
    debug!("requesting CSV export");
    let text = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .context("スプレッドシートの読み込みに失敗しました")?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    info!(bytes = text.len(), "fetched CSV");
    Ok(text)
}

pub async fn load_source(client: &Client, source: &Source) -> Result<String> {
    match source {
        Source::File(path) => {
            info!(path = %path.display(), "reading CSV file");
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))
        }
        other => {
            let url = other.url()?.context("source has no URL")?;
            fetch_csv(client, &url).await
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one HTTP response on a local port and return its URL.
    pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        Ok(Url::parse(&format!("http://{}/export.csv", addr))?)
    }

    pub(crate) fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn export_url_has_format_and_gid() {
        let url = export_url("abc123", "42").unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=42"
        );
    }

    #[test]
    fn export_url_rejects_ids_that_rewrite_the_url() {
        for id in ["..", "abc?x=1", "abc/def", "abc#frag", ""] {
            assert!(export_url(id, "0").is_err(), "{id:?}");
        }
        assert!(export_url("abc", "0&format=html").is_err());
        assert!(is_valid_id("1AbC-d_E"));
    }

    #[test]
    fn file_source_has_no_url() {
        assert_eq!(Source::File("x.csv".into()).url().unwrap(), None);
    }

    #[tokio::test]
    async fn fetches_body_on_success() -> Result<()> {
        let url = serve_once("200 OK", "項番,案件名\n1,EC\n").await?;
        let text = fetch_csv(&local_client(), &url).await?;
        assert_eq!(text, "項番,案件名\n1,EC\n");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> Result<()> {
        let url = serve_once("404 Not Found", "nope").await?;
        let err = fetch_csv(&local_client(), &url).await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("スプレッドシートの読み込みに失敗しました"), "{msg}");
        assert!(msg.contains("404"), "{msg}");
        Ok(())
    }

    #[tokio::test]
    async fn reads_file_sources() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "a,b\n")?;
        let text = load_source(&local_client(), &Source::File(path)).await?;
        assert_eq!(text, "a,b\n");
        Ok(())
    }
}
