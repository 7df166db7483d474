use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::{demo, MetaDocument};

/// Published meta.json, regenerated by the scraper CI job
pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/Paradoxollie/tft-speed/main/backend-scraper/public/meta.json";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed meta document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can hand out the current meta document
#[async_trait]
pub trait MetaFeed: Send + Sync {
    async fn fetch(&self) -> Result<MetaDocument, FetchError>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}

/// Where the overlay reads its compositions from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
    Demo,
}

impl FeedSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("demo") {
            Self::Demo
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub fn into_feed(self, request_timeout: Duration) -> Result<Box<dyn MetaFeed>, FetchError> {
        Ok(match self {
            Self::Url(url) => Box::new(HttpFeed::new(url, request_timeout)?),
            Self::File(path) => Box::new(FileFeed::new(path)),
            Self::Demo => Box::new(DemoFeed),
        })
    }
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::Url(DEFAULT_FEED_URL.to_string())
    }
}

pub struct HttpFeed {
    http: reqwest::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout.max(Duration::from_millis(1)))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MetaFeed for HttpFeed {
    async fn fetch(&self) -> Result<MetaDocument, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let doc = MetaDocument::from_json(&body)?;
        debug!("Fetched {} compositions from {}", doc.compositions.len(), self.url);
        Ok(doc)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// meta.json written to disk by the data-generation scripts
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetaFeed for FileFeed {
    async fn fetch(&self) -> Result<MetaDocument, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(MetaDocument::from_json(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Built-in demonstration compositions, no I/O
pub struct DemoFeed;

#[async_trait]
impl MetaFeed for DemoFeed {
    async fn fetch(&self) -> Result<MetaDocument, FetchError> {
        Ok(demo::demo_meta())
    }

    fn describe(&self) -> String {
        "demo".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on a random local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/meta.json", addr)
    }

    #[test]
    fn test_parse_source() {
        assert_eq!(FeedSource::parse("demo"), FeedSource::Demo);
        assert_eq!(
            FeedSource::parse(" https://example.com/meta.json "),
            FeedSource::Url("https://example.com/meta.json".into())
        );
        assert_eq!(
            FeedSource::parse("public/meta.json"),
            FeedSource::File(PathBuf::from("public/meta.json"))
        );
        assert!(matches!(FeedSource::default(), FeedSource::Url(_)));
    }

    #[tokio::test]
    async fn test_http_404_is_typed() {
        let url = serve_once("404 Not Found", "not here").await;
        let feed = HttpFeed::new(url, Duration::from_secs(5)).unwrap();
        let err = feed.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 404 }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_http_success() {
        let url = serve_once(
            "200 OK",
            r#"{"version":"1.0.0","compositions":[{"name":"A","tier":"S"}]}"#,
        )
        .await;
        let feed = HttpFeed::new(url, Duration::from_secs(5)).unwrap();
        let doc = feed.fetch().await.unwrap();
        assert_eq!(doc.compositions.len(), 1);
        assert_eq!(doc.version.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn test_http_malformed_body() {
        let url = serve_once("200 OK", "<html>").await;
        let feed = HttpFeed::new(url, Duration::from_secs(5)).unwrap();
        assert!(matches!(feed.fetch().await, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_file_feed_missing() {
        let feed = FileFeed::new("/nonexistent/meta.json");
        assert!(matches!(feed.fetch().await, Err(FetchError::Io { .. })));
    }

    #[tokio::test]
    async fn test_file_feed_reads_demo_file() {
        let path = std::env::temp_dir().join(format!("tft_data_feed_{}.json", std::process::id()));
        demo::write_demo_meta(&path).unwrap();
        let doc = FileFeed::new(&path).fetch().await.unwrap();
        assert_eq!(doc.compositions.len(), 5);
        let _ = std::fs::remove_file(&path);
    }
}
