// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::thread::sleep;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub mod scrape;
pub mod urls;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const ATTEMPT_DELAY: Duration = Duration::from_secs(1);
/// Anything smaller is an error page or a stub, not a workbook.
pub const MIN_SPREADSHEET_BYTES: usize = 1000;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,\
     application/vnd.ms-excel,*/*";

const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const OLE2_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const SPREADSHEET_CONTENT_TYPES: &[&str] = &[
    "spreadsheet",
    "excel",
    "vnd.openxmlformats",
    "vnd.ms-",
    "vnd.oasis.opendocument",
    "octet-stream",
    "zip",
];

/// Anything that can hand the pipeline the raw bytes of a workbook.
pub trait SpreadsheetSource {
    /// `None` when every acquisition route failed; the reasons are logged.
    fn fetch_spreadsheet(&self) -> Option<Vec<u8>>;
}

/// Why a response was not taken as the spreadsheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("response is an HTML page")]
    Html,
    #[error("content-type {0:?} and leading bytes do not look like a spreadsheet")]
    NotSpreadsheet(String),
    #[error("only {0} bytes")]
    TooSmall(usize),
}

/// Decide whether a response carries spreadsheet bytes.
pub fn check_spreadsheet(
    status: u16,
    content_type: &str,
    body: &[u8],
) -> std::result::Result<(), Rejection> {
    if status != 200 {
        return Err(Rejection::Status(status));
    }
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("text/html") || looks_like_html(body) {
        return Err(Rejection::Html);
    }
    let typed = SPREADSHEET_CONTENT_TYPES.iter().any(|t| ct.contains(t));
    if !typed && !has_spreadsheet_signature(body) {
        return Err(Rejection::NotSpreadsheet(content_type.to_string()));
    }
    if body.len() <= MIN_SPREADSHEET_BYTES {
        return Err(Rejection::TooSmall(body.len()));
    }
    Ok(())
}

pub fn has_spreadsheet_signature(body: &[u8]) -> bool {
    body.starts_with(ZIP_SIGNATURE) || body.starts_with(OLE2_SIGNATURE)
}

fn looks_like_html(body: &[u8]) -> bool {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head: Vec<u8> = body[start..]
        .iter()
        .take(16)
        .map(u8::to_ascii_lowercase)
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

/// Client builder preloaded with browser-like headers, timeout, redirects and cookies.
pub fn client_builder() -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .redirect(Policy::limited(10))
        .cookie_store(true)
        .gzip(true)
}

/// Blocking HTTP fetcher that knows what an acceptable spreadsheet response is.
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = client_builder()
            .build()
            .context("building HTTP client")?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            delay: ATTEMPT_DELAY,
        }
    }

    /// Pause between consecutive attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// One GET; `Ok` only if the response passes [`check_spreadsheet`].
    pub fn get_spreadsheet(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {}", url))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = resp
            .bytes()
            .with_context(|| format!("reading body from {}", url))?;
        check_spreadsheet(status, &content_type, &body)?;
        Ok(body.to_vec())
    }

    /// Try each URL in order and return the first acceptable body.
    pub fn first_spreadsheet(&self, urls: &[String]) -> Option<Vec<u8>> {
        for (attempt, url) in urls.iter().enumerate() {
            if attempt > 0 {
                self.pause();
            }
            info!(%url, "trying download");
            match self.get_spreadsheet(url) {
                Ok(bytes) => {
                    info!(%url, bytes = bytes.len(), "downloaded spreadsheet");
                    return Some(bytes);
                }
                Err(e) => warn!(%url, error = %format!("{:#}", e), "candidate rejected"),
            }
        }
        None
    }

    /// Courtesy wait between two requests to the same host.
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay);
        }
    }

    /// GET a page and return its text, whatever the content type.
    pub fn get_page(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .text()
            .with_context(|| format!("reading page text from {}", url))
    }
}

/// Acquires the workbook behind a shared link: rewritten URL candidates first,
/// then download links scraped from the link's landing page.
pub struct SharedLinkSource {
    shared_url: String,
    fetcher: Fetcher,
}

impl SharedLinkSource {
    pub fn new(shared_url: impl Into<String>, fetcher: Fetcher) -> Self {
        Self {
            shared_url: shared_url.into(),
            fetcher,
        }
    }

    fn direct_candidates(&self) -> Option<Vec<u8>> {
        let candidates = urls::candidate_urls(&self.shared_url);
        self.fetcher.first_spreadsheet(&candidates)
    }

    fn page_scrape(&self) -> Option<Vec<u8>> {
        // follows the last direct candidate
        self.fetcher.pause();
        let page = match self.fetcher.get_page(&self.shared_url) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "could not load shared link page");
                return None;
            }
        };
        let links = scrape::extract_download_urls(&page);
        debug!(count = links.len(), "download links found on page");
        if links.is_empty() {
            warn!("no download link embedded in shared link page");
            return None;
        }
        self.fetcher.pause();
        self.fetcher.first_spreadsheet(&links)
    }
}

impl SpreadsheetSource for SharedLinkSource {
    #[instrument(level = "info", skip(self), fields(shared_url = %self.shared_url))]
    fn fetch_spreadsheet(&self) -> Option<Vec<u8>> {
        let strategies: [(&str, &dyn Fn() -> Option<Vec<u8>>); 2] = [
            ("direct candidates", &|| self.direct_candidates()),
            ("page scrape", &|| self.page_scrape()),
        ];

        let found = strategies.iter().find_map(|(name, strategy)| {
            info!(strategy = *name, "acquiring spreadsheet");
            strategy()
        });
        if found.is_none() {
            warn!("every acquisition strategy failed");
        }
        found
    }
}
