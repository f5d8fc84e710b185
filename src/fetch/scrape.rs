// src/fetch/scrape.rs
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

/// JSON-ish keys that carry a direct download link, most specific first.
static JSON_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#""@microsoft\.graph\.downloadUrl"\s*:\s*"((?:[^"\\]|\\.)+)""#,
        r#""@content\.downloadUrl"\s*:\s*"((?:[^"\\]|\\.)+)""#,
        r#""downloadUrl"\s*:\s*"((?:[^"\\]|\\.)+)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("download URL pattern should compile"))
    .collect()
});

static DOWNLOAD_ATTR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-downloadurl]").expect("selector should parse"));

/// Scan a shared-link landing page for embedded absolute download URLs.
///
/// JSON keys are tried before the `data-downloadurl` attribute; matches are
/// unescaped, must be absolute http(s) URLs, and come back de-duplicated in
/// discovery order.
pub fn extract_download_urls(page: &str) -> Vec<String> {
    let mut found = Vec::new();

    for re in JSON_PATTERNS.iter() {
        for caps in re.captures_iter(page) {
            found.push(unescape_json(&caps[1]));
        }
    }

    let doc = Html::parse_document(page);
    found.extend(
        doc.select(&DOWNLOAD_ATTR)
            .filter_map(|el| el.value().attr("data-downloadurl"))
            .map(unescape_json),
    );

    let mut out: Vec<String> = Vec::new();
    for candidate in found {
        let absolute = Url::parse(&candidate)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !absolute {
            trace!(candidate, "ignoring non-absolute download link");
            continue;
        }
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Decode JSON string escapes. Falls back to the `\u0026`, `\u003d` and `\/`
/// escapes alone if the text is not a valid JSON string body.
fn unescape_json(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| {
        raw.replace("\\u0026", "&")
            .replace("\\u003d", "=")
            .replace("\\/", "/")
    })
}
