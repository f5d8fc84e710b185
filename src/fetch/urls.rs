// src/fetch/urls.rs
use tracing::{debug, warn};
use url::Url;

/// Path segment SharePoint/OneDrive uses for an Excel "view" link.
const VIEW_MARKER: &str = "/:x:/";
/// Same link, asking for the raw binary instead of the web viewer.
const BINARY_MARKER: &str = "/:b:/";
const DOWNLOAD_PARAM: &str = "download=1";

/// Turn a shared link into an ordered, de-duplicated list of URLs worth trying.
///
/// Pure string work, no I/O. Input that does not parse as a URL comes back as the
/// only candidate.
pub fn candidate_urls(shared_url: &str) -> Vec<String> {
    let shared_url = shared_url.trim();
    if let Err(e) = Url::parse(shared_url) {
        warn!(url = shared_url, error = %e, "shared link is not a valid URL; trying it as-is");
        return vec![shared_url.to_string()];
    }

    let mut out: Vec<String> = Vec::with_capacity(3);
    let mut push = |u: String| {
        if !out.contains(&u) {
            out.push(u);
        }
    };

    if shared_url.contains(VIEW_MARKER) {
        let binary = shared_url.replacen(VIEW_MARKER, BINARY_MARKER, 1);
        push(with_download_param(&binary));
    }
    push(shared_url.to_string());
    push(with_download_param(shared_url));

    debug!(count = out.len(), candidates = ?out, "resolved candidate URLs");
    out
}

/// Append `download=1` to the query string, keeping any fragment at the end.
pub fn with_download_param(url: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (url, None),
    };

    let already = base
        .split_once('?')
        .map(|(_, q)| q.split('&').any(|p| p == DOWNLOAD_PARAM))
        .unwrap_or(false);

    let mut out = if already {
        base.to_string()
    } else if base.ends_with('?') || base.ends_with('&') {
        format!("{}{}", base, DOWNLOAD_PARAM)
    } else if base.contains('?') {
        format!("{}&{}", base, DOWNLOAD_PARAM)
    } else {
        format!("{}?{}", base, DOWNLOAD_PARAM)
    };

    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn view_link_gets_binary_variant_first() {
        let shared = "https://contoso.sharepoint.com/:x:/g/personal/jo_contoso_com/EaBc?e=XyZ";
        assert_eq!(
            candidate_urls(shared),
            vec![
                "https://contoso.sharepoint.com/:b:/g/personal/jo_contoso_com/EaBc?e=XyZ&download=1",
                "https://contoso.sharepoint.com/:x:/g/personal/jo_contoso_com/EaBc?e=XyZ",
                "https://contoso.sharepoint.com/:x:/g/personal/jo_contoso_com/EaBc?e=XyZ&download=1",
            ]
        );
    }

    #[test]
    fn plain_link_without_query() {
        assert_eq!(
            candidate_urls("https://files.example.com/payments.xlsx"),
            vec![
                "https://files.example.com/payments.xlsx",
                "https://files.example.com/payments.xlsx?download=1",
            ]
        );
    }

    #[test]
    fn existing_download_param_is_not_duplicated() {
        assert_eq!(
            candidate_urls("https://files.example.com/p.xlsx?download=1"),
            vec!["https://files.example.com/p.xlsx?download=1"]
        );
    }

    #[test]
    fn malformed_input_is_returned_unchanged() {
        assert_eq!(candidate_urls("not a url /:x:/"), vec!["not a url /:x:/"]);
        assert_eq!(candidate_urls(""), vec![""]);
    }

    #[test]
    fn download_param_respects_fragment_and_trailing_separator() {
        assert_eq!(
            with_download_param("https://h/p?a=1#sheet"),
            "https://h/p?a=1&download=1#sheet"
        );
        assert_eq!(with_download_param("https://h/p?"), "https://h/p?download=1");
    }
}
