//! `/sitemap.xml`, proxied from the backend.
//!
//! The backend document is passed through verbatim and kept in memory for
//! [`SITEMAP_TTL`](crate::state::SITEMAP_TTL). When the backend cannot be
//! reached a one-URL sitemap pointing at the site root is served instead;
//! that fallback is never cached.

use axum::{
    extract::State,
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use tracing::{debug, instrument, warn};

use crate::state::{AppState, SITEMAP_KEY};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const SITEMAP_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

/// Serve the sitemap.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Response {
    let cache = state.sitemap_cache();

    if let Some(body) = cache.get(SITEMAP_KEY).await {
        debug!("Serving cached sitemap");
        return proxied(body);
    }

    match state.api().sitemap().await {
        Ok(body) => {
            cache.insert(SITEMAP_KEY, body.clone()).await;
            proxied(body)
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch sitemap from backend, serving fallback");
            let body = fallback_sitemap(&state.config().site_url, Utc::now().date_naive());
            ([(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))], body).into_response()
        }
    }
}

fn proxied(body: String) -> Response {
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE)),
            (CACHE_CONTROL, HeaderValue::from_static(SITEMAP_CACHE_CONTROL)),
        ],
        body,
    )
        .into_response()
}

/// A sitemap with the site root as its only entry.
#[must_use]
pub fn fallback_sitemap(site_url: &str, today: NaiveDate) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{loc}</loc>
    <lastmod>{lastmod}</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
</urlset>"#,
        loc = escape_xml(site_url),
        lastmod = today.format("%Y-%m-%d"),
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_sitemap() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let xml = fallback_sitemap("https://svrve.com", today);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<loc>https://svrve.com</loc>"));
        assert!(xml.contains("<lastmod>2024-03-09</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<url>").count(), 1);
    }

    #[test]
    fn test_fallback_sitemap_escapes_loc() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let xml = fallback_sitemap("https://svrve.com/?a=1&b=2", today);
        assert!(xml.contains("<loc>https://svrve.com/?a=1&amp;b=2</loc>"));
    }
}
