//! The storefront router: sitemap proxy, URL normalization, static files.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use ceramic_artistry_integration_tests::ScriptedApi;
use ceramic_artistry_storefront::config::StorefrontConfig;
use ceramic_artistry_storefront::routes;
use ceramic_artistry_storefront::state::AppState;
use tower::ServiceExt;

struct Site {
    api: Arc<ScriptedApi>,
    state: AppState,
    _static_dir: tempfile::TempDir,
}

fn site() -> Site {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>Ceramic Artistry</h1>").unwrap();
    std::fs::write(static_dir.path().join("robots.txt"), "User-agent: *\n").unwrap();

    let dir = static_dir.path().to_string_lossy().into_owned();
    let config = StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_STATIC_DIR" => Some(dir.clone()),
        "STOREFRONT_SITE_URL" => Some("https://www.svrve.com".to_string()),
        _ => None,
    })
    .unwrap();

    let api = ScriptedApi::new();
    let state = AppState::with_api(config, api.clone());
    Site {
        api,
        state,
        _static_dir: static_dir,
    }
}

async fn get(site: &Site, uri: &str) -> Response {
    routes::app(site.state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value<'a>(response: &'a Response, name: &header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Sitemap
// =============================================================================

#[tokio::test]
async fn test_sitemap_proxied_verbatim() {
    let site = site();
    site.api.set_sitemap("<urlset><url><loc>https://svrve.com/a</loc></url></urlset>");

    let response = get(&site, "/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, &header::CONTENT_TYPE),
        Some("application/xml; charset=utf-8")
    );
    assert_eq!(
        header_value(&response, &header::CACHE_CONTROL),
        Some("public, max-age=3600, s-maxage=3600")
    );
    assert_eq!(
        body_text(response).await,
        "<urlset><url><loc>https://svrve.com/a</loc></url></urlset>"
    );
}

#[tokio::test]
async fn test_sitemap_cached_after_success() {
    let site = site();
    site.api.set_sitemap("<urlset>first</urlset>");
    get(&site, "/sitemap.xml").await;

    site.api.set_sitemap("<urlset>second</urlset>");
    let response = get(&site, "/sitemap.xml").await;

    assert_eq!(body_text(response).await, "<urlset>first</urlset>");
    assert_eq!(site.api.sitemap_calls(), 1);
}

#[tokio::test]
async fn test_sitemap_fallback_not_cached() {
    let site = site();
    site.api.fail_sitemap(true);

    let response = get(&site, "/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, &header::CONTENT_TYPE),
        Some("application/xml; charset=utf-8")
    );
    assert!(header_value(&response, &header::CACHE_CONTROL).is_none());
    let body = body_text(response).await;
    assert!(body.contains("<loc>https://www.svrve.com</loc>"));
    assert!(body.contains("<changefreq>daily</changefreq>"));
    assert!(body.contains("<priority>1.0</priority>"));

    site.api.fail_sitemap(false);
    site.api.set_sitemap("<urlset>live</urlset>");
    let response = get(&site, "/sitemap.xml").await;
    assert_eq!(body_text(response).await, "<urlset>live</urlset>");
    assert_eq!(site.api.sitemap_calls(), 2);
}

// =============================================================================
// Normalization
// =============================================================================

#[tokio::test]
async fn test_collection_type_redirects_to_lowercase() {
    let site = site();
    let response = get(&site, "/collections/Plates").await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        header_value(&response, &header::LOCATION),
        Some("/collections/plates")
    );
}

#[tokio::test]
async fn test_all_collection_not_redirected() {
    let site = site();
    let response = get(&site, "/collections/all").await;
    assert!(!response.status().is_redirection());
}

#[tokio::test]
async fn test_deep_link_restored() {
    let site = site();
    let response = get(&site, "/?p=%2Fcollections%2Fmugs").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        header_value(&response, &header::LOCATION),
        Some("/collections/mugs")
    );
}

#[tokio::test]
async fn test_deep_link_to_uppercase_collection_takes_two_hops() {
    let site = site();
    let response = get(&site, "/?redirect=%2Fcollections%2FVases%3Fpage%3D2").await;
    let location = header_value(&response, &header::LOCATION).unwrap().to_string();
    assert_eq!(location, "/collections/Vases?page=2");

    let response = get(&site, &location).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        header_value(&response, &header::LOCATION),
        Some("/collections/vases?page=2")
    );
}

// =============================================================================
// Static site and health
// =============================================================================

#[tokio::test]
async fn test_static_files_served() {
    let site = site();

    let response = get(&site, "/robots.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "User-agent: *\n");

    let response = get(&site, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Ceramic Artistry"));
}

#[tokio::test]
async fn test_health() {
    let site = site();
    let response = get(&site, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}
