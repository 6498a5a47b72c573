//! URL normalization middleware.
//!
//! Runs before the static file service:
//! 1. Deep-link restoration (`/?p=...` or `/?redirect=...`) answers with a
//!    temporary redirect to the restored location.
//! 2. Collection canonicalization (`/collections/Plates`) answers with a
//!    permanent redirect to the lowercase path, keeping the query string.
//!
//! Anything else is passed through untouched.

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::routing::{Location, canonical_collection_path, restore_deep_link};

/// Redirect non-canonical URLs, pass everything else through.
pub async fn normalize_middleware(request: Request, next: Next) -> Response {
    let uri = request.uri();
    let path = uri.path();
    let query = uri.query();

    if let Some(target) = restore_deep_link(path, query) {
        debug!(from = %uri, to = %target, "Restoring deep link");
        if let Some(response) = redirect(StatusCode::TEMPORARY_REDIRECT, &target) {
            return response;
        }
    }

    if let Some(canonical) = canonical_collection_path(path) {
        let target = Location::from_path(canonical).with_query(query);
        debug!(from = %uri, to = %target, "Canonicalizing collection path");
        if let Some(response) = redirect(StatusCode::PERMANENT_REDIRECT, &target) {
            return response;
        }
    }

    next.run(request).await
}

/// Build a redirect response, or `None` if the target is not a valid header.
fn redirect(status: StatusCode, target: &Location) -> Option<Response> {
    let value = HeaderValue::try_from(target.to_string()).ok()?;
    Some((status, [(LOCATION, value)]).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/collections/{kind}", get(|| async { "collection" }))
            .layer(axum::middleware::from_fn(normalize_middleware))
    }

    async fn send(uri: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_deep_link_redirects_temporarily() {
        let response = send("/?p=%2Fcollections%2Fmugs").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/collections/mugs");
    }

    #[tokio::test]
    async fn test_collection_redirects_permanently() {
        let response = send("/collections/Plates?page=2").await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&response), "/collections/plates?page=2");
    }

    #[tokio::test]
    async fn test_canonical_urls_pass_through() {
        assert_eq!(send("/collections/all").await.status(), StatusCode::OK);
        assert_eq!(send("/collections/plates").await.status(), StatusCode::OK);
        assert_eq!(send("/").await.status(), StatusCode::OK);
        assert_eq!(send("/?q=mugs").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_encoded_collection_type() {
        assert_eq!(send("/collections/caf%C3%A9").await.status(), StatusCode::OK);

        let response = send("/collections/%C3%89clat").await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&response), "/collections/%C3%A9clat");
    }
}
