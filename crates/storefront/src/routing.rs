//! URL canonicalization for the static site.
//!
//! The static host can only serve files that exist, so deep links arrive as
//! `/?p=<encoded path>` (or `?redirect=`) and have to be restored. Collection
//! type segments are also canonicalized to lowercase so that
//! `/collections/Plates` and `/collections/plates` are one page.
//!
//! Everything here is pure; [`crate::middleware::normalize`] turns the
//! results into redirects.

use std::borrow::Cow;
use std::fmt;

use url::Url;

/// Origin used to resolve restored paths. Only its path, query and fragment
/// are ever read back, so the host is irrelevant.
const RESOLVE_BASE: &str = "http://storefront.invalid/";

/// The collection type that lists every product. Never rewritten.
const ALL_COLLECTIONS: &str = "all";

/// Query parameters that carry a deep link, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLinkParam {
    /// `?p=`, written by the static host's 404 page.
    P,
    /// `?redirect=`, written by older builds and external links.
    Redirect,
}

impl DeepLinkParam {
    /// All markers, `p` first.
    pub const ALL: [Self; 2] = [Self::P, Self::Redirect];

    /// The query parameter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P => "p",
            Self::Redirect => "redirect",
        }
    }
}

/// A site-relative location: path plus optional query and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Location {
    /// Location with only a path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
            fragment: None,
        }
    }

    /// Replace the query, dropping empty ones.
    #[must_use]
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(String::from);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Lowercase the type segment of a collection path.
///
/// Returns the rewritten path for `/collections/<type>[/...]` when the
/// percent-decoded `<type>` contains an uppercase character and is not
/// `all`; the lowercased type is percent-encoded again and any further
/// segments are kept as-is. Returns `None` when nothing needs to change.
///
/// ```rust,ignore
/// assert_eq!(
///     canonical_collection_path("/collections/Plates").as_deref(),
///     Some("/collections/plates"),
/// );
/// assert_eq!(canonical_collection_path("/collections/all"), None);
/// ```
#[must_use]
pub fn canonical_collection_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/collections/")?;
    let (kind, tail) = rest.find('/').map_or((rest, ""), |i| rest.split_at(i));

    let decoded = urlencoding::decode(kind).unwrap_or(Cow::Borrowed(kind));
    if decoded.is_empty()
        || decoded == ALL_COLLECTIONS
        || !decoded.chars().any(char::is_uppercase)
    {
        return None;
    }

    let lowered = urlencoding::encode(&decoded.to_lowercase()).into_owned();
    (lowered != kind).then(|| format!("/collections/{lowered}{tail}"))
}

/// Recover the intended location from a deep-link marker at the site root.
///
/// Only `/` (or an empty path) is considered. `p` wins over `redirect`; an
/// empty marker counts as absent. The value is query-decoded and then
/// percent-decoded once more, leaving malformed escapes untouched, and
/// resolved relative to the site origin so that only its path, query and
/// fragment survive. Returns `None` when there is no marker or when the
/// result is the current path.
#[must_use]
pub fn restore_deep_link(path: &str, query: Option<&str>) -> Option<Location> {
    if !path.is_empty() && path != "/" {
        return None;
    }

    let raw = deep_link_value(query?)?;
    let decoded = decode_lenient(&raw);

    let base = Url::parse(RESOLVE_BASE).ok()?;
    let resolved = base.join(&decoded).ok()?;

    let location = Location {
        path: resolved.path().to_string(),
        query: resolved.query().filter(|q| !q.is_empty()).map(String::from),
        fragment: resolved.fragment().filter(|f| !f.is_empty()).map(String::from),
    };

    let current = if path.is_empty() { "/" } else { path };
    (location.to_string() != current).then_some(location)
}

/// The first non-empty deep-link marker in a raw query string.
fn deep_link_value(query: &str) -> Option<String> {
    DeepLinkParam::ALL.iter().find_map(|param| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == param.as_str() && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

/// One percent-decoding pass. Falls back to the input when the decoded bytes
/// are not UTF-8.
fn decode_lenient(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |decoded| decoded.into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_type_lowercased() {
        assert_eq!(
            canonical_collection_path("/collections/Plates").as_deref(),
            Some("/collections/plates")
        );
        assert_eq!(
            canonical_collection_path("/collections/DINNER-Sets/blue").as_deref(),
            Some("/collections/dinner-sets/blue")
        );
        assert_eq!(
            canonical_collection_path("/collections/Mugs/").as_deref(),
            Some("/collections/mugs/")
        );
    }

    #[test]
    fn test_collection_path_unchanged() {
        assert_eq!(canonical_collection_path("/collections/all"), None);
        assert_eq!(canonical_collection_path("/collections/plates"), None);
        assert_eq!(canonical_collection_path("/collections/plates/Blue"), None);
        assert_eq!(canonical_collection_path("/collections/"), None);
        assert_eq!(canonical_collection_path("/collections"), None);
        assert_eq!(canonical_collection_path("/products/Plates"), None);
        assert_eq!(canonical_collection_path("/"), None);
    }

    #[test]
    fn test_collection_type_decoded_before_lowercasing() {
        assert_eq!(
            canonical_collection_path("/collections/%C3%89clat").as_deref(),
            Some("/collections/%C3%A9clat")
        );
        assert_eq!(
            canonical_collection_path("/collections/Tea%20Sets/small").as_deref(),
            Some("/collections/tea%20sets/small")
        );
        assert_eq!(canonical_collection_path("/collections/caf%C3%A9"), None);
        assert_eq!(canonical_collection_path("/collections/caf%c3%a9"), None);
        assert_eq!(canonical_collection_path("/collections/%C3%A9clat"), None);
    }

    #[test]
    fn test_collection_canonical_is_stable() {
        let once = canonical_collection_path("/collections/Bowls").unwrap();
        assert_eq!(canonical_collection_path(&once), None);
    }

    #[test]
    fn test_deep_link_from_p() {
        let location = restore_deep_link("/", Some("p=%2Fcollections%2Fmugs")).unwrap();
        assert_eq!(location, Location::from_path("/collections/mugs"));
        assert_eq!(location.to_string(), "/collections/mugs");
    }

    #[test]
    fn test_deep_link_from_redirect() {
        let location = restore_deep_link("", Some("redirect=/product/blue-vase")).unwrap();
        assert_eq!(location.to_string(), "/product/blue-vase");
    }

    #[test]
    fn test_deep_link_prefers_p() {
        let location = restore_deep_link("/", Some("redirect=%2Fcart&p=%2Fcheckout")).unwrap();
        assert_eq!(location.path, "/checkout");
    }

    #[test]
    fn test_deep_link_empty_p_falls_back_to_redirect() {
        let location = restore_deep_link("/", Some("p=&redirect=%2Fcart")).unwrap();
        assert_eq!(location.path, "/cart");
    }

    #[test]
    fn test_deep_link_keeps_query_and_fragment() {
        let location =
            restore_deep_link("/", Some("p=%252Fcollections%252Fmugs%253Fsort%253Dprice%2523top"))
                .unwrap();
        assert_eq!(location.path, "/collections/mugs");
        assert_eq!(location.query.as_deref(), Some("sort=price"));
        assert_eq!(location.fragment.as_deref(), Some("top"));
        assert_eq!(location.to_string(), "/collections/mugs?sort=price#top");
    }

    #[test]
    fn test_deep_link_double_encoded() {
        let location = restore_deep_link("/", Some("p=%252Fabout")).unwrap();
        assert_eq!(location.path, "/about");
    }

    #[test]
    fn test_deep_link_malformed_escape() {
        let location = restore_deep_link("/", Some("p=/sale%zz")).unwrap();
        assert!(location.path.starts_with("/sale"));
    }

    #[test]
    fn test_deep_link_cannot_change_origin() {
        let location = restore_deep_link("/", Some("p=https://evil.example/steal")).unwrap();
        assert_eq!(location.to_string(), "/steal");

        let location = restore_deep_link("/", Some("p=//evil.example/x")).unwrap();
        assert_eq!(location.to_string(), "/x");
    }

    #[test]
    fn test_deep_link_relative_value() {
        let location = restore_deep_link("/", Some("p=contact")).unwrap();
        assert_eq!(location.path, "/contact");
    }

    #[test]
    fn test_deep_link_ignored() {
        assert_eq!(restore_deep_link("/", None), None);
        assert_eq!(restore_deep_link("/", Some("")), None);
        assert_eq!(restore_deep_link("/", Some("q=mugs")), None);
        assert_eq!(restore_deep_link("/", Some("p=")), None);
        assert_eq!(restore_deep_link("/", Some("p=%2F")), None);
        assert_eq!(restore_deep_link("/shop", Some("p=%2Fcart")), None);
    }

    #[test]
    fn test_deep_link_is_idempotent() {
        let location = restore_deep_link("/", Some("p=%2Fcollections%2Fmugs")).unwrap();
        assert_eq!(
            restore_deep_link(&location.path, location.query.as_deref()),
            None
        );
    }

    #[test]
    fn test_location_with_query() {
        let location = Location::from_path("/collections/plates").with_query(Some("page=2"));
        assert_eq!(location.to_string(), "/collections/plates?page=2");
        let location = Location::from_path("/cart").with_query(Some(""));
        assert_eq!(location.to_string(), "/cart");
    }
}
