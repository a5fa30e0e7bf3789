//! Backend URL resolution for relayed requests
//!
//! Two inbound shapes map onto the same backend URL layout,
//! `{origin}{upstream_base_path}/{sub_path}`:
//! - Path form: `/api/github/repos?x=1`, where the route prefix is stripped and
//!   the query string is copied verbatim
//! - Query form: `/api/proxy?path=github/repos&x=1`, where the sub-path comes from
//!   the `path` parameter and every other parameter is copied through

use url::{Url, form_urlencoded};

use crate::config::{BackendOrigin, EdgeConfig};

use super::error::ProxyError;

/// Name of the query parameter carrying the backend path in the query form
pub const PATH_PARAM: &str = "path";

/// A resolved backend URL for a single relayed request
#[derive(Debug, Clone, PartialEq)]
pub struct BackendTarget {
    pub url: Url,
}

/// Maps inbound request paths onto backend URLs
#[derive(Debug, Clone)]
pub struct TargetResolver {
    origin: BackendOrigin,
    base_path: String,
    route_prefix: String,
}

impl TargetResolver {
    pub fn new(origin: BackendOrigin, base_path: &str, route_prefix: &str) -> Self {
        Self {
            origin,
            base_path: normalize_prefix(base_path),
            route_prefix: normalize_prefix(route_prefix),
        }
    }

    pub fn from_config(origin: BackendOrigin, config: &EdgeConfig) -> Self {
        Self::new(origin, &config.upstream_base_path, &config.route_prefix)
    }

    pub fn origin(&self) -> &BackendOrigin {
        &self.origin
    }

    /// Returns the part of `path` below the route prefix, without its leading slash
    ///
    /// The prefix only matches on a segment boundary: with prefix `/api`,
    /// `/api`, `/api/` and `/api/x` match but `/apix` does not.
    pub fn strip_route_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.route_prefix.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else if let Some(sub_path) = rest.strip_prefix('/') {
            Some(sub_path)
        } else if self.route_prefix.is_empty() {
            Some(rest)
        } else {
            None
        }
    }

    /// Resolve a path-form request (`{route_prefix}/{sub_path}?{query}`)
    pub fn resolve_path(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<BackendTarget, ProxyError> {
        let sub_path = self.strip_route_prefix(path).ok_or_else(|| {
            ProxyError::NotFound(format!(
                "Path '{path}' is not under the relayed prefix '{}'",
                self.route_prefix
            ))
        })?;

        let mut raw = self.join(sub_path);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(q);
        }

        self.confine(parse_target(&raw)?)
    }

    /// Resolve a query-form request (`?path={sub_path}&...`)
    ///
    /// A missing `path` parameter resolves to the bare API root; the backend
    /// decides what that means.
    pub fn resolve_query(&self, query: Option<&str>) -> Result<BackendTarget, ProxyError> {
        let mut sub_path: Option<String> = None;
        let mut passthrough: Vec<(String, String)> = Vec::new();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            if key == PATH_PARAM {
                if sub_path.is_none() {
                    sub_path = Some(value.into_owned());
                }
            } else {
                passthrough.push((key.into_owned(), value.into_owned()));
            }
        }

        let mut target =
            self.confine(parse_target(&self.join(sub_path.as_deref().unwrap_or_default()))?)?;

        if !passthrough.is_empty() {
            target.url.query_pairs_mut().extend_pairs(passthrough);
        }

        Ok(target)
    }

    fn join(&self, sub_path: &str) -> String {
        format!("{}{}/{}", self.origin, self.base_path, sub_path)
    }

    /// Reject targets whose dot segments (`..`, `%2e%2e`) climbed out of the
    /// API root once the URL was normalized
    fn confine(&self, target: BackendTarget) -> Result<BackendTarget, ProxyError> {
        let root = parse_target(&self.join(""))?;
        if target.url.path().starts_with(root.url.path()) {
            Ok(target)
        } else {
            Err(ProxyError::InvalidTarget(format!(
                "'{}' escapes the API root '{}'",
                target.url.path(),
                root.url.path()
            )))
        }
    }
}

fn parse_target(raw: &str) -> Result<BackendTarget, ProxyError> {
    let mut url =
        Url::parse(raw).map_err(|e| ProxyError::InvalidTarget(format!("'{raw}': {e}")))?;

    // Fragments never reach the backend
    url.set_fragment(None);

    Ok(BackendTarget { url })
}

/// Normalize a path prefix to `/segment` form (or empty for the root)
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://backend.example.com";

    fn resolver() -> TargetResolver {
        TargetResolver::new(BackendOrigin::parse(ORIGIN).unwrap(), "/api", "/api")
    }

    #[test]
    fn test_resolve_path_with_query() {
        let target = resolver()
            .resolve_path("/api/github/repos", Some("x=1"))
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/github/repos?x=1"
        );
    }

    #[test]
    fn test_resolve_path_without_query() {
        let target = resolver()
            .resolve_path("/api/gamification/profile", None)
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/gamification/profile"
        );

        // An empty query string adds no '?'
        let target = resolver()
            .resolve_path("/api/gamification/profile", Some(""))
            .unwrap();
        assert!(target.url.query().is_none());
    }

    #[test]
    fn test_resolve_path_prefix_root() {
        let target = resolver().resolve_path("/api", None).unwrap();
        assert_eq!(target.url.as_str(), "https://backend.example.com/api/");

        let target = resolver().resolve_path("/api/", None).unwrap();
        assert_eq!(target.url.as_str(), "https://backend.example.com/api/");
    }

    #[test]
    fn test_resolve_path_keeps_trailing_slash_and_encoding() {
        let target = resolver()
            .resolve_path("/api/blog/posts/", Some("q=hello%20world"))
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/blog/posts/?q=hello%20world"
        );
    }

    #[test]
    fn test_resolve_path_outside_prefix() {
        let err = resolver().resolve_path("/health", None).unwrap_err();
        assert!(matches!(err, ProxyError::NotFound(_)));

        let err = resolver().resolve_path("/apix/github", None).unwrap_err();
        assert!(matches!(err, ProxyError::NotFound(_)));
    }

    #[test]
    fn test_dot_segments_cannot_leave_api_root() {
        for path in ["/api/../admin/secret", "/api/%2e%2e/admin/secret", "/api/blog/../../admin"] {
            let err = resolver().resolve_path(path, None).unwrap_err();
            assert!(matches!(err, ProxyError::InvalidTarget(_)), "{path}");
        }

        let err = resolver()
            .resolve_query(Some("path=../admin/secret"))
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidTarget(_)));
    }

    #[test]
    fn test_dot_segments_inside_api_root_allowed() {
        let target = resolver()
            .resolve_path("/api/blog/../github/repos", None)
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/github/repos"
        );
    }

    #[test]
    fn test_dot_segments_confined_to_origin_path() {
        let resolver = TargetResolver::new(
            BackendOrigin::parse("http://localhost:8000/v2").unwrap(),
            "",
            "/api",
        );
        assert!(resolver.resolve_path("/api/skills", None).is_ok());
        assert!(resolver.resolve_path("/api/../v1/skills", None).is_err());
    }

    #[test]
    fn test_resolve_query_form() {
        let target = resolver()
            .resolve_query(Some("path=github/repos&x=1"))
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/github/repos?x=1"
        );
    }

    #[test]
    fn test_resolve_query_path_param_not_forwarded() {
        let target = resolver()
            .resolve_query(Some("a=1&path=oracle/chat&b=2"))
            .unwrap();
        assert_eq!(target.url.path(), "/api/oracle/chat");
        let pairs: Vec<(String, String)> = target.url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_resolve_query_encoded_path() {
        let target = resolver()
            .resolve_query(Some("path=github%2Frepos%2Fme%2Fdevquest"))
            .unwrap();
        assert_eq!(
            target.url.as_str(),
            "https://backend.example.com/api/github/repos/me/devquest"
        );
    }

    #[test]
    fn test_resolve_query_missing_path() {
        let target = resolver().resolve_query(None).unwrap();
        assert_eq!(target.url.as_str(), "https://backend.example.com/api/");

        let target = resolver().resolve_query(Some("x=1")).unwrap();
        assert_eq!(target.url.as_str(), "https://backend.example.com/api/?x=1");
    }

    #[test]
    fn test_resolve_query_first_path_wins() {
        let target = resolver()
            .resolve_query(Some("path=cv/analysis&path=blog/posts"))
            .unwrap();
        assert_eq!(target.url.path(), "/api/cv/analysis");
        assert!(target.url.query().is_none());
    }

    #[test]
    fn test_origin_with_path_and_custom_prefixes() {
        let resolver = TargetResolver::new(
            BackendOrigin::parse("http://localhost:8000/v2/").unwrap(),
            "backend/",
            "/edge/",
        );
        let target = resolver.resolve_path("/edge/skills", None).unwrap();
        assert_eq!(
            target.url.as_str(),
            "http://localhost:8000/v2/backend/skills"
        );
    }

    #[test]
    fn test_empty_base_path() {
        let resolver = TargetResolver::new(BackendOrigin::parse(ORIGIN).unwrap(), "", "/api");
        let target = resolver.resolve_path("/api/health", None).unwrap();
        assert_eq!(target.url.as_str(), "https://backend.example.com/health");
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
