use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{EdgeError, Result};

/// Backend origin used when no override is present in the environment
pub const DEFAULT_BACKEND_ORIGIN: &str = "https://maibia-production.up.railway.app";

/// Environment variable that overrides the backend origin at deploy time
pub const DEFAULT_ORIGIN_ENV: &str = "RAILWAY_BACKEND_URL";

/// Main configuration structure for the edge relay
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Edge relay configuration
    #[serde(default)]
    pub edge: EdgeConfig,
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EdgeError::Config(format!("Failed to parse config: {e}")))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EdgeError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the configuration from an explicit path, or from the first default
    /// location that exists, falling back to built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        for path in default_config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }
}

/// Locations searched for `edge.toml` when no path is given
pub fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::home_dir().map(|h| h.join(".devquest").join("edge.toml")),
        dirs::config_dir().map(|c| c.join("devquest").join("edge.toml")),
        Some(PathBuf::from("edge.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Edge relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfig {
    /// Address to listen on (e.g., "127.0.0.1:8787")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Hardcoded backend origin, used when the override variable is unset
    #[serde(default = "default_backend_origin")]
    pub backend_origin: String,
    /// Name of the environment variable that overrides `backend_origin`
    #[serde(default = "default_origin_env")]
    pub origin_env: String,
    /// Path prefix of the API on the backend
    #[serde(default = "default_upstream_base_path")]
    pub upstream_base_path: String,
    /// Inbound prefix relayed by stripping it from the request path
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    /// Inbound route that reads the backend path from its `path` query parameter
    #[serde(default = "default_query_route")]
    pub query_route: String,
    /// Restrict forwarded request headers to this set (None = forward all)
    #[serde(default)]
    pub header_allow_list: Option<Vec<String>>,
    /// Drop the inbound `content-length` header when forwarding all headers
    #[serde(default = "default_strip_content_length")]
    pub strip_content_length: bool,
    /// Upstream request timeout in seconds (None = no timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            backend_origin: default_backend_origin(),
            origin_env: default_origin_env(),
            upstream_base_path: default_upstream_base_path(),
            route_prefix: default_route_prefix(),
            query_route: default_query_route(),
            header_allow_list: None,
            strip_content_length: default_strip_content_length(),
            timeout_secs: None,
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_backend_origin() -> String {
    DEFAULT_BACKEND_ORIGIN.to_string()
}

fn default_origin_env() -> String {
    DEFAULT_ORIGIN_ENV.to_string()
}

fn default_upstream_base_path() -> String {
    "/api".to_string()
}

fn default_route_prefix() -> String {
    "/api".to_string()
}

fn default_query_route() -> String {
    "/api/proxy".to_string()
}

fn default_strip_content_length() -> bool {
    true
}

impl EdgeConfig {
    /// Resolve the backend origin from the process environment
    ///
    /// The override variable is read once, at the time of the call.
    pub fn resolve_origin(&self) -> Result<BackendOrigin> {
        self.resolve_origin_with(|key| std::env::var(key).ok())
    }

    /// Resolve the backend origin using the given environment lookup
    ///
    /// An unset or empty override falls back to `backend_origin`.
    pub fn resolve_origin_with<F>(&self, lookup: F) -> Result<BackendOrigin>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let raw = lookup(&self.origin_env)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.backend_origin.clone());
        BackendOrigin::parse(&raw)
    }

    /// Check that the route settings can be mounted on a router
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("route_prefix", &self.route_prefix),
            ("query_route", &self.query_route),
        ] {
            if !value.starts_with('/') {
                return Err(EdgeError::Config(format!(
                    "{name} must start with '/': {value}"
                )));
            }
        }
        if self.query_route == "/health" {
            return Err(EdgeError::Config(
                "query_route must not shadow /health".to_string(),
            ));
        }
        let literal = !self.query_route.contains(['{', '}'])
            && self
                .query_route
                .split('/')
                .all(|segment| !segment.starts_with([':', '*']));
        if !literal {
            return Err(EdgeError::Config(format!(
                "query_route must be a literal path: {}",
                self.query_route
            )));
        }
        Ok(())
    }
}

/// A validated backend origin with trailing slashes removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOrigin(String);

impl BackendOrigin {
    /// Validate an origin string
    ///
    /// Only absolute `http`/`https` URLs with a host are accepted. Trailing
    /// slashes are trimmed so that paths can be appended with a single `/`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');

        let url = Url::parse(trimmed)
            .map_err(|e| EdgeError::Config(format!("Invalid backend origin '{trimmed}': {e}")))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(EdgeError::Config(format!(
                "Unsupported origin scheme '{scheme}': only http and https are allowed"
            )));
        }
        if url.host_str().is_none() {
            return Err(EdgeError::Config(format!(
                "Backend origin '{trimmed}' has no host"
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(EdgeError::Config(format!(
                "Backend origin '{trimmed}' must not carry a query or fragment"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:8787");
        assert_eq!(config.backend_origin, DEFAULT_BACKEND_ORIGIN);
        assert_eq!(config.origin_env, "RAILWAY_BACKEND_URL");
        assert_eq!(config.upstream_base_path, "/api");
        assert_eq!(config.query_route, "/api/proxy");
        assert!(config.header_allow_list.is_none());
        assert!(config.strip_content_length);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_override_changes_origin() {
        let config = EdgeConfig::default();
        let origin = config
            .resolve_origin_with(|key| {
                assert_eq!(key, "RAILWAY_BACKEND_URL");
                Some("https://staging.example.com".to_string())
            })
            .unwrap();
        assert_eq!(origin.as_str(), "https://staging.example.com");
    }

    #[test]
    fn test_missing_override_falls_back_to_default() {
        let config = EdgeConfig::default();
        let origin = config.resolve_origin_with(|_| None).unwrap();
        assert_eq!(origin.as_str(), DEFAULT_BACKEND_ORIGIN);
    }

    #[test]
    fn test_empty_override_falls_back_to_default() {
        let config = EdgeConfig::default();
        let origin = config.resolve_origin_with(|_| Some(String::new())).unwrap();
        assert_eq!(origin.as_str(), DEFAULT_BACKEND_ORIGIN);
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = EdgeConfig {
            backend_origin: "https://backend.example.com///".to_string(),
            ..EdgeConfig::default()
        };
        let origin = config.resolve_origin_with(|_| None).unwrap();
        assert_eq!(origin.as_str(), "https://backend.example.com");

        let origin = config
            .resolve_origin_with(|_| Some("http://localhost:8000/".to_string()))
            .unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8000");
    }

    #[test]
    fn test_origin_rejects_bad_values() {
        assert!(BackendOrigin::parse("not a url").is_err());
        assert!(BackendOrigin::parse("ftp://files.example.com").is_err());
        assert!(BackendOrigin::parse("https://example.com/?debug=1").is_err());

        let err = BackendOrigin::parse("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("only http and https"));
    }

    #[test]
    fn test_origin_keeps_path() {
        let origin = BackendOrigin::parse("https://example.com/backend/").unwrap();
        assert_eq!(origin.as_str(), "https://example.com/backend");
        assert_eq!(origin.to_string(), "https://example.com/backend");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [edge]
            listen_addr = "0.0.0.0:3000"
            header_allow_list = ["accept", "content-type", "authorization"]
            "#,
        )
        .unwrap();

        assert_eq!(config.edge.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.edge.backend_origin, DEFAULT_BACKEND_ORIGIN);
        assert_eq!(
            config.edge.header_allow_list.as_deref(),
            Some(
                &[
                    "accept".to_string(),
                    "content-type".to_string(),
                    "authorization".to_string()
                ][..]
            )
        );
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.edge.route_prefix, "/api");
        assert_eq!(config.edge.timeout_secs, None);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = Config::from_toml_str("[edge\nlisten_addr = 1").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_validate_routes() {
        assert!(EdgeConfig::default().validate().is_ok());

        let config = EdgeConfig {
            query_route: "api/proxy".to_string(),
            ..EdgeConfig::default()
        };
        assert!(config.validate().is_err());

        for query_route in ["/api/{name}", "/api/:proxy", "/api/*rest"] {
            let config = EdgeConfig {
                query_route: query_route.to_string(),
                ..EdgeConfig::default()
            };
            assert!(config.validate().is_err(), "{query_route}");
        }

        let config = EdgeConfig {
            query_route: "/api/proxy:v2".to_string(),
            ..EdgeConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
