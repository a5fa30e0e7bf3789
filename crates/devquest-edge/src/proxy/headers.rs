//! Request and response header filtering

use axum::http::{HeaderMap, HeaderName, header};

use crate::config::EdgeConfig;
use crate::error::{EdgeError, Result};

/// Connection-level headers that never cross the relay in either direction
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "proxy-connection",
    "te",
    "upgrade",
];

/// Allow-list used by `--restrict-headers`
pub const DEFAULT_ALLOW_LIST: &[&str] = &["accept", "content-type", "authorization"];

/// Which inbound request headers are forwarded upstream
///
/// `host` is never forwarded in either mode; the HTTP client derives it from
/// the backend URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Forward everything except `host` (and `content-length` if requested)
    ForwardAll { strip_content_length: bool },
    /// Forward only the named headers
    AllowList(Vec<HeaderName>),
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::ForwardAll {
            strip_content_length: true,
        }
    }
}

impl HeaderPolicy {
    pub fn from_config(config: &EdgeConfig) -> Result<Self> {
        match &config.header_allow_list {
            Some(names) => Self::allow_list(names),
            None => Ok(Self::ForwardAll {
                strip_content_length: config.strip_content_length,
            }),
        }
    }

    /// Build an allow-list policy, validating every header name
    pub fn allow_list<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut parsed = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim().to_ascii_lowercase();
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| EdgeError::Config(format!("Invalid header name '{name}': {e}")))?;
            if !parsed.contains(&header_name) {
                parsed.push(header_name);
            }
        }
        Ok(Self::AllowList(parsed))
    }

    /// Select the inbound headers to send upstream
    pub fn request_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut forwarded = HeaderMap::new();
        for (name, value) in inbound.iter() {
            if name == header::HOST || is_hop_by_hop(name) {
                continue;
            }
            let keep = match self {
                Self::ForwardAll {
                    strip_content_length,
                } => !(*strip_content_length && name == header::CONTENT_LENGTH),
                Self::AllowList(allowed) => allowed.contains(name),
            };
            if keep {
                forwarded.append(name.clone(), value.clone());
            }
        }
        forwarded
    }

    pub fn describe(&self) -> String {
        match self {
            Self::ForwardAll {
                strip_content_length: true,
            } => "all except host, content-length".to_string(),
            Self::ForwardAll {
                strip_content_length: false,
            } => "all except host".to_string(),
            Self::AllowList(names) => names
                .iter()
                .map(HeaderName::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Select the upstream response headers to relay back to the caller
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();
    for (name, value) in upstream.iter() {
        if !is_hop_by_hop(name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}
