//! Typed client for the DevQuest backend API
//!
//! Every call returns `Option<T>`: a network failure, a non-2xx status or a
//! body that does not decode into `T` all yield `None` (logged at debug). The
//! caller decides what to show instead; see [`fallback`].

pub mod fallback;
pub mod types;

use reqwest::{RequestBuilder, header, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use devquest_edge::config::EdgeConfig;

use crate::error::{CliError, CliResult};

pub use types::*;

/// API base reached through a locally running edge relay
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8787/api";

/// Environment variable that overrides [`DEFAULT_API_URL`]
pub const API_URL_ENV: &str = "DEVQUEST_API_URL";

/// API base served by an edge relay running with `config`
///
/// Wildcard listen addresses are reached through loopback.
pub fn api_url_for_edge(config: &EdgeConfig) -> String {
    let addr = config.listen_addr.trim();
    let addr = if let Some(port) = addr.strip_prefix("0.0.0.0:") {
        format!("127.0.0.1:{port}")
    } else if let Some(port) = addr.strip_prefix("[::]:") {
        format!("[::1]:{port}")
    } else {
        addr.to_string()
    };
    format!("http://{}{}", addr, config.route_prefix.trim_end_matches('/'))
}

pub struct ApiClient {
    base_url: String,
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> CliResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Self::with_client(base_url, http)
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(base_url: &str, http: reqwest::Client) -> CliResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CliError(format!(
                "API URL must start with http:// or https://: {base_url}"
            )));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| CliError(format!("Invalid API URL '{base_url}': {e}")))?;
        Ok(Self {
            base_url,
            base,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// API URL with each segment percent-encoded as a single path segment
    fn segments_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Option<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request to {path} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Request to {path} returned {status}");
            return None;
        }

        match response.json::<T>().await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Unexpected response body from {path}: {e}");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.fetch(self.get(path), path).await
    }

    // -------------------------------------------------------------------------
    // Gamification
    // -------------------------------------------------------------------------

    pub async fn profile(&self) -> Option<Profile> {
        self.get_json("/gamification/profile").await
    }

    pub async fn skills(&self) -> Option<SkillsResponse> {
        self.get_json("/gamification/skills").await
    }

    pub async fn achievements(&self) -> Option<AchievementsResponse> {
        self.get_json("/gamification/achievements").await
    }

    pub async fn weekly_summary(&self) -> Option<WeeklySummary> {
        self.get_json("/gamification/weekly-summary").await
    }

    // -------------------------------------------------------------------------
    // GitHub
    // -------------------------------------------------------------------------

    pub async fn repos(&self) -> Option<ReposResponse> {
        self.get_json("/github/repos").await
    }

    /// Raw repository details as returned by the backend
    pub async fn repo_detail(&self, owner: &str, repo: &str) -> Option<serde_json::Value> {
        let url = self.segments_url(&["github", "repos", owner, repo]);
        let path = url.path().to_string();
        let request = self
            .http
            .get(url)
            .header(header::CONTENT_TYPE, "application/json");
        self.fetch(request, &path).await
    }

    pub async fn analyze_repo(&self, owner: &str, repo: &str) -> Option<AnalyzeRepoResponse> {
        let url = self.segments_url(&["github", "repos", owner, repo, "analyze"]);
        let path = url.path().to_string();
        let request = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json");
        self.fetch(request, &path).await
    }

    pub async fn github_profile(&self) -> Option<serde_json::Value> {
        self.get_json("/github/profile").await
    }

    pub async fn quest_stats(&self) -> Option<QuestStats> {
        self.get_json("/github/quest-stats").await
    }

    // -------------------------------------------------------------------------
    // CV
    // -------------------------------------------------------------------------

    /// Upload a CV as the multipart `file` field
    pub async fn upload_cv(&self, file_name: &str, bytes: Vec<u8>) -> Option<CvAnalysis> {
        let path = "/cv/upload";
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let request = self.http.post(self.url(path)).multipart(form);
        self.fetch(request, path).await
    }

    pub async fn cv_analysis(&self) -> Option<CvAnalysis> {
        self.get_json("/cv/analysis").await
    }

    // -------------------------------------------------------------------------
    // Oracle
    // -------------------------------------------------------------------------

    pub async fn chat(&self, message: &str) -> Option<ChatReply> {
        let path = "/oracle/chat";
        let request = self.http.post(self.url(path)).json(&ChatRequest {
            message: message.to_string(),
        });
        self.fetch(request, path).await
    }

    // -------------------------------------------------------------------------
    // Blog
    // -------------------------------------------------------------------------

    pub async fn blog_posts(&self) -> Option<BlogPostList> {
        self.get_json("/blog/posts").await
    }

    pub async fn blog_post(&self, id: i64) -> Option<BlogPost> {
        self.get_json(&format!("/blog/posts/{id}")).await
    }

    pub async fn create_blog_post(&self, draft: &BlogPostDraft) -> Option<BlogPost> {
        let path = "/blog/posts";
        let request = self.http.post(self.url(path)).json(draft);
        self.fetch(request, path).await
    }

    pub async fn update_blog_post(&self, id: i64, draft: &BlogPostDraft) -> Option<BlogPost> {
        let path = format!("/blog/posts/{id}");
        let request = self.http.put(self.url(&path)).json(draft);
        self.fetch(request, &path).await
    }

    /// Returns `Some(true)` once the backend confirms the deletion
    pub async fn delete_blog_post(&self, id: i64) -> Option<bool> {
        let path = format!("/blog/posts/{id}");
        let request = self
            .http
            .delete(self.url(&path))
            .header(header::CONTENT_TYPE, "application/json");
        self.fetch::<DeleteResponse>(request, &path)
            .await
            .map(|r| r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:8787/api/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8787/api");
        assert_eq!(
            client.url("/github/repos"),
            "http://127.0.0.1:8787/api/github/repos"
        );
    }

    #[test]
    fn test_api_url_for_edge() {
        let config = EdgeConfig::default();
        assert_eq!(api_url_for_edge(&config), DEFAULT_API_URL);

        let config = EdgeConfig {
            listen_addr: "0.0.0.0:3000".to_string(),
            route_prefix: "/edge/".to_string(),
            ..EdgeConfig::default()
        };
        assert_eq!(api_url_for_edge(&config), "http://127.0.0.1:3000/edge");
    }

    #[test]
    fn test_base_url_requires_http_scheme() {
        assert!(ApiClient::new("127.0.0.1:8787/api").is_err());
        assert!(ApiClient::new("https://devquest.example/api").is_ok());
        assert!(ApiClient::new("http://").is_err());
    }

    #[test]
    fn test_segments_url_encodes_each_segment() {
        let client = ApiClient::new("http://127.0.0.1:8787/api").unwrap();
        let url = client.segments_url(&["github", "repos", "me", "dev?quest#x"]);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8787/api/github/repos/me/dev%3Fquest%23x"
        );

        let url = client.segments_url(&["github", "repos", "me/other", "devquest"]);
        assert_eq!(url.path(), "/api/github/repos/me%2Fother/devquest");
    }

    #[test]
    fn test_segments_url_without_base_path() {
        let client = ApiClient::new("https://devquest.example").unwrap();
        let url = client.segments_url(&["github", "repos", "me", "devquest"]);
        assert_eq!(url.as_str(), "https://devquest.example/github/repos/me/devquest");
    }
}
