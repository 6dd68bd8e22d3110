//! `reqwest`-backed statistics source.
//!
//! Fast source: `GET {languages_api}/repos/{owner}/{repo}/languages`.
//! Precise source: `GET {loc_api}/v1/loc?github={owner}/{repo}`.
//! Anything but a 200 response with a JSON body of the expected shape is a
//! fetch failure. Requests are never retried.

use async_trait::async_trait;
use codecount_core::{
    decode_language_bytes, decode_precise_records, FetchError, FetchResult, LanguageBytes,
    PreciseRecord, RepoId, StatsSource,
};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::HttpSourceError;
use crate::Result;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// HTTP client for both statistics sources
pub struct HttpStatsSource {
    config: SourceConfig,
    http_client: reqwest::Client,
}

impl HttpStatsSource {
    /// Create a new source client
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(HttpSourceError::Client)?;

        Ok(HttpStatsSource {
            config,
            http_client,
        })
    }

    /// Create a source client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(SourceConfig::from_env())
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn languages_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/languages",
            self.config.languages_api.trim_end_matches('/'),
            repo.owner,
            repo.repo
        )
    }

    pub fn loc_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/v1/loc?github={}",
            self.config.loc_api.trim_end_matches('/'),
            repo.slug()
        )
    }

    /// Send a request and return the body of a 200 response.
    async fn fetch_body(&self, request: reqwest::RequestBuilder) -> FetchResult<String> {
        let response = request.send().await.map_err(FetchError::network)?;
        let status = response.status();
        check_response(status, response.text().await)
    }
}

/// Classify a response by status and body read result.
///
/// A non-200 status is reported as such even when its body could not be
/// read.
fn check_response<E: std::fmt::Display>(
    status: StatusCode,
    body: std::result::Result<String, E>,
) -> FetchResult<String> {
    let body = match body {
        Ok(body) => body,
        Err(e) if status != StatusCode::OK => {
            debug!(status = status.as_u16(), error = %e, "error body unreadable");
            return Err(FetchError::status(status.as_u16(), ""));
        }
        Err(e) => return Err(FetchError::network(e)),
    };
    debug!(status = status.as_u16(), bytes = body.len(), "response received");

    if status != StatusCode::OK {
        return Err(FetchError::status(status.as_u16(), &body));
    }
    Ok(body)
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn fetch_languages(&self, repo: &RepoId) -> FetchResult<LanguageBytes> {
        let url = self.languages_url(repo);
        debug!(url = %url, "fetching language bytes");

        let mut request = self.http_client.get(&url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.config.github_token {
            request = request.bearer_auth(token);
        }
        let body = self.fetch_body(request).await?;
        decode_language_bytes(&body)
    }

    async fn fetch_precise(&self, repo: &RepoId) -> FetchResult<Vec<PreciseRecord>> {
        let url = self.loc_url(repo);
        debug!(url = %url, "fetching precise counts");

        let body = self.fetch_body(self.http_client.get(&url)).await?;
        decode_precise_records(&body)
    }
}
