//! Pull request creation over the GitHub REST API.
//!
//! Transient failures are retried with exponential backoff:
//! 3 retries with 2s, 4s, 8s delays by default. A transient failure is a
//! transport error (connect, timeout) or a 5xx response. Anything else is
//! returned immediately.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

/// Default GitHub API root.
pub const API_URL: &str = "https://api.github.com";

/// Environment variable holding the API token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Header line of every pull request description.
pub const DESCRIPTION_HEADER: &str = "Changes applied by commit-cannon:\n";

/// URL of GitHub's "open a pull request" page for `branch`.
pub fn new_pull_request_url(repo: &str, branch: &str) -> String {
    format!("https://github.com/{repo}/pull/new/{branch}")
}

/// Build a pull request body listing each action message in order.
pub fn pull_request_description<S: AsRef<str>>(messages: &[S]) -> String {
    let mut desc = String::from(DESCRIPTION_HEADER);
    for message in messages {
        desc.push_str("  * ");
        desc.push_str(message.as_ref());
        desc.push('\n');
    }
    desc
}

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Cap for exponential growth.
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
        backoff_multiplier: 2.0,
    };

    /// No retries at all.
    pub const NONE: Self = Self {
        max_retries: 0,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        backoff_multiplier: 1.0,
    };

    /// Delay before retry `attempt` (0-indexed):
    /// `initial_delay * backoff_multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Serialize)]
struct PullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

enum Attempt {
    Done(String),
    Transient(Error),
    Permanent(Error),
}

/// Blocking GitHub API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    api_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl Client {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("cannon/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            retry: RetryConfig::DEFAULT,
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Open a pull request from `branch` into `base` and return its URL.
    pub fn create_pull_request(
        &self,
        token: &CancellationToken,
        repo: &str,
        base: &str,
        branch: &str,
        description: &str,
    ) -> Result<String> {
        let url = format!("{}/repos/{}/pulls", self.api_url, repo);
        let body = PullRequestBody {
            title: branch,
            head: branch,
            base,
            body: description,
        };

        let mut attempt = 0;
        loop {
            token.check()?;
            debug!("{repo}: creating pull request (attempt {})", attempt + 1);
            match self.try_create(&url, repo, &body) {
                Attempt::Done(html_url) => return Ok(html_url),
                Attempt::Permanent(e) => return Err(e),
                Attempt::Transient(e) if attempt >= self.retry.max_retries => return Err(e),
                Attempt::Transient(e) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!("{repo}: {e}; retrying in {:.1}s", delay.as_secs_f64());
                    sleep(token, delay)?;
                    attempt += 1;
                }
            }
        }
    }

    fn try_create(&self, url: &str, repo: &str, body: &PullRequestBody<'_>) -> Attempt {
        let mut request = self
            .http
            .post(url)
            .header("Accept", "application/vnd.github.v3+json")
            .json(body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = match request.send() {
            Ok(r) => r,
            Err(e) if e.is_connect() || e.is_timeout() => return Attempt::Transient(e.into()),
            Err(e) => return Attempt::Permanent(e.into()),
        };

        let status = response.status();
        if status == reqwest::StatusCode::CREATED {
            return match response.json::<PullRequestResponse>() {
                Ok(r) => Attempt::Done(r.html_url),
                Err(e) => Attempt::Permanent(e.into()),
            };
        }

        let error = Error::GitHub {
            repo: repo.to_string(),
            status: status.as_u16(),
            message: error_message(response.text().unwrap_or_default()),
        };
        if status.is_server_error() {
            Attempt::Transient(error)
        } else {
            Attempt::Permanent(error)
        }
    }
}

/// Sleep for `delay` in short slices, giving up once `token` is cancelled.
fn sleep(token: &CancellationToken, delay: Duration) -> Result<()> {
    const SLICE: Duration = Duration::from_millis(50);
    let deadline = Instant::now() + delay;
    loop {
        token.check()?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        thread::sleep(SLICE.min(deadline - now));
    }
}

/// GitHub error bodies are `{"message": ...}`; fall back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or(body)
}
