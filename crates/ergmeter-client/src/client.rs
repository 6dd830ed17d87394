//! Logbook session client.

use crate::endpoints::LogbookEndpoints;
use crate::error::{ClientError, ClientResult};
use ergmeter_core::{BoxFuture, MeterReading, StatsSource};
use ergmeter_scrape::{extract_meters, find_csrf_token, redact_emails};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// The site rejects default HTTP client identifiers, so every request goes
/// out with a realistic browser string.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/124.0 Safari/537.36";

/// Timeout applied to every request through this client.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Length cap, in characters, for HTML excerpts destined for log lines.
const SNIPPET_CHARS: usize = 800;

/// Logbook account credentials. The password is wiped from memory on drop
/// and never appears in debug output.
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"**REDACTED**")
            .finish()
    }
}

/// Stateful wrapper around one logbook session.
///
/// The HTTP client (and with it the cookie session) lives as long as the
/// instance and is reused across update cycles; the only cycle-relevant
/// state is the `authenticated` flag. One instance per account; sharing the
/// cookie jar across accounts would cross their sessions.
#[derive(Debug)]
pub struct LogbookClient {
    http: Client,
    endpoints: LogbookEndpoints,
    credentials: Credentials,
    authenticated: bool,
}

impl LogbookClient {
    /// Create a client for one account.
    pub fn new(endpoints: LogbookEndpoints, credentials: Credentials) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            credentials,
            authenticated: false,
        })
    }

    /// Whether the last login attempt succeeded and has not been invalidated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Fetch the login page and pull the anti-forgery token out of it.
    async fn fetch_csrf_token(&self) -> Option<String> {
        debug!("fetching login page for anti-forgery token");
        let response = match self.http.get(self.endpoints.login()).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "failed to fetch login page");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!(status = %response.status(), "login page returned unexpected status");
            return None;
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(err) => {
                warn!(error = %err, "failed to read login page body");
                return None;
            }
        };

        let token = find_csrf_token(&html);
        if token.is_none() {
            warn!("anti-forgery token not found on login page");
        }
        token
    }

    /// Log in with the stored credentials.
    ///
    /// Returns `false` (and logs a warning) on any failure: missing token,
    /// rejected credentials, transport error. Never errors outward.
    pub async fn login(&mut self) -> bool {
        let Some(token) = self.fetch_csrf_token().await else {
            warn!("login skipped: no anti-forgery token");
            return false;
        };

        debug!(username = %self.credentials.username(), "submitting login form");
        let form = [
            ("_token", token.as_str()),
            ("username", self.credentials.username()),
            ("password", self.credentials.password()),
        ];
        let result = self
            .http
            .post(self.endpoints.login())
            .header(header::ORIGIN, self.endpoints.base())
            .header(header::REFERER, self.endpoints.login())
            .form(&form)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::OK || status == StatusCode::FOUND {
                    self.authenticated = true;
                    true
                } else {
                    warn!(%status, "login failed");
                    false
                }
            }
            Err(err) => {
                warn!(error = %err, "login request failed");
                false
            }
        }
    }

    /// Fetch the current meter counters.
    ///
    /// Walks the candidate stats pages in order. A 401/403 invalidates the
    /// session and triggers exactly one re-login before moving to the next
    /// candidate; any other failure is recorded and skipped past. Never
    /// errors: an exhausted candidate list yields an empty reading and one
    /// warning naming the last failure.
    pub async fn fetch_stats(&mut self) -> MeterReading {
        if !self.authenticated {
            self.login().await;
        }

        let mut last_failure: Option<String> = None;
        for url in self.endpoints.stats_candidates() {
            debug!(%url, "fetching stats page");
            let response = match self
                .http
                .get(&url)
                .header(header::REFERER, self.endpoints.login())
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    last_failure = Some(format!("request error on {url}: {err}"));
                    debug!(%url, error = %err, "stats request failed");
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                debug!(%status, %url, "session rejected, logging in again");
                self.authenticated = false;
                self.login().await;
                continue;
            }
            if status != StatusCode::OK {
                last_failure = Some(format!("HTTP {status} on {url}"));
                debug!(%status, %url, "stats page returned unexpected status");
                continue;
            }

            let html = match response.text().await {
                Ok(html) => html,
                Err(err) => {
                    last_failure = Some(format!("body read error on {url}: {err}"));
                    debug!(%url, error = %err, "failed to read stats page body");
                    continue;
                }
            };

            let reading = extract_meters(&html);
            if !reading.is_empty() {
                debug!(lifetime = ?reading.lifetime, season = ?reading.season, "meters parsed");
                return reading;
            }

            debug!(%url, snippet = %snippet(&html), "no meters parsed");
            last_failure = Some(format!("no meters parsed on {url}"));
        }

        warn!(
            reason = last_failure.as_deref().unwrap_or("no details"),
            "meter stats not found; site down or markup changed?"
        );
        MeterReading::default()
    }
}

impl StatsSource for LogbookClient {
    fn fetch(&mut self) -> BoxFuture<'_, MeterReading> {
        Box::pin(self.fetch_stats())
    }
}

/// Loggable excerpt of a page: capped and scrubbed of email addresses.
fn snippet(html: &str) -> String {
    let cut: String = html.chars().take(SNIPPET_CHARS).collect();
    redact_emails(&cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("rower", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("rower"));
        assert!(debug.contains("**REDACTED**"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn snippet_caps_and_scrubs() {
        let long = format!("{}rower@example.com", "x".repeat(10));
        let out = snippet(&long);
        assert!(!out.contains("rower@example.com"));

        let oversized = "y".repeat(SNIPPET_CHARS * 2);
        assert_eq!(snippet(&oversized).chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn client_starts_unauthenticated() {
        let client = LogbookClient::new(
            LogbookEndpoints::default(),
            Credentials::new("rower", "secret"),
        )
        .unwrap();
        assert!(!client.is_authenticated());
    }
}
