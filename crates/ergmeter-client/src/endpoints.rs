//! Logbook URL layout.

/// Production logbook origin.
pub const DEFAULT_BASE_URL: &str = "https://log.concept2.com";

/// URL set for one logbook deployment.
///
/// Configurable so tests can point the client at a local mock server.
#[derive(Debug, Clone)]
pub struct LogbookEndpoints {
    base: String,
}

impl LogbookEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Site origin, used as the `Origin` header on the login post.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Login page; serves the anti-forgery token and accepts the form post.
    #[must_use]
    pub fn login(&self) -> String {
        format!("{}/login", self.base)
    }

    /// Candidate pages carrying the meter totals, tried in order.
    /// Only the training log currently shows them.
    #[must_use]
    pub fn stats_candidates(&self) -> Vec<String> {
        vec![format!("{}/log", self.base)]
    }
}

impl Default for LogbookEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
