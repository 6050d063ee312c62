//! Connection settings for the backend API.

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the backend lives and how to authenticate.
///
/// `Debug` redacts the token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let cfg = ClientConfig::new("http://localhost:8000/");
        assert_eq!(cfg.base_url, "http://localhost:8000");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::default().with_token(Some("s3cret".into()));
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn blank_token_is_none() {
        let cfg = ClientConfig::default().with_token(Some("  ".into()));
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn zero_timeout_bumped() {
        assert_eq!(ClientConfig::default().with_timeout_secs(0).timeout_secs, 1);
    }
}
