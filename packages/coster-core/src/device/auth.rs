//! Session token retrieval.
//!
//! The controller serves its root page over HTTPS with an unverified
//! certificate and embeds a short-lived `token=...` value in the HTML. That
//! token is required to open the WebSocket. The device ships a self-signed
//! certificate, so it is not verified.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;

use crate::error::{AuthError, AuthResult};
use crate::state::CoordinatorConfig;

/// Source of session tokens.
///
/// The coordinator depends on this trait so tests can supply fixed tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtains a fresh token for one connection attempt.
    async fn fetch_token(&self) -> AuthResult<String>;
}

/// Fetches the token from the controller root page over insecure TLS.
pub struct HttpTokenProvider {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpTokenProvider {
    /// Creates a provider for the controller described by `config`.
    ///
    /// # Errors
    /// Returns `AuthError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CoordinatorConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            url: config.root_url(),
            timeout: Duration::from_secs(config.auth_timeout_secs),
        })
    }
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn fetch_token(&self) -> AuthResult<String> {
        log::debug!("[Auth] GET {}", self.url);

        let res = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        match extract_token(&body) {
            Some(token) => Ok(token),
            None if !status.is_success() => Err(AuthError::HttpStatus(status.as_u16())),
            None => Err(AuthError::TokenNotFound),
        }
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    // SAFETY: the pattern is a valid literal
    TOKEN_RE.get_or_init(|| Regex::new(r"token=([A-Za-z0-9._-]+)").expect("token pattern is valid"))
}

/// Extracts the first `token=<chars>` value from the controller page.
///
/// Token characters are ASCII alphanumerics, `.`, `_` and `-`.
#[must_use]
pub fn extract_token(html: &str) -> Option<String> {
    token_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_script() {
        let html = r#"<html><script>var url = "/ws?token=abc123.def-456";</script></html>"#;
        assert_eq!(extract_token(html).as_deref(), Some("abc123.def-456"));
    }

    #[test]
    fn token_stops_at_first_non_token_char() {
        let html = "location.href='/main?token=Zx_9&lang=en'";
        assert_eq!(extract_token(html).as_deref(), Some("Zx_9"));
    }

    #[test]
    fn first_token_wins() {
        let html = "token=first ... token=second";
        assert_eq!(extract_token(html).as_deref(), Some("first"));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(extract_token("<html><body>Login</body></html>"), None);
        assert_eq!(extract_token("token="), None);
    }

    #[test]
    fn provider_targets_root_page() {
        let provider = HttpTokenProvider::new(&CoordinatorConfig::new("10.0.0.5"))
            .expect("client should build");
        assert_eq!(provider.url, "https://10.0.0.5/");
        assert_eq!(provider.timeout, Duration::from_secs(10));
    }
}
