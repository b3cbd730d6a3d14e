//! HTTP client for the remote identity service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use super::AuthError;
use crate::models::CredentialToken;

/// Email verification endpoint (magic links)
const VERIFY_PATH: &str = "/api/auth/verify";

/// Current-user profile endpoint
const CURRENT_USER_PATH: &str = "/api/auth/me";

/// Result of a successful verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyResponse {
    /// Message supplied by the server, if any
    pub message: Option<String>,
}

/// The two calls the session flows need from the identity service.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Submit an emailed verification token. Any 2xx is a success.
    async fn verify(&self, token: &CredentialToken) -> Result<VerifyResponse, AuthError>;

    /// Fetch the profile for a bearer token. The raw body is returned; it may
    /// be a bare user object or wrapped in a `data` envelope.
    async fn fetch_current_user(&self, token: &CredentialToken) -> Result<Value, AuthError>;
}

/// Identity client over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::from_status(status, &body))
        }
    }
}

/// Pull a human-readable message out of a success body: a JSON `message`
/// field if there is one, otherwise the text itself.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Ok(Value::String(text)) => Some(text),
        _ => Some(body.to_string()),
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn verify(&self, token: &CredentialToken) -> Result<VerifyResponse, AuthError> {
        let response = self
            .client
            .get(self.url(VERIFY_PATH))
            .query(&[("token", token.as_str())])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Verification accepted");

        Ok(VerifyResponse {
            message: extract_message(&body),
        })
    }

    async fn fetch_current_user(&self, token: &CredentialToken) -> Result<Value, AuthError> {
        let response = self
            .client
            .get(self.url(CURRENT_USER_PATH))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            AuthError::TransportFailure(format!("Failed to parse profile response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message(""), None);
        assert_eq!(extract_message("  \n"), None);
        assert_eq!(
            extract_message(r#"{"message": "Email verified"}"#).as_deref(),
            Some("Email verified")
        );
        assert_eq!(extract_message(r#"{"ok": true}"#), None);
        assert_eq!(extract_message(r#""quoted""#).as_deref(), Some("quoted"));
        assert_eq!(extract_message("Verified!").as_deref(), Some("Verified!"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpIdentityClient::new("https://shop.test/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url(CURRENT_USER_PATH), "https://shop.test/api/auth/me");
    }
}
