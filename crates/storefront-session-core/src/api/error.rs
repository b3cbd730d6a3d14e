use thiserror::Error;

/// Maximum length for error response bodies kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token present in the request")]
    MissingToken,

    #[error("Rejected by identity service: {}", rejection_message(.status, .body))]
    RemoteRejection { status: u16, body: String },

    #[error("Network error: {0}")]
    TransportFailure(String),
}

fn rejection_message(status: impl std::fmt::Display, body: &str) -> String {
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

/// Truncate a response body to avoid carrying excessive data around
fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl AuthError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        AuthError::RemoteRejection {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }

    /// Response body of a rejection, if the server sent one
    pub fn server_body(&self) -> Option<&str> {
        match self {
            AuthError::RemoteRejection { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// One-shot text to show the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingToken => "Sign-in link is missing its token".to_string(),
            AuthError::RemoteRejection { status, body } => rejection_message(status, body),
            AuthError::TransportFailure(_) => {
                "Unable to reach the server. Check your internet connection.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::TransportFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_rejection_uses_body_verbatim() {
        let err = AuthError::from_status(StatusCode::UNAUTHORIZED, "Token expired\n");
        assert_eq!(err.user_message(), "Token expired");
        assert_eq!(err.server_body(), Some("Token expired"));
    }

    #[test]
    fn test_rejection_without_body_falls_back_to_status() {
        let err = AuthError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), "HTTP 500");
        assert_eq!(err.server_body(), None);
        assert_eq!(err.to_string(), "Rejected by identity service: HTTP 500");
    }

    #[test]
    fn test_long_body_truncated_on_char_boundary() {
        let body = "é".repeat(400); // 800 bytes
        let err = AuthError::from_status(StatusCode::BAD_REQUEST, &body);
        let message = err.user_message();
        assert!(message.starts_with(&"é".repeat(250)));
        assert!(message.ends_with("(truncated, 800 total bytes)"));
    }

    #[test]
    fn test_transport_failure_has_generic_message() {
        let err = AuthError::TransportFailure("connection refused".to_string());
        assert!(err.user_message().contains("Unable to reach the server"));
        assert_eq!(err.server_body(), None);
    }
}
