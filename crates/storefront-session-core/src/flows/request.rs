//! Reading the incoming request URL.

use url::Url;

use crate::models::CredentialToken;

/// Query parameter both entry routes carry the credential in
const TOKEN_PARAM: &str = "token";

/// Origin used to resolve bare paths such as `/auth/callback?token=..`
const LOCAL_ORIGIN: &str = "http://localhost/";

/// Parse a request given either as an absolute URL or as a path with query.
pub fn request_url(input: &str) -> Result<Url, url::ParseError> {
    Url::parse(input).or_else(|_| Url::parse(LOCAL_ORIGIN)?.join(input))
}

/// The first `token` query value, if it is non-empty.
pub fn extract_token(request: &Url) -> Option<CredentialToken> {
    request
        .query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .and_then(|(_, value)| CredentialToken::new(value.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(input: &str) -> Option<String> {
        extract_token(&request_url(input).unwrap()).map(CredentialToken::into_inner)
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(token_of("https://shop.test/verify?token=abc123").as_deref(), Some("abc123"));
        assert_eq!(token_of("/auth/callback?state=x&token=abc123").as_deref(), Some("abc123"));
        assert_eq!(token_of("/auth/callback?token=a%2Bb%3D").as_deref(), Some("a+b="));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(token_of("/verify"), None);
        assert_eq!(token_of("/verify?token="), None);
        assert_eq!(token_of("/verify?tokens=abc"), None);
    }

    #[test]
    fn test_request_url_resolves_paths() {
        let url = request_url("/verify?token=t").unwrap();
        assert_eq!(url.path(), "/verify");
        assert_eq!(url.host_str(), Some("localhost"));
    }
}
