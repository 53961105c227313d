//! HTTP client construction and GitHub request assembly.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::error::{Error, Result};

pub const USER_AGENT: &str = concat!("gitpluck/", env!("CARGO_PKG_VERSION"));

/// Per-request budget; a stalled response surfaces as a network failure
/// instead of hanging the download.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Build the blocking client every API call goes through.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::NetworkFailure {
            message: format!("Failed to construct the HTTP client: {e}"),
            hint: None,
        })
}

/// A GET request carrying the GitHub API headers, plus the token when one
/// was supplied.
pub fn github_get(client: &Client, url: &str, token: Option<&str>) -> RequestBuilder {
    let mut request = client.get(url).header(ACCEPT, GITHUB_ACCEPT);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("token {token}"));
    }
    request
}

/// Normalize a reqwest transport error. Request timeouts get their own
/// message; everything else keeps the underlying text.
pub fn transport_failure(error: reqwest::Error, what: &str) -> Error {
    if error.is_timeout() {
        Error::NetworkFailure {
            message: format!("{what}: request timed out after {}s", REQUEST_TIMEOUT.as_secs()),
            hint: Some("check your internet connection and try again".to_string()),
        }
    } else {
        Error::NetworkFailure {
            message: format!("{what}: {error}"),
            hint: Some("check your internet connection and try again".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("gitpluck/"));
    }

    #[test]
    fn test_client_builds() {
        assert!(client().is_ok());
    }
}
