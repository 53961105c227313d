//! # Error Handling
//!
//! Centralized error type for gitpluck, built with `thiserror`. Every
//! failure that can escape a download strategy is normalized into one
//! variant of [`Error`] before it crosses the library boundary, so the
//! caller can always render a complete one-line message (plus an optional
//! remediation hint) without further context.
//!
//! The module also hosts the two classifier functions that perform that
//! normalization:
//!
//! - [`from_transport`] maps an HTTP status code and response body from the
//!   GitHub API onto the taxonomy.
//! - [`from_process`] maps a failed `git` invocation (exit status plus
//!   captured stderr) onto the taxonomy by substring matching.
//!
//! Substring matching over stderr is a best-effort heuristic — the text
//! varies with git version and locale — which is why it lives behind a
//! pure function with a unit-tested matching table instead of being
//! scattered through the protocol code.

use thiserror::Error;

use crate::git::CommandFailure;

/// Main error type for gitpluck operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository location did not match the expected GitHub URL shape.
    #[error("Not a recognized GitHub repository URL: {location}\n  hint: expected something like https://github.com/owner/repo")]
    InvalidLocation { location: String },

    /// No download strategy exists for the requested (method, provider) pair.
    #[error("No download strategy for method '{method}' with provider '{provider}'\n  hint: the 'api' method currently supports the 'github' provider only")]
    UnsupportedCombination { method: String, provider: String },

    /// The git binary could not be found on this system.
    #[error("Git is not installed on this system\n  hint: install git to use the sparse-checkout method, or retry with --method api")]
    ToolNotInstalled,

    /// The repository itself does not exist or is not visible.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    ResourceNotFound {
        message: String,
        hint: Option<String>,
    },

    /// The repository exists but the requested folder does not.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    PathNotFound {
        message: String,
        hint: Option<String>,
    },

    /// The requested branch, tag, or ref does not exist in the repository.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    RefNotFound {
        message: String,
        hint: Option<String>,
    },

    /// Access was denied, either anonymously or with the supplied token.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    AuthenticationRequired {
        message: String,
        hint: Option<String>,
    },

    /// The GitHub API refused the request because the rate limit was hit.
    #[error("GitHub API rate limit exceeded\n  hint: pass --token to authenticate and raise the rate limit")]
    RateLimitExceeded,

    /// A network-level failure: connection refused, DNS, request timeout.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    NetworkFailure {
        message: String,
        hint: Option<String>,
    },

    /// A git invocation exceeded its deadline and was killed.
    #[error("Git command '{command}' exceeded the {}s deadline and was terminated", elapsed.as_secs())]
    DeadlineExceeded {
        command: String,
        elapsed: std::time::Duration,
    },

    /// The GitHub API answered with a body that is not a directory listing.
    #[error("Could not parse the GitHub API response: {message}")]
    ResponseParseFailure { message: String },

    /// A git invocation failed in a way the matching table does not cover.
    /// Carries the raw stderr as the hint rather than swallowing it.
    #[error("{message}{}", hint.as_ref().map(|h| format!("\n  hint: {h}")).unwrap_or_default())]
    ToolCommandFailed {
        message: String,
        hint: Option<String>,
    },

    /// The GitHub API answered with a status the matching table does not
    /// cover. Carries the raw status and body.
    #[error("GitHub API error ({status}): {body}")]
    ProviderError { status: u16, body: String },

    /// A token was supplied together with a remote URL whose scheme cannot
    /// carry one.
    #[error("A token was provided but a '{scheme}' remote cannot carry one\n  hint: tokens are only embedded into https:// remote URLs; rely on git's own credential handling for other remotes")]
    UnsupportedAuthScheme { scheme: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

const TOKEN_HINT: &str = "pass --token to provide a GitHub token with access to the repository";

/// Classify a non-success GitHub API response.
///
/// The body is consulted for the ambiguous statuses: a 403 can be either a
/// rate limit or a permission problem, and a 404 can mean the repository
/// itself is missing or only the requested path inside it.
pub fn from_transport(status: u16, body: &str) -> Error {
    let lowered = body.to_lowercase();

    match status {
        401 => Error::AuthenticationRequired {
            message: "Authentication required to access this repository".to_string(),
            hint: Some(TOKEN_HINT.to_string()),
        },
        403 if lowered.contains("rate limit exceeded") => Error::RateLimitExceeded,
        403 => Error::AuthenticationRequired {
            message: "Access forbidden to this repository or resource".to_string(),
            hint: Some("check that your token has the required permissions".to_string()),
        },
        404 if lowered.contains("not found") => Error::ResourceNotFound {
            message: "Repository or path not found".to_string(),
            hint: Some("check that the repository URL and folder path are correct".to_string()),
        },
        404 => Error::PathNotFound {
            message: "Path not found in repository".to_string(),
            hint: Some("check that the folder exists in the requested branch".to_string()),
        },
        _ => Error::ProviderError {
            status,
            body: body.trim().to_string(),
        },
    }
}

/// Classify a failed git invocation.
///
/// Timed-out commands are reported as such before any text matching. The
/// substring table is ordered: earlier patterns win over later ones, which
/// resolves overlaps like the "pathspec ... did not match" phrasing.
pub fn from_process(failure: &CommandFailure, context: &str) -> Error {
    if failure.timed_out {
        return Error::DeadlineExceeded {
            command: failure.command.clone(),
            elapsed: failure.elapsed,
        };
    }

    let stderr = failure.stderr.to_lowercase();

    if stderr.contains("repository not found") {
        Error::ResourceNotFound {
            message: "Repository not found".to_string(),
            hint: Some("check that the repository URL is correct".to_string()),
        }
    } else if stderr.contains("could not find remote branch")
        || (stderr.contains("pathspec") && stderr.contains("did not match"))
    {
        Error::RefNotFound {
            message: "Branch or reference not found".to_string(),
            hint: Some("check that the branch or ref exists in the repository".to_string()),
        }
    } else if stderr.contains("authentication failed")
        || stderr.contains("authorization failed")
        || stderr.contains("could not read from remote repository")
    {
        Error::AuthenticationRequired {
            message: "Authentication required to access this repository".to_string(),
            hint: Some(TOKEN_HINT.to_string()),
        }
    } else if stderr.contains("failed to connect") || stderr.contains("could not resolve host") {
        Error::NetworkFailure {
            message: "Failed to connect to the remote repository".to_string(),
            hint: Some("check your internet connection and try again".to_string()),
        }
    } else {
        let stderr = failure.stderr.trim();
        Error::ToolCommandFailed {
            message: format!("Git operation failed: {context} ({})", failure.describe()),
            hint: if stderr.is_empty() {
                None
            } else {
                Some(stderr.to_string())
            },
        }
    }
}
