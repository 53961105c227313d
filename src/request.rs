//! The request value describing one download.
//!
//! The CLI layer converts all of its flag state into a single immutable
//! [`DownloadRequest`] at the boundary; the library never reads ambient
//! configuration. The request is owned by the chosen strategy for the life
//! of one `download()` call.

use std::fmt;
use std::path::PathBuf;

/// How the folder is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Walk the hosting provider's contents API and download file by file.
    Api,
    /// Drive a disposable local repository through git sparse-checkout.
    Sparse,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Api => "api",
            Method::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hosting provider a repository lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Github,
    /// A provider tag gitpluck has no API strategy for. The tag is kept
    /// verbatim so the selector can name it in diagnostics.
    Unknown(String),
}

impl Provider {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "github" => Provider::Github,
            _ => Provider::Unknown(tag.to_string()),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Github => f.write_str("github"),
            Provider::Unknown(tag) => f.write_str(tag),
        }
    }
}

/// Everything one download needs to know. Immutable once built.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Location of the remote repository, e.g. `https://github.com/owner/repo`.
    pub repo_url: String,
    /// Repository-relative path of the folder to fetch.
    pub subdir: String,
    /// Where the folder's contents end up on the local disk.
    pub output_dir: PathBuf,
    /// Branch, tag, or ref to fetch; the remote's default branch when absent.
    pub branch: Option<String>,
    /// Access token for private repositories or higher API rate limits.
    pub token: Option<String>,
    pub method: Method,
    pub provider: Provider,
    /// Suppress progress narration.
    pub quiet: bool,
}
