//! # Download Strategies
//!
//! Two structurally different acquisition mechanisms satisfy the same
//! [`Downloader`] contract:
//!
//! - [`GithubApiDownloader`] walks the GitHub contents API and downloads
//!   file by file.
//! - [`SparseCheckoutDownloader`] drives a disposable local repository
//!   through git's sparse-checkout protocol and copies the subtree out.
//!
//! [`for_request`] is the pure mapping from (method, provider) to a
//! strategy instance bound to the request. Adding a provider to the API
//! path means adding a match arm here, nothing more.

mod api;
mod sparse;

pub use api::GithubApiDownloader;
pub use sparse::SparseCheckoutDownloader;

use crate::error::{Error, Result};
use crate::request::{DownloadRequest, Method, Provider};

/// A download strategy bound to one request.
pub trait Downloader: std::fmt::Debug {
    /// Fetch the requested folder into the output directory.
    ///
    /// On success the output directory holds exactly the files that exist
    /// under the requested folder at the resolved ref. The first failure
    /// at any depth aborts the whole call; partial output is not rolled
    /// back.
    fn download(&self) -> Result<()>;
}

/// Select the strategy for a request.
pub fn for_request(request: DownloadRequest) -> Result<Box<dyn Downloader>> {
    match request.method {
        Method::Sparse => Ok(Box::new(SparseCheckoutDownloader::new(request))),
        Method::Api => match request.provider {
            Provider::Github => Ok(Box::new(GithubApiDownloader::new(request)?)),
            Provider::Unknown(tag) => Err(Error::UnsupportedCombination {
                method: Method::Api.to_string(),
                provider: tag,
            }),
        },
    }
}
