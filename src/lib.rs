//! # gitpluck
//!
//! Download a single folder from a remote GitHub repository without
//! cloning the whole thing.
//!
//! Two download strategies satisfy the same contract: walking the GitHub
//! contents API file by file, or driving a disposable local repository
//! through git's sparse-checkout protocol. Both take one immutable
//! [`request::DownloadRequest`] and either fill the output directory or
//! return a single classified [`error::Error`] that renders as a complete
//! user-facing message.
//!
//! ## Quick Example
//!
//! ```
//! use gitpluck::download;
//! use gitpluck::request::{DownloadRequest, Method, Provider};
//!
//! let request = DownloadRequest {
//!     repo_url: "https://github.com/rust-lang/log".to_string(),
//!     subdir: "src".to_string(),
//!     output_dir: "log-src".into(),
//!     branch: None,
//!     token: None,
//!     method: Method::Sparse,
//!     provider: Provider::Github,
//!     quiet: true,
//! };
//!
//! let downloader = download::for_request(request).unwrap();
//! // downloader.download() would now fetch src/ into ./log-src
//! ```
//!
//! ## Core Concepts
//!
//! - **Request (`request`)**: the immutable value describing one download;
//!   the only configuration the library accepts.
//! - **Strategies (`download`)**: the `Downloader` trait, its two
//!   implementations, and the pure (method, provider) selector.
//! - **Errors (`error`)**: the closed failure taxonomy plus the two
//!   classifier functions that map HTTP responses and git stderr onto it.
//! - **Plumbing (`git`, `http`, `filesystem`, `workspace`, `output`)**:
//!   deadline-bounded git execution, API client construction, permission-
//!   preserving copies, the self-cleaning temporary workspace, and the
//!   quiet-gated progress sink.

pub mod download;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod http;
pub mod output;
pub mod request;
pub mod workspace;
