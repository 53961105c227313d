//! Sparse-checkout download strategy.
//!
//! Drives a throwaway repository through git's sparse-checkout protocol:
//! the remote is fetched at depth 1 with only the requested folder
//! materialized, then the folder is copied out to the output directory.
//! Works against any host the system git can reach, needs no provider
//! API, and inherits the user's existing git authentication.
//!
//! Every subprocess step shares one deadline budget, and the whole
//! protocol runs inside a [`Workspace`] that is removed no matter how the
//! download ends.

use std::fs;
use std::path::Path;

use url::Url;

use crate::download::Downloader;
use crate::error::{self, Error, Result};
use crate::filesystem;
use crate::git::{self, Deadline, PROTOCOL_DEADLINE};
use crate::output::Progress;
use crate::request::DownloadRequest;
use crate::workspace::Workspace;

#[derive(Debug)]
pub struct SparseCheckoutDownloader {
    request: DownloadRequest,
    progress: Progress,
}

impl SparseCheckoutDownloader {
    pub fn new(request: DownloadRequest) -> Self {
        let progress = Progress::new(request.quiet);
        Self { request, progress }
    }

    fn prepare_repository(&self, dir: &Path, remote: &str, deadline: Deadline) -> Result<()> {
        git::run(dir, &["init"], deadline)
            .map_err(|f| error::from_process(&f, "failed to initialize the repository"))?;
        git::run(dir, &["remote", "add", "origin", remote], deadline)
            .map_err(|f| error::from_process(&f, "failed to add the remote"))?;
        Ok(())
    }

    /// Enable sparse checkout scoped to the requested folder.
    ///
    /// Cone mode via the `sparse-checkout` subcommand is tried first; a git
    /// too old to have it gets the legacy pattern file instead.
    fn configure_sparse_checkout(&self, dir: &Path, deadline: Deadline) -> Result<()> {
        git::run(dir, &["config", "core.sparseCheckout", "true"], deadline)
            .map_err(|f| error::from_process(&f, "failed to enable sparse checkout"))?;

        let modern = git::run(dir, &["sparse-checkout", "init", "--cone"], deadline).and_then(
            |_| git::run(dir, &["sparse-checkout", "set", &self.request.subdir], deadline),
        );

        if let Err(failure) = modern {
            if failure.timed_out {
                return Err(error::from_process(&failure, "failed to set sparse patterns"));
            }
            log::debug!(
                "sparse-checkout subcommand unavailable ({}), writing legacy pattern file",
                failure.describe()
            );
            write_legacy_patterns(dir, &self.request.subdir)?;
        }

        Ok(())
    }

    fn fetch_and_checkout(&self, dir: &Path, deadline: Deadline) -> Result<()> {
        let mut args = vec!["fetch", "--depth=1", "--no-tags", "origin"];
        if let Some(branch) = &self.request.branch {
            args.push(branch);
        }

        self.progress.say("Downloading content from the repository...");
        git::run(dir, &args, deadline)
            .map_err(|f| error::from_process(&f, "failed to fetch from origin"))?;
        git::run(dir, &["checkout", "FETCH_HEAD"], deadline)
            .map_err(|f| error::from_process(&f, "failed to check out the fetched head"))?;
        Ok(())
    }
}

impl Downloader for SparseCheckoutDownloader {
    fn download(&self) -> Result<()> {
        if !git::is_git_installed() {
            return Err(Error::ToolNotInstalled);
        }

        let remote = authenticated_remote(&self.request.repo_url, self.request.token.as_deref())?;
        filesystem::ensure_dir(&self.request.output_dir)?;

        let branch_note = match &self.request.branch {
            Some(branch) => format!("branch: {branch}"),
            None => "default branch".to_string(),
        };
        self.progress.say(format!(
            "Downloading directory {} from {} ({branch_note}) using sparse checkout...",
            self.request.subdir, self.request.repo_url
        ));

        // The workspace lives for this scope; drop removes it on every
        // exit path below, early error returns included.
        let workspace = Workspace::new()?;
        let deadline = Deadline::new(PROTOCOL_DEADLINE);

        self.progress.say("Setting up the repository...");
        self.prepare_repository(workspace.path(), &remote, deadline)?;
        self.configure_sparse_checkout(workspace.path(), deadline)?;
        self.fetch_and_checkout(workspace.path(), deadline)?;

        let fetched = workspace.path().join(&self.request.subdir);
        if !fetched.is_dir() {
            return Err(Error::PathNotFound {
                message: format!(
                    "Directory '{}' not found in the repository",
                    self.request.subdir
                ),
                hint: Some("check that the folder exists at the requested ref".to_string()),
            });
        }

        self.progress.say(format!(
            "Copying files to {}...",
            self.request.output_dir.display()
        ));
        filesystem::copy_dir_all(&fetched, &self.request.output_dir)?;

        self.progress.say("Download completed successfully.");
        Ok(())
    }
}

/// Embed the token into the authority of an `https` remote.
///
/// Only `https` URLs can carry a token this way. Handing a token over with
/// any other kind of location is refused outright rather than silently
/// dropping the credential.
pub(crate) fn authenticated_remote(location: &str, token: Option<&str>) -> Result<String> {
    let Some(token) = token else {
        return Ok(location.to_string());
    };

    match Url::parse(location) {
        Ok(mut parsed) if parsed.scheme() == "https" => {
            parsed
                .set_username(token)
                .map_err(|_| Error::UnsupportedAuthScheme {
                    scheme: parsed.scheme().to_string(),
                })?;
            Ok(parsed.to_string())
        }
        Ok(parsed) => Err(Error::UnsupportedAuthScheme {
            scheme: parsed.scheme().to_string(),
        }),
        // scp-like remotes (git@host:path) are not URLs at all.
        Err(_) => Err(Error::UnsupportedAuthScheme {
            scheme: "scp-like".to_string(),
        }),
    }
}

/// Pattern file contents for gits without the `sparse-checkout`
/// subcommand.
pub(crate) fn legacy_pattern(subdir: &str) -> String {
    format!("{subdir}/**\n")
}

fn write_legacy_patterns(dir: &Path, subdir: &str) -> Result<()> {
    let info_dir = dir.join(".git").join("info");
    fs::create_dir_all(&info_dir)?;
    fs::write(info_dir.join("sparse-checkout"), legacy_pattern(subdir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remote_without_token_is_unchanged() {
        let remote = authenticated_remote("https://github.com/owner/repo.git", None).unwrap();
        assert_eq!(remote, "https://github.com/owner/repo.git");
    }

    #[test]
    fn test_remote_with_token_embeds_into_authority() {
        let remote =
            authenticated_remote("https://github.com/owner/repo.git", Some("s3cret")).unwrap();
        assert_eq!(remote, "https://s3cret@github.com/owner/repo.git");
    }

    #[test]
    fn test_token_with_http_remote_is_refused() {
        let err =
            authenticated_remote("http://github.com/owner/repo.git", Some("s3cret")).unwrap_err();
        match err {
            Error::UnsupportedAuthScheme { scheme } => assert_eq!(scheme, "http"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_token_with_ssh_remote_is_refused() {
        let err = authenticated_remote("ssh://git@github.com/owner/repo.git", Some("s3cret"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAuthScheme { .. }));
    }

    #[test]
    fn test_token_with_scp_like_remote_is_refused() {
        let err =
            authenticated_remote("git@github.com:owner/repo.git", Some("s3cret")).unwrap_err();
        match err {
            Error::UnsupportedAuthScheme { scheme } => assert_eq!(scheme, "scp-like"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_pattern_covers_subtree() {
        assert_eq!(legacy_pattern("docs"), "docs/**\n");
        assert_eq!(legacy_pattern("src/nested"), "src/nested/**\n");
    }

    #[test]
    fn test_write_legacy_patterns_creates_info_file() {
        let dir = TempDir::new().unwrap();
        write_legacy_patterns(dir.path(), "docs").unwrap();
        let written =
            std::fs::read_to_string(dir.path().join(".git/info/sparse-checkout")).unwrap();
        assert_eq!(written, "docs/**\n");
    }

    // Exercises the real git binary: modern sparse-checkout setup against
    // a local repository, plus the legacy fallback path.

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_configure_sparse_checkout_against_real_git() {
        let dir = TempDir::new().unwrap();
        let deadline = Deadline::new(std::time::Duration::from_secs(30));
        git::run(dir.path(), &["init"], deadline).unwrap();

        let downloader = SparseCheckoutDownloader::new(DownloadRequest {
            repo_url: "https://github.com/owner/repo".to_string(),
            subdir: "docs".to_string(),
            output_dir: dir.path().join("out"),
            branch: None,
            token: None,
            method: crate::request::Method::Sparse,
            provider: crate::request::Provider::Github,
            quiet: true,
        });

        downloader
            .configure_sparse_checkout(dir.path(), deadline)
            .unwrap();

        let config = git::run(
            dir.path(),
            &["config", "--get", "core.sparseCheckout"],
            deadline,
        )
        .unwrap();
        assert_eq!(config.trim(), "true");
    }
}
