//! Contents-API download strategy.
//!
//! Walks the GitHub contents endpoint recursively: every directory listing
//! becomes a local directory, every file entry is streamed from its
//! `download_url` to the mirrored local path. The walk is depth-first and
//! aborts on the first failure at any level.

use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use crate::download::Downloader;
use crate::error::{self, Error, Result};
use crate::filesystem;
use crate::http;
use crate::output::Progress;
use crate::request::DownloadRequest;

const API_BASE_URL: &str = "https://api.github.com";

const LOCATION_PATTERN: &str = r"github\.com[/:]([^/]+?)/([^/]+?)(?:\.git)?/?$";

/// One node of a directory listing, as the contents API reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub download_url: Option<String>,
}

#[derive(Debug)]
pub struct GithubApiDownloader {
    request: DownloadRequest,
    client: Client,
    progress: Progress,
}

impl GithubApiDownloader {
    pub fn new(request: DownloadRequest) -> Result<Self> {
        let client = http::client()?;
        let progress = Progress::new(request.quiet);
        Ok(Self {
            request,
            client,
            progress,
        })
    }

    fn download_directory(&self, owner: &str, repo: &str, path: &str, output: &Path) -> Result<()> {
        let entries = self.list_directory(owner, repo, path)?;

        for entry in entries {
            let target = output.join(&entry.name);
            match entry.kind.as_str() {
                "dir" => {
                    filesystem::ensure_dir(&target)?;
                    self.download_directory(owner, repo, &entry.path, &target)?;
                }
                "file" => {
                    self.progress.say(format!("Downloading {}", entry.path));
                    let source = entry.download_url.as_deref().ok_or_else(|| {
                        Error::ResponseParseFailure {
                            message: format!(
                                "file entry '{}' carries no download location",
                                entry.path
                            ),
                        }
                    })?;
                    self.fetch_file(source, &target)?;
                }
                other => {
                    // Submodule and symlink entries have no file content to
                    // mirror.
                    log::debug!("skipping '{}' entry at {}", other, entry.path);
                }
            }
        }

        Ok(())
    }

    fn list_directory(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<ContentEntry>> {
        let api_url = contents_url(owner, repo, path, self.request.branch.as_deref())
            .ok_or_else(|| Error::InvalidLocation {
                location: self.request.repo_url.clone(),
            })?;

        let response = http::github_get(&self.client, api_url.as_str(), self.request.token.as_deref())
            .send()
            .map_err(|e| http::transport_failure(e, "Failed to reach the GitHub API"))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| http::transport_failure(e, "Failed to read the GitHub API response"))?;

        if !status.is_success() {
            return Err(error::from_transport(status.as_u16(), body.trim()));
        }

        parse_listing(&body)
    }

    fn fetch_file(&self, source: &str, target: &Path) -> Result<()> {
        let mut request = self.client.get(source);
        if let Some(token) = &self.request.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request
            .send()
            .map_err(|e| http::transport_failure(e, "Failed to download file"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error::from_transport(status.as_u16(), body.trim()));
        }

        filesystem::save_to_file(target, response)
    }
}

impl Downloader for GithubApiDownloader {
    fn download(&self) -> Result<()> {
        let (owner, repo) = parse_repo_location(&self.request.repo_url)?;
        filesystem::ensure_dir(&self.request.output_dir)?;

        let branch_note = match &self.request.branch {
            Some(branch) => format!("branch: {branch}"),
            None => "default branch".to_string(),
        };
        self.progress.say(format!(
            "Downloading directory {} from {owner}/{repo} ({branch_note})...",
            self.request.subdir
        ));

        self.download_directory(
            &owner,
            &repo,
            &self.request.subdir,
            &self.request.output_dir,
        )?;

        self.progress.say("Download completed successfully.");
        Ok(())
    }
}

/// Extract (owner, repository) from a GitHub location.
///
/// Accepts the https form with or without a trailing `.git`, and the
/// scp-like `git@github.com:owner/repo` form.
pub(crate) fn parse_repo_location(location: &str) -> Result<(String, String)> {
    let pattern = regex::Regex::new(LOCATION_PATTERN).map_err(|_| Error::InvalidLocation {
        location: location.to_string(),
    })?;

    match pattern.captures(location) {
        Some(captures) => Ok((captures[1].to_string(), captures[2].to_string())),
        None => Err(Error::InvalidLocation {
            location: location.to_string(),
        }),
    }
}

/// Build the contents-listing URL for one directory, optionally pinned to
/// a ref. Path segments are percent-encoded by the URL parser.
pub(crate) fn contents_url(
    owner: &str,
    repo: &str,
    path: &str,
    branch: Option<&str>,
) -> Option<Url> {
    let mut url = Url::parse(&format!(
        "{API_BASE_URL}/repos/{owner}/{repo}/contents/{path}"
    ))
    .ok()?;

    if let Some(branch) = branch {
        url.query_pairs_mut().append_pair("ref", branch);
    }

    Some(url)
}

/// Decode a contents response. The endpoint answers with an array for a
/// directory and a bare object when the path names a single file; anything
/// else is a parse failure.
pub(crate) fn parse_listing(body: &str) -> Result<Vec<ContentEntry>> {
    match serde_json::from_str::<Vec<ContentEntry>>(body) {
        Ok(entries) => Ok(entries),
        Err(_) => match serde_json::from_str::<ContentEntry>(body) {
            Ok(entry) => Ok(vec![entry]),
            Err(e) => Err(Error::ResponseParseFailure {
                message: e.to_string(),
            }),
        },
    }
}
