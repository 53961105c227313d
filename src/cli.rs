//! CLI argument parsing and request construction

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use gitpluck::download;
use gitpluck::request::{DownloadRequest, Method, Provider};

/// Download a specific folder from a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "gitpluck")]
#[command(version, about)]
#[command(long_about = "Gitpluck downloads a specific folder from a remote Git repository \
without cloning the entire repository.")]
pub struct Cli {
    /// URL of the repository, e.g. https://github.com/owner/repo
    #[arg(value_name = "REPOSITORY_URL")]
    repo_url: String,

    /// Path of the folder inside the repository
    #[arg(value_name = "FOLDER_PATH")]
    folder: String,

    /// Where to save the folder (defaults to the folder's base name)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Branch, tag, or ref to download (defaults to the remote's default branch)
    #[arg(short, long, value_name = "REF")]
    branch: Option<String>,

    /// Download method: 'sparse' (git sparse-checkout) or 'api' (GitHub contents API)
    #[arg(short, long, value_name = "METHOD", default_value = "sparse")]
    method: String,

    /// Access token for private repositories or higher API rate limits
    #[arg(short, long, value_name = "TOKEN", env = "GITPLUCK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository provider (only 'github' has an API strategy)
    #[arg(short, long, value_name = "PROVIDER", default_value = "github")]
    provider: String,

    /// Suppress progress output during the download
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Convert the parsed flags into one immutable request and run it.
    pub fn execute(self) -> Result<()> {
        let method = match self.method.as_str() {
            "sparse" => Method::Sparse,
            "api" => Method::Api,
            other => anyhow::bail!("Unknown method '{other}' (expected 'sparse' or 'api')"),
        };

        let folder = self.folder.trim_end_matches('/').to_string();
        if folder.is_empty() {
            anyhow::bail!("The folder path must not be empty");
        }

        let output_dir = match self.output_dir {
            Some(dir) => dir,
            None => default_output_dir(&folder),
        };

        let request = DownloadRequest {
            repo_url: self.repo_url,
            subdir: folder,
            output_dir,
            branch: self.branch,
            token: self.token,
            method,
            provider: Provider::from_tag(&self.provider),
            quiet: self.quiet,
        };

        let downloader = download::for_request(request)?;
        downloader.download()?;
        Ok(())
    }
}

/// The folder's base name, relative to the current directory.
fn default_output_dir(folder: &str) -> PathBuf {
    match Path::new(folder).file_name() {
        Some(name) => PathBuf::from(name),
        None => PathBuf::from(folder),
    }
}
