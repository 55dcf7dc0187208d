//! Publishing of a finished output tree to the remote API.
//!
//! Every regular file under the local root is POSTed to
//! `{base}/upload/{relative path}` with basic auth. Transfers run with
//! bounded parallelism over one shared connection pool; every file
//! produces exactly one [`PublishRecord`] whatever happens to it, and
//! no transfer failure ever aborts the batch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{stream, StreamExt};
use thiserror::Error;
use tracing::{error, info};

/// Default ceiling on simultaneous in-flight transfers.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;
/// Default overall per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Local root does not exist or is not a directory: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to walk output tree: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Credentials and tuning for the publish endpoint.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Maximum number of simultaneous in-flight transfers.
    pub max_concurrent: usize,
    /// Overall timeout per file transfer.
    pub request_timeout: Duration,
    /// Skip TLS verification, for endpoints with self-signed
    /// certificates on closed networks.
    pub accept_invalid_certs: bool,
}

impl PublishConfig {
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// Terminal state of one file transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Success,
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16, body: String },
    TimedOut,
    /// Connection-level failure before a response arrived.
    Transport(String),
    /// Anything else, e.g. the local file vanished mid-run.
    Unexpected(String),
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Success)
    }
}

/// One file considered for transmission.
#[derive(Debug, Clone)]
pub struct PublishRecord {
    pub local_path: PathBuf,
    pub remote_path: String,
    pub outcome: PublishOutcome,
}

/// Per-file results of one publish run.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub records: Vec<PublishRecord>,
}

impl PublishReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

/// Uploads output trees to the remote API.
pub struct Publisher {
    client: reqwest::Client,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(config: PublishConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.max_concurrent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { client, config })
    }

    /// Transmit every regular file under `local_root`.
    ///
    /// The returned report holds exactly one record per enumerated
    /// file, tagged with its outcome; completion order does not affect
    /// the pairing. A missing root is the only fatal condition.
    pub async fn publish_tree(&self, local_root: &Path) -> Result<PublishReport> {
        if !local_root.is_dir() {
            return Err(PublishError::MissingRoot(local_root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(local_root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        info!(
            root = %local_root.display(),
            files = files.len(),
            max_concurrent = self.config.max_concurrent,
            "Starting publish"
        );

        let records: Vec<PublishRecord> = stream::iter(files)
            .map(|path| self.upload_one(local_root.to_path_buf(), path))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        let report = PublishReport { records };
        info!(
            uploaded = report.succeeded(),
            failed = report.failed(),
            "Publish finished"
        );
        Ok(report)
    }

    async fn upload_one(&self, root: PathBuf, path: PathBuf) -> PublishRecord {
        let remote_path = posix_relative(&path, &root);
        let url = format!(
            "{}/upload/{}",
            self.config.base_url.trim_end_matches('/'),
            remote_path
        );

        let body = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read file for upload");
                return PublishRecord {
                    local_path: path,
                    remote_path,
                    outcome: PublishOutcome::Unexpected(e.to_string()),
                };
            }
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .body(body)
            .send()
            .await;

        let outcome = match response {
            Ok(resp) if resp.status().is_success() => {
                info!(url = %url, "Uploaded");
                PublishOutcome::Success
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                error!(path = %path.display(), status, body = %body, "Upload rejected");
                PublishOutcome::Rejected { status, body }
            }
            Err(e) if e.is_timeout() => {
                error!(path = %path.display(), "Upload timed out");
                PublishOutcome::TimedOut
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Upload transport error");
                PublishOutcome::Transport(e.to_string())
            }
        };

        PublishRecord {
            local_path: path,
            remote_path,
            outcome,
        }
    }
}

/// Relative path with forward slashes, whatever the local separator.
fn posix_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
