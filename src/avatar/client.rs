use crate::avatar::{Endpoints, Identifier, Quality, DEFAULT_SIZE};
use crate::error::{AvatarError, Result};
use crate::utils::files::{batch_file_path, default_file_name, ensure_directory, write_atomic};
use crate::utils::http::{build_client, get_user_agent};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client settings; `Default` targets the public service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Limit for GET downloads
    pub fetch_timeout: Duration,
    /// Limit for HEAD existence probes
    pub probe_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            fetch_timeout: FETCH_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            user_agent: get_user_agent().to_string(),
        }
    }
}

/// Outcome of a batch download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchSummary {
    /// Items that did not download.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Fetches avatars from the qlogo.cn service.
///
/// Every call is a single request/response; nothing is retained between calls
/// apart from the pooled HTTP connections.
pub struct AvatarClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl AvatarClient {
    /// Client for the public service with default timeouts.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Client with custom endpoints, timeouts or user agent.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = build_client(&config.user_agent)?;
        Ok(Self { config, http })
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request URL for this client's endpoints.
    pub fn build_url(
        &self,
        identifier: &Identifier,
        quality: Quality,
        size: u32,
    ) -> Result<String> {
        self.config.endpoints.build_url(identifier, quality, size)
    }

    /// Best-effort existence probe.
    ///
    /// `true` only when the HEAD request answers 200. A missing avatar, an
    /// invalid identifier and a network failure all read as `false`.
    pub async fn check_exists(&self, identifier: &Identifier, quality: Quality) -> bool {
        match self.probe(identifier, quality).await {
            Ok(status) => {
                tracing::debug!("Probe for {} returned {}", identifier, status);
                status == StatusCode::OK
            }
            Err(e) => {
                tracing::debug!("Probe for {} failed: {}", identifier, e);
                false
            }
        }
    }

    async fn probe(&self, identifier: &Identifier, quality: Quality) -> Result<StatusCode> {
        let url = self.build_url(identifier, quality, DEFAULT_SIZE)?;

        let response = self
            .http
            .head(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|source| AvatarError::Network {
                url: url.clone(),
                source,
            })?;

        Ok(response.status())
    }

    /// Download one avatar and save it.
    ///
    /// Without a `destination` the file lands in the working directory as
    /// `avatar_{identifier}{suffix}`. Returns the number of bytes written.
    pub async fn fetch(
        &self,
        identifier: &Identifier,
        quality: Quality,
        size: u32,
        destination: Option<&Path>,
    ) -> Result<u64> {
        let url = self.build_url(identifier, quality, size)?;
        let path: PathBuf = match destination {
            Some(path) => path.to_path_buf(),
            None => default_file_name(identifier, quality),
        };

        let bytes = self.download(&url).await?;
        let written = write_atomic(&path, &bytes)?;

        tracing::info!("Saved {} ({} bytes)", path.display(), written);
        Ok(written)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let network_error = |source: reqwest::Error| AvatarError::Network {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .timeout(self.config.fetch_timeout)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::Http {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(network_error)?;
        Ok(body.to_vec())
    }

    /// Download avatars one after another into `output_dir`.
    ///
    /// Item failures are reported and counted but never stop the batch; only
    /// failing to create `output_dir` is returned as an error.
    pub async fn batch_fetch(
        &self,
        identifiers: &[Identifier],
        output_dir: &Path,
        quality: Quality,
        size: u32,
    ) -> Result<BatchSummary> {
        ensure_directory(output_dir)?;

        let total = identifiers.len();
        tracing::info!("Downloading {} avatars to {}", total, output_dir.display());

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        // Hidden bars swallow println, so fall back to stderr when not on a terminal.
        let report = |line: String| {
            if pb.is_hidden() {
                eprintln!("{}", line);
            } else {
                pb.println(line);
            }
        };

        let mut succeeded = 0;
        for (index, identifier) in identifiers.iter().enumerate() {
            pb.set_message(identifier.to_string());
            let path = batch_file_path(output_dir, identifier, quality);

            match self.fetch(identifier, quality, size, Some(&path)).await {
                Ok(written) => {
                    succeeded += 1;
                    report(format!(
                        "[{}/{}] ✓ {} -> {} ({} bytes)",
                        index + 1,
                        total,
                        identifier,
                        path.display(),
                        written
                    ));
                }
                Err(e) => {
                    tracing::warn!("Download failed for {}: {}", identifier, e);
                    report(format!("[{}/{}] ✗ {}: {}", index + 1, total, identifier, e));
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();

        Ok(BatchSummary { total, succeeded })
    }
}
