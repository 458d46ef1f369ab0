//! Client for the config version probe.

use std::path::{Path, PathBuf};
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{header, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::time::{self, Instant};

use crate::observability::metrics;
use crate::verify::{
    CONFIG_VERSION_HOST, CONFIG_VERSION_PATH, DEFAULT_SOCKET_PATH, MALFORMED_WARN_THRESHOLD,
    POLL_INTERVAL,
};

/// Errors returned by the verification client.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A single version fetch failed (dial, status, or body).
    #[error("failed to fetch config version: {0}")]
    VersionFetch(String),

    /// The expected version was not observed before the deadline.
    #[error("could not get expected version: {expected} after {timeout:?}")]
    Timeout { expected: u64, timeout: Duration },
}

/// Why one fetch failed. Only used to pick a log level while polling;
/// callers see [`VerifyError::VersionFetch`].
#[derive(Debug, Error)]
enum FetchFailure {
    #[error("unable to reach {path}: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("non-200 response: {0}")]
    Status(StatusCode),

    #[error("failed to read the response body: {0}")]
    Body(hyper::Error),

    #[error("error converting {0:?} to a version number")]
    NotANumber(String),
}

impl FetchFailure {
    fn unavailable(path: &Path, reason: impl ToString) -> Self {
        FetchFailure::Unavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// The probe answered, but not with a version.
    fn is_malformed(&self) -> bool {
        !matches!(self, FetchFailure::Unavailable { .. })
    }

    fn kind(&self) -> &'static str {
        match self {
            FetchFailure::Unavailable { .. } => "unavailable",
            FetchFailure::Status(_) => "status",
            FetchFailure::Body(_) => "body",
            FetchFailure::NotANumber(_) => "not_a_number",
        }
    }
}

/// Polls the config version probe over its unix socket.
#[derive(Debug, Clone)]
pub struct VerifyClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl VerifyClient {
    /// Create a client for the default probe socket.
    pub fn new(timeout: Duration) -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout,
        }
    }

    /// Dial `socket_path` instead of the default socket.
    pub fn with_socket_path(mut self, socket_path: impl AsRef<Path>) -> Self {
        self.socket_path = socket_path.as_ref().to_path_buf();
        self
    }

    /// Fetch the version the running NGINX workers report.
    pub async fn get_config_version(&self) -> Result<u64, VerifyError> {
        self.fetch(self.timeout)
            .await
            .map_err(|e| VerifyError::VersionFetch(e.to_string()))
    }

    /// Poll the probe until it reports `expected` or the timeout elapses.
    ///
    /// Every fetch failure counts as transient: NGINX may not have bound the
    /// socket yet, or old workers may still be answering.
    pub async fn wait_for_correct_version(&self, expected: u64) -> Result<(), VerifyError> {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut malformed_streak = 0u32;

        tracing::debug!(expected, "Starting poll for updated nginx config");

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match self.fetch(remaining).await {
                Ok(version) if version == expected => {
                    let took = start.elapsed();
                    metrics::record_version_wait(took, true);
                    tracing::debug!(expected, took = ?took, "Config version ensured");
                    return Ok(());
                }
                Ok(version) => {
                    malformed_streak = 0;
                    tracing::debug!(expected, observed = version, "Config version not updated yet");
                }
                Err(e) => {
                    metrics::record_version_fetch_failure(e.kind());
                    if e.is_malformed() {
                        malformed_streak += 1;
                    } else {
                        malformed_streak = 0;
                    }

                    if malformed_streak == MALFORMED_WARN_THRESHOLD {
                        tracing::warn!(
                            expected,
                            attempts = malformed_streak,
                            error = %e,
                            "Config version probe keeps returning malformed responses"
                        );
                    } else {
                        tracing::debug!(expected, error = %e, "Unable to fetch version");
                    }
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            time::sleep(POLL_INTERVAL.min(remaining)).await;
        }

        metrics::record_version_wait(start.elapsed(), false);
        Err(VerifyError::Timeout {
            expected,
            timeout: self.timeout,
        })
    }

    async fn fetch(&self, budget: Duration) -> Result<u64, FetchFailure> {
        match time::timeout(budget, self.request_version()).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::unavailable(
                &self.socket_path,
                format!("no response within {:?}", budget),
            )),
        }
    }

    async fn request_version(&self) -> Result<u64, FetchFailure> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| FetchFailure::unavailable(&self.socket_path, e))?;

        let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| FetchFailure::unavailable(&self.socket_path, e))?;

        // Teardown errors after the body has been read must not turn a good
        // answer into a failure, so they are only logged.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "Config version connection closed with error");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(CONFIG_VERSION_PATH)
            .header(header::HOST, CONFIG_VERSION_HOST)
            .body(Empty::<Bytes>::new())
            .map_err(|e| FetchFailure::unavailable(&self.socket_path, e))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| FetchFailure::unavailable(&self.socket_path, e))?;

        if response.status() != StatusCode::OK {
            return Err(FetchFailure::Status(response.status()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(FetchFailure::Body)?
            .to_bytes();

        parse_version(&body)
    }
}

fn parse_version(body: &[u8]) -> Result<u64, FetchFailure> {
    let text = String::from_utf8_lossy(body);
    text.trim()
        .parse::<u64>()
        .map_err(|_| FetchFailure::NotANumber(text.into_owned()))
}
