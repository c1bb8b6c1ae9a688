//! Shared HTTP plumbing for remote sources

use std::path::Path;
use std::time::Duration;

use reqwest::{Certificate, Client};
use tracing::{debug, warn};

use crate::config::{EngineConfig, USER_AGENT};
use crate::version::error::{EngineError, SourceError};

/// GET-only client with a per-request deadline
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_ms: u64,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    /// Creates a fetcher trusting the configured CA bundle in addition to the built-in roots
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);

        if let Some(path) = &config.ca_bundle {
            for certificate in load_ca_bundle(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder
            .build()
            .map_err(|e| EngineError::Http(e.to_string()))?;
        Ok(Self::new(client, config.fetch_timeout_ms))
    }

    /// Fetches a URL and returns its body.
    ///
    /// Anything but a 200 with a non-empty body is an error; so is running
    /// past the deadline.
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        debug!("Fetching {}", url);

        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                warn!("{} returned status {}", url, status);
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok::<_, SourceError>(response.text().await?)
        };

        let body = tokio::time::timeout(Duration::from_millis(self.timeout_ms), request)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout_ms))??;

        if body.trim().is_empty() {
            return Err(SourceError::InvalidResponse(format!("empty body from {}", url)));
        }
        Ok(body)
    }
}

fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>, EngineError> {
    let pem = std::fs::read(path)
        .map_err(|e| EngineError::Http(format!("failed to read CA bundle {:?}: {}", path, e)))?;
    Certificate::from_pem_bundle(&pem)
        .map_err(|e| EngineError::Http(format!("invalid CA bundle {:?}: {}", path, e)))
}
