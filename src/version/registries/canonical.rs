//! Hosted canonical dataset

use tracing::warn;

use crate::version::error::SourceError;
use crate::version::registries::http::HttpFetcher;
use crate::version::registry::DatasetSource;
use crate::version::types::DatasetFile;

/// Dataset source backed by a JSON document shaped like the bundled default
pub struct CanonicalDatasetSource {
    fetcher: HttpFetcher,
    url: String,
}

impl CanonicalDatasetSource {
    pub fn new(fetcher: HttpFetcher, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DatasetSource for CanonicalDatasetSource {
    async fn fetch_dataset(&self) -> Result<DatasetFile, SourceError> {
        let body = self.fetcher.get_text(&self.url).await?;

        let dataset: DatasetFile = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse canonical dataset: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        if dataset.data.is_empty() || dataset.released <= 0 {
            return Err(SourceError::InvalidResponse(
                "dataset has no data or no release timestamp".to_string(),
            ));
        }

        Ok(dataset)
    }
}
