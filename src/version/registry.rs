//! Source traits for fetching release data from remote hosts

#[cfg(test)]
use mockall::automock;

use crate::version::error::SourceError;
use crate::version::types::{CurrentRelease, DatasetFile};

/// Trait for live sources reporting the current stable release of one software
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Returns the timeline this source feeds (e.g., "chrome")
    fn software(&self) -> &'static str;

    /// Fetches the current stable release
    ///
    /// # Returns
    /// * `Ok(CurrentRelease)` - Full version string and its release timestamp
    /// * `Err(SourceError)` - If the fetch fails or the document is not understood
    async fn fetch_current(&self) -> Result<CurrentRelease, SourceError>;
}

/// Trait for the hosted canonical dataset
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches the whole dataset in the same shape as the bundled default
    async fn fetch_dataset(&self) -> Result<DatasetFile, SourceError>;
}
