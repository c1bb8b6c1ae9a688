//! In-process sources for tests that do not need HTTP

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use version_age::version::error::SourceError;
use version_age::version::registry::{DatasetSource, ReleaseSource};
use version_age::version::types::{CurrentRelease, DatasetFile};

/// Live source always reporting the same release
pub struct StaticRelease {
    software: &'static str,
    release: CurrentRelease,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticRelease {
    pub fn new(software: &'static str, version: &str, released: i64) -> Self {
        Self {
            software,
            release: CurrentRelease {
                version: version.to_string(),
                released,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for StaticRelease {
    fn software(&self) -> &'static str {
        self.software
    }

    async fn fetch_current(&self) -> Result<CurrentRelease, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.release.clone())
    }
}

/// Dataset source that answers after a delay, or times out
pub struct SlowDataset {
    delay: Duration,
}

#[allow(dead_code)]
impl SlowDataset {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DatasetSource for SlowDataset {
    async fn fetch_dataset(&self) -> Result<DatasetFile, SourceError> {
        tokio::time::sleep(self.delay).await;
        Err(SourceError::Timeout(self.delay.as_millis() as u64))
    }
}
