//! Shared fixtures for engine integration tests

mod sources;
mod upstream;

pub use sources::{SlowDataset, StaticRelease};
pub use upstream::{
    mock_canonical, mock_chrome_feed, mock_firefox_releases, test_config,
};
