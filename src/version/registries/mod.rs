//! Remote source implementations for release data

pub mod canonical;
pub mod chrome;
pub mod firefox;
pub mod http;

pub use canonical::CanonicalDatasetSource;
pub use chrome::ChromeSource;
pub use firefox::FirefoxSource;
pub use http::HttpFetcher;
