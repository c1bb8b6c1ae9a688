use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache file lifetime in seconds (24 hours)
pub const DEFAULT_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Default lifetime of a live-release memo in seconds (just over an hour)
pub const DEFAULT_LIVE_TTL_SECS: i64 = 3700;

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Name of the cache file inside the cache directory
pub const CACHE_FILE_NAME: &str = "data.json";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("version-age/", env!("CARGO_PKG_VERSION"));

/// Default URL of the hosted canonical dataset
pub const DEFAULT_CANONICAL_URL: &str = "https://github.com/peterkahl/Sage/src/data.json";

/// Default URL of the Chrome release CSV feed
pub const DEFAULT_CHROME_FEED_URL: &str = "https://omahaproxy.appspot.com/all";

/// Default URL of the Firefox releases directory listing
pub const DEFAULT_FIREFOX_RELEASES_URL: &str = "https://ftp.mozilla.org/pub/firefox/releases/";

/// Engine configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Directory holding the cache file and live-release memos
    pub cache_dir: PathBuf,
    /// Optional PEM bundle added to the TLS trust store
    pub ca_bundle: Option<PathBuf>,
    /// When false only the bundled dataset is used; the cache is neither read nor written
    pub fetch_remote_data: bool,
    /// Replaces the compiled-in dataset when set
    pub default_data_path: Option<PathBuf>,
    pub cache_ttl_secs: i64,
    pub live_ttl_secs: i64,
    pub fetch_timeout_ms: u64,
    pub out_of_range: OutOfRangePolicy,
    /// Rebranded software names mapped onto the timeline they share
    pub aliases: IndexMap<String, String>,
    pub sources: SourcesConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: data_dir(),
            ca_bundle: None,
            fetch_remote_data: true,
            default_data_path: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            live_ttl_secs: DEFAULT_LIVE_TTL_SECS,
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            out_of_range: OutOfRangePolicy::default(),
            aliases: default_aliases(),
            sources: SourcesConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a JSON file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// What an age query answers when the version lies outside every known anchor
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Report an age of zero
    #[default]
    Zero,
    /// Use the nearest known anchor
    Clamp,
    /// Fail with `VersionOutOfRange`
    Error,
}

/// Remote source locations
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SourcesConfig {
    pub canonical_url: String,
    pub chrome_feed_url: String,
    pub firefox_releases_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            canonical_url: DEFAULT_CANONICAL_URL.to_string(),
            chrome_feed_url: DEFAULT_CHROME_FEED_URL.to_string(),
            firefox_releases_url: DEFAULT_FIREFOX_RELEASES_URL.to_string(),
        }
    }
}

fn default_aliases() -> IndexMap<String, String> {
    IndexMap::from([
        ("mobile_safari".to_string(), "safari".to_string()),
        ("crios".to_string(), "chrome".to_string()),
    ])
}

/// Returns the path to the data directory for version-age.
/// Uses $XDG_DATA_HOME/version-age if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-age,
/// or ./version-age if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-age")
}
