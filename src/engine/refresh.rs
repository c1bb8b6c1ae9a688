//! Tiered dataset acquisition and live release updates

use std::sync::Arc;
use std::time::SystemTime;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::version::cache::{CacheStore, LiveMemo, read_dataset};
use crate::version::error::EngineError;
use crate::version::registry::{DatasetSource, ReleaseSource};
use crate::version::types::{CurrentRelease, DatasetFile, TimelineDatabase};

const BUNDLED_DATASET: &str = include_str!("../../data/data.json");

/// Where the dataset held after a refresh came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    BundledDefault,
    LocalCache,
    RemoteCanonical,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::BundledDefault => "bundled default",
            Tier::LocalCache => "local cache",
            Tier::RemoteCanonical => "remote canonical",
        }
    }
}

/// Result of walking the dataset tiers
pub struct Resolved {
    pub database: TimelineDatabase,
    pub tier: Tier,
    /// True when a fresh cache answered and no remote work is needed
    pub settled: bool,
}

/// Loads the default dataset, from `default_data_path` when configured.
pub fn load_default(config: &EngineConfig) -> Result<TimelineDatabase, EngineError> {
    let dataset: DatasetFile = match &config.default_data_path {
        Some(path) => read_dataset(path).map_err(|e| {
            EngineError::MissingDefaultData(format!("{}: {}", path.display(), e))
        })?,
        None => serde_json::from_str(BUNDLED_DATASET)
            .map_err(|e| EngineError::MissingDefaultData(e.to_string()))?,
    };

    if dataset.data.is_empty() {
        return Err(EngineError::MissingDefaultData(
            "default dataset has no software".to_string(),
        ));
    }

    Ok(TimelineDatabase::from_dataset(&dataset))
}

/// Walks cache then remote canonical on top of the default dataset.
///
/// A fresh cache settles the cycle unless `force` is set. Failures of either
/// tier are logged and the best dataset reached so far is kept.
pub async fn resolve_tiers(
    default: &TimelineDatabase,
    store: &CacheStore,
    canonical: &dyn DatasetSource,
    cache_ttl_secs: i64,
    force: bool,
) -> Resolved {
    let mut database = default.clone();
    let mut tier = Tier::BundledDefault;

    let cached = store
        .load_dataset()
        .inspect_err(|e| warn!("Ignoring unreadable cache {:?}: {}", store.dataset_path(), e))
        .ok()
        .flatten();

    if let Some(file) = cached {
        if database.merge_overlay(&TimelineDatabase::from_dataset(&file)) {
            tier = Tier::LocalCache;
            if !force && store.is_fresh(cache_ttl_secs, SystemTime::now()) {
                debug!("Cache is fresh, skipping remote acquisition");
                return Resolved {
                    database,
                    tier,
                    settled: true,
                };
            }
        } else {
            info!("Cache is older than the default dataset, ignoring it");
        }
    }

    match canonical.fetch_dataset().await {
        Ok(file) => {
            if database.merge_overlay(&TimelineDatabase::from_dataset(&file)) {
                info!("Applied remote dataset released at {}", file.released);
                tier = Tier::RemoteCanonical;
            } else {
                info!(
                    "Remote dataset released at {} is not newer than {}",
                    file.released,
                    database.released()
                );
            }
        }
        Err(e) => warn!("Failed to fetch remote dataset: {}", e),
    }

    Resolved {
        database,
        tier,
        settled: false,
    }
}

/// Current release of one software, from its memo or its live source.
///
/// A memo younger than `ttl_secs` answers without a request unless `force`
/// is set. When the request fails a stale memo is still better than nothing.
pub async fn fetch_live_release(
    store: &CacheStore,
    source: &dyn ReleaseSource,
    ttl_secs: i64,
    force: bool,
    now: i64,
) -> Option<CurrentRelease> {
    let software = source.software();
    let memo = store
        .load_memo(software)
        .inspect_err(|e| warn!("Failed to read live memo for {}: {}", software, e))
        .ok()
        .flatten();

    if let Some(memo) = &memo
        && !force
        && now - memo.last_check < ttl_secs
    {
        debug!("Using live memo for {}: {}", software, memo.version);
        return Some(memo.release());
    }

    match source.fetch_current().await {
        Ok(release) => {
            info!(
                "Live {} release is {} ({})",
                software, release.version, release.released
            );
            let fresh = LiveMemo {
                version: release.version.clone(),
                released: release.released,
                last_check: now,
            };
            let _ = store
                .save_memo(software, &fresh)
                .inspect_err(|e| error!("Failed to save live memo for {}: {}", software, e));
            Some(release)
        }
        Err(e) => {
            error!("Failed to fetch live release for {}: {}", software, e);
            memo.map(|m| m.release())
        }
    }
}

/// Last saved release of every live source, however old.
pub fn load_memos(
    store: &CacheStore,
    sources: &[Arc<dyn ReleaseSource>],
) -> Vec<(&'static str, CurrentRelease)> {
    sources
        .iter()
        .filter_map(|source| {
            let software = source.software();
            store
                .load_memo(software)
                .inspect_err(|e| warn!("Failed to read live memo for {}: {}", software, e))
                .ok()
                .flatten()
                .map(|memo| (software, memo.release()))
        })
        .collect()
}

/// Runs every live source concurrently.
///
/// Sources that produced nothing are left out of the result.
pub async fn update_live(
    store: &CacheStore,
    sources: &[Arc<dyn ReleaseSource>],
    ttl_secs: i64,
    force: bool,
    now: i64,
) -> Vec<(&'static str, CurrentRelease)> {
    let futures = sources.iter().map(|source| async move {
        fetch_live_release(store, source.as_ref(), ttl_secs, force, now)
            .await
            .map(|release| (source.software(), release))
    });

    join_all(futures).await.into_iter().flatten().collect()
}

/// Adds live releases as anchors; returns how many were new.
///
/// Any new anchor moves the dataset release time to `now`.
pub fn merge_live(
    database: &mut TimelineDatabase,
    releases: &[(&'static str, CurrentRelease)],
    now: i64,
) -> usize {
    let mut inserted = 0;
    for (software, release) in releases {
        match release.to_anchor(software) {
            Ok(anchor) => {
                if database.insert_anchor(software, anchor) {
                    info!("Added {} {} to the timeline", software, release.version);
                    inserted += 1;
                }
            }
            Err(e) => warn!("Ignoring live {} release {}: {}", software, release.version, e),
        }
    }

    if inserted > 0 {
        database.set_released(now);
    }
    inserted
}
