use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::engine::refresh::{
    Tier, load_default, load_memos, merge_live, resolve_tiers, update_live,
};
use crate::version::cache::CacheStore;
use crate::version::checker::{Outdatedness, WINDOWS, check_release_outdated, windows_status};
use crate::version::error::EngineError;
use crate::version::interpolate::{AgeEstimate, age_estimate};
use crate::version::normalize::{normalize, resolve_name};
use crate::version::registries::{
    CanonicalDatasetSource, ChromeSource, FirefoxSource, HttpFetcher,
};
use crate::version::registry::{DatasetSource, ReleaseSource};
use crate::version::types::{TimelineDatabase, VersionAnchor};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Summary of one `initialize` call
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub tier: Tier,
    /// Anchors added from live sources
    pub inserted: usize,
    pub released: i64,
    pub last_check: i64,
}

/// Version-age engine.
///
/// Queries read a shared timeline database; `initialize` rebuilds it off to
/// the side and swaps it in, so readers never wait on network work.
pub struct Engine {
    config: EngineConfig,
    store: CacheStore,
    default: TimelineDatabase,
    canonical: Arc<dyn DatasetSource>,
    live_sources: Vec<Arc<dyn ReleaseSource>>,
    database: RwLock<TimelineDatabase>,
    live_versions: RwLock<HashMap<String, String>>,
    refresh_lock: Mutex<()>,
}

impl Engine {
    /// Creates an engine talking to the configured upstream hosts.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = HttpFetcher::from_config(&config)?;
        let canonical: Arc<dyn DatasetSource> = Arc::new(CanonicalDatasetSource::new(
            fetcher.clone(),
            &config.sources.canonical_url,
        ));
        let live_sources: Vec<Arc<dyn ReleaseSource>> = vec![
            Arc::new(ChromeSource::new(
                fetcher.clone(),
                &config.sources.chrome_feed_url,
            )),
            Arc::new(FirefoxSource::new(
                fetcher,
                &config.sources.firefox_releases_url,
            )),
        ];
        Self::build(config, canonical, live_sources)
    }

    /// Build an Engine with custom sources
    ///
    /// The default dataset is loaded here and queries answer from it until
    /// the first `initialize`.
    pub fn build(
        config: EngineConfig,
        canonical: Arc<dyn DatasetSource>,
        live_sources: Vec<Arc<dyn ReleaseSource>>,
    ) -> Result<Self, EngineError> {
        let default = load_default(&config)
            .inspect_err(|e| error!("Failed to load default dataset: {}", e))?;
        let store = CacheStore::new(&config.cache_dir);

        Ok(Self {
            config,
            store,
            database: RwLock::new(default.clone()),
            default,
            canonical,
            live_sources,
            live_versions: RwLock::new(HashMap::new()),
            refresh_lock: Mutex::new(()),
        })
    }

    fn read_db(&self) -> Result<RwLockReadGuard<'_, TimelineDatabase>, EngineError> {
        self.database.read().map_err(|_| EngineError::LockPoisoned)
    }

    fn write_db(&self) -> Result<RwLockWriteGuard<'_, TimelineDatabase>, EngineError> {
        self.database.write().map_err(|_| EngineError::LockPoisoned)
    }

    /// Runs one acquisition cycle and swaps in the resulting dataset.
    ///
    /// Concurrent calls are serialized. Upstream failures are logged and
    /// never fail the call; the best dataset reached is kept.
    pub async fn initialize(&self, force: bool) -> Result<RefreshReport, EngineError> {
        let _refresh = self.refresh_lock.lock().await;
        let now = Utc::now().timestamp();

        if !self.config.fetch_remote_data {
            debug!("Remote data disabled, using default dataset");
            let database = self.default.clone();
            let report = RefreshReport {
                tier: Tier::BundledDefault,
                inserted: 0,
                released: database.released(),
                last_check: database.last_check(),
            };
            *self.write_db()? = database;
            return Ok(report);
        }

        let resolved = resolve_tiers(
            &self.default,
            &self.store,
            self.canonical.as_ref(),
            self.config.cache_ttl_secs,
            force,
        )
        .await;
        let mut database = resolved.database;

        let mut inserted = 0;
        let releases = if resolved.settled {
            load_memos(&self.store, &self.live_sources)
        } else {
            let releases = update_live(
                &self.store,
                &self.live_sources,
                self.config.live_ttl_secs,
                force,
                now,
            )
            .await;
            inserted = merge_live(&mut database, &releases, now);
            database.set_last_check(now);

            let _ = self
                .store
                .save_dataset(&database.to_dataset())
                .inspect_err(|e| error!("Failed to save cache: {}", e));
            releases
        };

        let mut live = self
            .live_versions
            .write()
            .map_err(|_| EngineError::LockPoisoned)?;
        for (software, release) in releases {
            live.insert(software.to_string(), release.version);
        }
        drop(live);

        let report = RefreshReport {
            tier: resolved.tier,
            inserted,
            released: database.released(),
            last_check: database.last_check(),
        };
        info!(
            "Dataset ready from {} (released {}, {} new anchors)",
            report.tier.as_str(),
            report.released,
            report.inserted
        );

        *self.write_db()? = database;
        Ok(report)
    }

    fn resolve(&self, software: &str) -> String {
        resolve_name(software, &self.config.aliases)
    }

    /// Seconds since `version` of `software` was released.
    pub fn age_seconds(&self, software: &str, version: &str) -> Result<i64, EngineError> {
        Ok(self.age_estimate(software, version)?.seconds)
    }

    /// Age of a version together with how it was derived.
    pub fn age_estimate(&self, software: &str, version: &str) -> Result<AgeEstimate, EngineError> {
        let software = self.resolve(software);
        let now = Utc::now().timestamp();
        let database = self.read_db()?;
        age_estimate(&database, &software, version, now, self.config.out_of_range)
    }

    /// Whether `version` lags the current release of `software`.
    ///
    /// Windows is judged from its NT version table; everything else against
    /// the newest known release.
    pub fn is_outdated(&self, software: &str, version: &str) -> Result<Outdatedness, EngineError> {
        let software = self.resolve(software);
        if software == WINDOWS {
            return windows_status(version);
        }
        let current = self.current_version(&software)?;
        check_release_outdated(&software, version, &current)
    }

    /// Newest known version.
    ///
    /// The full string last reported by a live source wins unless the
    /// timeline already holds a newer anchor.
    pub fn current_version(&self, software: &str) -> Result<String, EngineError> {
        let software = self.resolve(software);

        let live = self
            .live_versions
            .read()
            .map_err(|_| EngineError::LockPoisoned)?
            .get(&software)
            .cloned();
        let latest = self
            .read_db()?
            .timeline(&software)
            .and_then(|timeline| timeline.latest())
            .cloned();

        match (live, latest) {
            (Some(live), Some(latest)) => match normalize(&live, &software) {
                Ok(value) if value >= latest.value => Ok(live),
                _ => Ok(latest.version_key),
            },
            (Some(live), None) => Ok(live),
            (None, Some(latest)) => Ok(latest.version_key),
            (None, None) => Err(EngineError::UnknownSoftware(software)),
        }
    }

    pub fn released(&self) -> Result<i64, EngineError> {
        Ok(self.read_db()?.released())
    }

    pub fn last_check(&self) -> Result<i64, EngineError> {
        Ok(self.read_db()?.last_check())
    }

    pub fn software_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self
            .read_db()?
            .software_names()
            .map(str::to_string)
            .collect())
    }

    /// Anchors of one software, oldest version first.
    pub fn timeline(&self, software: &str) -> Result<Vec<VersionAnchor>, EngineError> {
        let software = self.resolve(software);
        self.read_db()?
            .timeline(&software)
            .map(|timeline| timeline.anchors().to_vec())
            .ok_or(EngineError::UnknownSoftware(software))
    }

    /// True when the held dataset was released more than `max_age_days` ago.
    pub fn is_dataset_stale(&self, max_age_days: i64) -> Result<bool, EngineError> {
        let age = Utc::now().timestamp() - self.released()?;
        Ok(age > max_age_days.saturating_mul(SECONDS_PER_DAY))
    }

    /// Copy of the whole timeline database.
    pub fn snapshot(&self) -> Result<TimelineDatabase, EngineError> {
        Ok(self.read_db()?.clone())
    }
}
