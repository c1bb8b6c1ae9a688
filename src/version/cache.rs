use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CACHE_FILE_NAME;
use crate::version::error::CacheError;
use crate::version::types::{CurrentRelease, DatasetFile};

/// Last result of a live updater, kept between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMemo {
    pub version: String,
    pub released: i64,
    pub last_check: i64,
}

impl LiveMemo {
    pub fn release(&self) -> CurrentRelease {
        CurrentRelease {
            version: self.version.clone(),
            released: self.released,
        }
    }
}

/// File-backed cache of the timeline dataset and the live-release memos.
///
/// Writers are serialized through an in-process lock and every file is
/// replaced by rename, so readers never observe a partial write.
pub struct CacheStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CacheStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE_NAME)
    }

    fn memo_path(&self, software: &str) -> PathBuf {
        self.dir.join(format!("live_{}.json", software))
    }

    /// Acquire the writer lock with proper error handling
    fn lock_writer(&self) -> Result<MutexGuard<'_, ()>, CacheError> {
        self.write_lock.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Reads the cached dataset; None when no cache file exists.
    pub fn load_dataset(&self) -> Result<Option<DatasetFile>, CacheError> {
        let path = self.dataset_path();
        if !path.exists() {
            debug!("No cache file at {:?}", path);
            return Ok(None);
        }
        Ok(Some(read_dataset(&path)?))
    }

    /// True when the cache file was written less than `ttl_secs` ago.
    pub fn is_fresh(&self, ttl_secs: i64, now: SystemTime) -> bool {
        let modified = fs::metadata(self.dataset_path()).and_then(|m| m.modified());
        match modified {
            Ok(modified) => {
                let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
                (age.as_secs() as i64) < ttl_secs
            }
            Err(_) => false,
        }
    }

    pub fn save_dataset(&self, file: &DatasetFile) -> Result<(), CacheError> {
        let content = serde_json::to_string_pretty(file)?;

        let _guard = self.lock_writer()?;
        fs::create_dir_all(&self.dir)?;
        write_atomic(&self.dataset_path(), content.as_bytes())?;

        info!("Saved dataset to {:?}", self.dataset_path());
        Ok(())
    }

    pub fn load_memo(&self, software: &str) -> Result<Option<LiveMemo>, CacheError> {
        let path = self.memo_path(software);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save_memo(&self, software: &str, memo: &LiveMemo) -> Result<(), CacheError> {
        let content = serde_json::to_string_pretty(memo)?;

        let _guard = self.lock_writer()?;
        fs::create_dir_all(&self.dir)?;
        write_atomic(&self.memo_path(software), content.as_bytes())?;

        debug!("Saved live memo for {}", software);
        Ok(())
    }
}

/// Reads a dataset file permissively: absent fields are left empty.
pub fn read_dataset(path: &Path) -> Result<DatasetFile, CacheError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Atomically write data to path by writing to a temporary file in the same
/// directory and renaming it over the target.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other("no parent dir"))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cache");
    let tmp = dir.join(format!(
        ".{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    f.write_all(data)?;
    f.sync_all()?;
    drop(f);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn sample_dataset() -> DatasetFile {
        DatasetFile {
            released: 1522577158,
            last_check: 1522577158,
            data: IndexMap::from([(
                "firefox".to_string(),
                IndexMap::from([("59.0".to_string(), 1519862400)]),
            )]),
            ..DatasetFile::default()
        }
    }

    #[test]
    fn load_dataset_returns_none_without_cache_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());

        assert_eq!(store.load_dataset().unwrap(), None);
        assert!(!store.is_fresh(86400, SystemTime::now()));
    }

    #[test]
    fn save_dataset_then_load_returns_same_data() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());

        store.save_dataset(&sample_dataset()).unwrap();

        assert_eq!(store.load_dataset().unwrap(), Some(sample_dataset()));
    }

    #[test]
    fn save_dataset_writes_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());

        store.save_dataset(&sample_dataset()).unwrap();

        let content = fs::read_to_string(store.dataset_path()).unwrap();
        assert!(content.contains("\n  \"released\": 1522577158"));
    }

    #[test]
    fn save_dataset_creates_missing_cache_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(&temp_dir.path().join("nested/dir"));

        store.save_dataset(&sample_dataset()).unwrap();

        assert!(store.dataset_path().exists());
    }

    #[test]
    fn load_dataset_treats_missing_fields_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        fs::write(store.dataset_path(), r#"{"released": 5}"#).unwrap();

        let loaded = store.load_dataset().unwrap().unwrap();

        assert_eq!(loaded.released, 5);
        assert!(loaded.data.is_empty());
        assert_eq!(loaded.homepage, "");
    }

    #[test]
    fn load_dataset_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        fs::write(store.dataset_path(), "{ not json").unwrap();

        assert!(matches!(store.load_dataset(), Err(CacheError::Json(_))));
    }

    #[test]
    fn is_fresh_compares_file_age_with_ttl() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        store.save_dataset(&sample_dataset()).unwrap();

        let now = SystemTime::now();
        assert!(store.is_fresh(86400, now));
        assert!(!store.is_fresh(0, now));
        assert!(!store.is_fresh(86400, now + Duration::from_secs(2 * 86400)));
    }

    #[test]
    fn memo_round_trips_through_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        let memo = LiveMemo {
            version: "65.0.3325.181".to_string(),
            released: 1520294400,
            last_check: 1520300000,
        };

        store.save_memo("chrome", &memo).unwrap();

        assert_eq!(store.load_memo("chrome").unwrap(), Some(memo));
        assert_eq!(store.load_memo("firefox").unwrap(), None);
    }

    #[test]
    fn concurrent_saves_leave_consistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(CacheStore::new(temp_dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut dataset = sample_dataset();
                    dataset.released = i;
                    store.save_dataset(&dataset).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let loaded = store.load_dataset().unwrap().unwrap();
        assert!((0..8).contains(&loaded.released));
        assert_eq!(loaded.data, sample_dataset().data);
    }
}
