//! Timeline data model shared by the acquisition pipeline and the query side

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::version::error::EngineError;
use crate::version::normalize::{normalize, truncate_version};

pub const DATASET_DESCRIPTION: &str = "Estimates age of browser and OS software.";

/// On-disk shape of the bundled dataset, the cache file and the remote canonical dataset.
///
/// Every field is optional when reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFile {
    pub description: String,
    pub homepage: String,
    pub copyright: String,
    pub license: String,
    pub released: i64,
    pub last_check: i64,
    pub data: IndexMap<String, IndexMap<String, i64>>,
}

/// A known (version, release date) data point
#[derive(Debug, Clone, PartialEq)]
pub struct VersionAnchor {
    pub version_key: String,
    pub release_epoch: i64,
    /// Normalized value of `version_key`, used for ordering and interpolation
    pub value: f64,
}

impl VersionAnchor {
    pub fn new(version_key: &str, release_epoch: i64, software: &str) -> Result<Self, EngineError> {
        Ok(Self {
            version_key: version_key.to_string(),
            release_epoch,
            value: normalize(version_key, software)?,
        })
    }
}

/// Anchors of one software, ascending by normalized version
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoftwareTimeline {
    anchors: Vec<VersionAnchor>,
}

impl SoftwareTimeline {
    pub fn anchors(&self) -> &[VersionAnchor] {
        &self.anchors
    }

    pub fn get(&self, version_key: &str) -> Option<&VersionAnchor> {
        self.anchors.iter().find(|a| a.version_key == version_key)
    }

    /// Anchor with the highest version
    pub fn latest(&self) -> Option<&VersionAnchor> {
        self.anchors.last()
    }

    /// Inserts an anchor at its sorted position.
    ///
    /// Returns false without touching the timeline when the key is already known.
    pub fn insert(&mut self, anchor: VersionAnchor) -> bool {
        if self.get(&anchor.version_key).is_some() {
            return false;
        }
        let position = self.anchors.partition_point(|a| a.value <= anchor.value);
        self.anchors.insert(position, anchor);
        true
    }

    /// Inserts the anchor, or moves an existing anchor to the given epoch.
    fn upsert(&mut self, anchor: VersionAnchor) -> bool {
        match self
            .anchors
            .iter_mut()
            .find(|a| a.version_key == anchor.version_key)
        {
            Some(existing) if existing.release_epoch == anchor.release_epoch => false,
            Some(existing) => {
                existing.release_epoch = anchor.release_epoch;
                true
            }
            None => self.insert(anchor),
        }
    }
}

/// Software name to timeline mapping plus dataset provenance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineDatabase {
    timelines: IndexMap<String, SoftwareTimeline>,
    released: i64,
    last_check: i64,
}

impl TimelineDatabase {
    /// Builds a database from its file representation.
    ///
    /// Anchors whose key carries no number are skipped with a warning.
    pub fn from_dataset(file: &DatasetFile) -> Self {
        let mut timelines = IndexMap::new();
        for (software, versions) in &file.data {
            let mut timeline = SoftwareTimeline::default();
            for (key, epoch) in versions {
                match VersionAnchor::new(key, *epoch, software) {
                    Ok(anchor) => {
                        timeline.insert(anchor);
                    }
                    Err(e) => warn!("Skipping anchor {}/{}: {}", software, key, e),
                }
            }
            timelines.insert(software.clone(), timeline);
        }

        Self {
            timelines,
            released: file.released,
            last_check: file.last_check,
        }
    }

    /// File representation with anchors written in ascending version order.
    pub fn to_dataset(&self) -> DatasetFile {
        let data = self
            .timelines
            .iter()
            .map(|(software, timeline)| {
                let versions = timeline
                    .anchors()
                    .iter()
                    .map(|a| (a.version_key.clone(), a.release_epoch))
                    .collect();
                (software.clone(), versions)
            })
            .collect();

        DatasetFile {
            description: DATASET_DESCRIPTION.to_string(),
            released: self.released,
            last_check: self.last_check,
            data,
            ..DatasetFile::default()
        }
    }

    pub fn timeline(&self, software: &str) -> Option<&SoftwareTimeline> {
        self.timelines.get(software)
    }

    pub fn software_names(&self) -> impl Iterator<Item = &str> {
        self.timelines.keys().map(String::as_str)
    }

    pub fn released(&self) -> i64 {
        self.released
    }

    pub fn last_check(&self) -> i64 {
        self.last_check
    }

    pub fn set_released(&mut self, released: i64) {
        self.released = released;
    }

    pub fn set_last_check(&mut self, last_check: i64) {
        self.last_check = last_check;
    }

    /// Adds an anchor discovered during acquisition.
    ///
    /// Returns true when the timeline changed.
    pub fn insert_anchor(&mut self, software: &str, anchor: VersionAnchor) -> bool {
        self.timelines
            .entry(software.to_string())
            .or_default()
            .insert(anchor)
    }

    /// Merges a newer dataset over this one.
    ///
    /// An overlay older than the held dataset is ignored. Anchors are never
    /// removed; shared keys take the overlay's epoch. Returns true when the
    /// overlay was applied.
    pub fn merge_overlay(&mut self, overlay: &TimelineDatabase) -> bool {
        if overlay.released < self.released {
            return false;
        }

        for (software, timeline) in &overlay.timelines {
            let target = self.timelines.entry(software.clone()).or_default();
            for anchor in timeline.anchors() {
                target.upsert(anchor.clone());
            }
        }
        self.released = overlay.released;
        self.last_check = self.last_check.max(overlay.last_check);
        true
    }
}

/// Current stable release reported by a live source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRelease {
    pub version: String,
    pub released: i64,
}

impl CurrentRelease {
    /// Converts the release into the anchor stored for `software`.
    pub fn to_anchor(&self, software: &str) -> Result<VersionAnchor, EngineError> {
        let key = truncate_version(&self.version, software)?;
        VersionAnchor::new(&key, self.released, software)
    }
}
