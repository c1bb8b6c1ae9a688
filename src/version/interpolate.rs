//! Age estimation for versions of a known software
//!
//! Versions recorded in the timeline are answered exactly. Anything between
//! two anchors gets a release time proportional to where its normalized value
//! falls between theirs.

use crate::config::OutOfRangePolicy;
use crate::version::error::EngineError;
use crate::version::normalize::{clean_version, normalize, truncate_version};
use crate::version::types::{SoftwareTimeline, TimelineDatabase, VersionAnchor};

/// How an age was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateKind {
    /// The version is a recorded anchor
    Exact,
    /// Linear estimate between two anchors
    Interpolated,
    /// The version is below or above every anchor; the age is an approximation
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeEstimate {
    pub seconds: i64,
    pub kind: EstimateKind,
}

/// Estimates how many seconds before `now` a version was the current release.
///
/// `software` must already be canonicalized and de-aliased.
pub fn age_estimate(
    db: &TimelineDatabase,
    software: &str,
    version: &str,
    now: i64,
    policy: OutOfRangePolicy,
) -> Result<AgeEstimate, EngineError> {
    let timeline = db
        .timeline(software)
        .ok_or_else(|| EngineError::UnknownSoftware(software.to_string()))?;

    let cleaned =
        clean_version(version).ok_or_else(|| EngineError::InvalidVersionFormat(version.into()))?;

    if let Some(anchor) = exact_anchor(timeline, &cleaned, software)? {
        return Ok(AgeEstimate {
            seconds: now - anchor.release_epoch,
            kind: EstimateKind::Exact,
        });
    }

    let target = normalize(&cleaned, software)?;
    let anchors = timeline.anchors();
    let split = anchors.partition_point(|a| a.value < target);
    let low = split.checked_sub(1).map(|i| &anchors[i]);
    let high = anchors.get(split);

    match (low, high) {
        (_, Some(high)) if high.value == target => Ok(AgeEstimate {
            seconds: now - high.release_epoch,
            kind: EstimateKind::Exact,
        }),
        (Some(low), Some(high)) => Ok(AgeEstimate {
            seconds: now - interpolate_epoch(low, high, target),
            kind: EstimateKind::Interpolated,
        }),
        (low, high) => {
            let nearest = low.or(high);
            match (policy, nearest) {
                (OutOfRangePolicy::Error, _) => Err(EngineError::VersionOutOfRange {
                    software: software.to_string(),
                    version: version.to_string(),
                }),
                (OutOfRangePolicy::Clamp, Some(anchor)) => Ok(AgeEstimate {
                    seconds: now - anchor.release_epoch,
                    kind: EstimateKind::OutOfRange,
                }),
                _ => Ok(AgeEstimate {
                    seconds: 0,
                    kind: EstimateKind::OutOfRange,
                }),
            }
        }
    }
}

/// Looks the version up verbatim, then by its truncated key.
fn exact_anchor<'a>(
    timeline: &'a SoftwareTimeline,
    cleaned: &str,
    software: &str,
) -> Result<Option<&'a VersionAnchor>, EngineError> {
    if let Some(anchor) = timeline.get(cleaned) {
        return Ok(Some(anchor));
    }
    let key = truncate_version(cleaned, software)?;
    Ok(timeline.get(&key))
}

/// Release epoch of `target`, proportional between two bracketing anchors.
///
/// Requires `low.value < target <= high.value`.
fn interpolate_epoch(low: &VersionAnchor, high: &VersionAnchor, target: f64) -> i64 {
    let fraction = (target - low.value) / (high.value - low.value);
    let span = (high.release_epoch - low.release_epoch) as f64;
    low.release_epoch + (fraction * span).floor() as i64
}
