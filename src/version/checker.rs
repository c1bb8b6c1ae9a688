//! Outdatedness check against the current release of a software

use crate::version::error::EngineError;
use crate::version::normalize::{EDGE, major_minor, truncate_version};

/// Software whose versions are checked against the NT kernel table
pub const WINDOWS: &str = "windows";

/// Minor components are divided by the larger minor times this, keeping them below 1
const MINOR_SPREAD: f64 = 1.01;

/// Result of an outdatedness check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outdatedness {
    pub outdated: bool,
    /// How far the version lags behind; 0 when current
    pub factor: f64,
}

impl Outdatedness {
    pub const CURRENT: Self = Self {
        outdated: false,
        factor: 0.0,
    };

    /// Builds the result from a distance where positive means behind.
    pub fn from_distance(distance: f64) -> Self {
        if distance > 0.0 {
            Self {
                outdated: true,
                factor: distance,
            }
        } else {
            Self::CURRENT
        }
    }
}

struct WindowsRelease {
    nt: (u64, u64),
    name: &'static str,
    status: Outdatedness,
}

/// NT kernel versions, newest first
const WINDOWS_RELEASES: &[WindowsRelease] = &[
    WindowsRelease {
        nt: (10, 0),
        name: "Windows 10",
        status: Outdatedness::CURRENT,
    },
    WindowsRelease {
        nt: (6, 3),
        name: "8.1",
        status: Outdatedness {
            outdated: false,
            factor: 0.5,
        },
    },
    WindowsRelease {
        nt: (6, 2),
        name: "8.0",
        status: Outdatedness {
            outdated: false,
            factor: 0.81,
        },
    },
    WindowsRelease {
        nt: (6, 1),
        name: "7.0",
        status: Outdatedness {
            outdated: false,
            factor: 0.88,
        },
    },
    WindowsRelease {
        nt: (6, 0),
        name: "Vista",
        status: Outdatedness {
            outdated: true,
            factor: 4.0,
        },
    },
    WindowsRelease {
        nt: (5, 2),
        name: "XP",
        status: Outdatedness {
            outdated: true,
            factor: 5.0,
        },
    },
];

/// Status of anything older than the oldest table entry
const WINDOWS_LEGACY: Outdatedness = Outdatedness {
    outdated: true,
    factor: 6.0,
};

fn windows_release(nt_version: &str) -> Result<Option<&'static WindowsRelease>, EngineError> {
    let nt = major_minor(nt_version)?;
    Ok(WINDOWS_RELEASES.iter().find(|release| nt >= release.nt))
}

/// Outdatedness of a Windows NT kernel version.
pub fn windows_status(nt_version: &str) -> Result<Outdatedness, EngineError> {
    Ok(windows_release(nt_version)?
        .map(|release| release.status)
        .unwrap_or(WINDOWS_LEGACY))
}

/// Marketing name of a Windows NT kernel version, if it is in the table.
pub fn windows_release_name(nt_version: &str) -> Result<Option<&'static str>, EngineError> {
    Ok(windows_release(nt_version)?.map(|release| release.name))
}

/// Distance from `version` up to `current` using only major and minor components.
///
/// Positive when `current` is ahead.
pub fn version_distance(version: &str, current: &str) -> Result<f64, EngineError> {
    let (major, minor) = major_minor(version)?;
    let (current_major, current_minor) = major_minor(current)?;

    let divisor = minor.max(current_minor) as f64 * MINOR_SPREAD;
    let spread = |m: u64| {
        if divisor == 0.0 {
            0.0
        } else {
            m as f64 / divisor
        }
    };

    let value = major as f64 + spread(minor);
    let current_value = current_major as f64 + spread(current_minor);
    Ok(current_value - value)
}

/// Compares a version with the current release of the same software.
pub fn check_outdated(version: &str, current: &str) -> Result<Outdatedness, EngineError> {
    Ok(Outdatedness::from_distance(version_distance(
        version, current,
    )?))
}

/// Compares a version of `software` with its current release.
///
/// Edge versions are first reduced to their build number, which is what its
/// timeline is keyed on.
pub fn check_release_outdated(
    software: &str,
    version: &str,
    current: &str,
) -> Result<Outdatedness, EngineError> {
    if software == EDGE {
        return check_outdated(
            &truncate_version(version, EDGE)?,
            &truncate_version(current, EDGE)?,
        );
    }
    check_outdated(version, current)
}
