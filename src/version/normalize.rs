//! Version normalization: turns raw version strings into comparable numbers.
//!
//! Release cadences differ between products, so the minor component is scaled
//! per software before being added to the major component. Edge is the odd one
//! out: its meaningful number is the Windows build carried in the second
//! component.

use indexmap::IndexMap;

use crate::version::error::EngineError;

/// Software whose second component is a Windows build number
pub const EDGE: &str = "edge";

/// Divisor used for the minor component when a software has no entry below
pub const DEFAULT_SCALE: f64 = 10.0;

/// Per-software minor-component divisors
const SCALES: &[(&str, f64)] = &[
    ("ios", 20.0),
    ("macos", 20.0),
    ("windows", 5.0),
    ("seamonkey", 55.0),
    ("lunascape", 20.0),
    ("firefox", 11.0),
];

/// Returns the minor-component divisor for a software name.
pub fn scale_for(software: &str) -> f64 {
    SCALES
        .iter()
        .find(|(name, _)| *name == software)
        .map(|(_, scale)| *scale)
        .unwrap_or(DEFAULT_SCALE)
}

/// Lower-cases a software name and replaces spaces with underscores.
///
/// Examples:
/// - "Mobile Safari" -> "mobile_safari"
/// - "Firefox" -> "firefox"
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Canonicalizes a software name and maps rebrands onto the timeline they share.
pub fn resolve_name(name: &str, aliases: &IndexMap<String, String>) -> String {
    let name = canonical_name(name);
    match aliases.get(&name) {
        Some(target) => target.clone(),
        None => name,
    }
}

/// Extracts the leading dotted numeric run of a version string.
///
/// Leading non-digits (such as a `v` prefix) and any trailing qualifier are
/// dropped. Returns None when the string has no digit at all.
///
/// Examples:
/// - "59.0b3" -> "59.0"
/// - "v12.1" -> "12.1"
/// - "65.0.3325.181" -> "65.0.3325.181"
pub fn clean_version(raw: &str) -> Option<String> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let run: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let run = run.trim_end_matches('.');

    // "1..2" style runs collapse empty components away
    let cleaned = run
        .split('.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".");

    Some(cleaned)
}

/// Numeric components of a cleaned version, padded to at least two entries.
fn components(version: &str) -> Result<Vec<u64>, EngineError> {
    let cleaned =
        clean_version(version).ok_or_else(|| EngineError::InvalidVersionFormat(version.into()))?;

    // Components are all digits, so parsing only fails on overflow
    let mut parts: Vec<u64> = cleaned
        .split('.')
        .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
        .collect();

    if parts.len() < 2 {
        parts.push(0);
    }
    Ok(parts)
}

/// Reduces a version to the key anchors are stored under.
///
/// Most software keeps `major.minor`; Edge keeps only its build component.
///
/// Examples:
/// - ("65.0.3325.181", "chrome") -> "65.0"
/// - ("59", "firefox") -> "59.0"
/// - ("40.15063", "edge") -> "15063"
pub fn truncate_version(version: &str, software: &str) -> Result<String, EngineError> {
    if software == EDGE {
        return Ok(edge_build(version)?.to_string());
    }
    let parts = components(version)?;
    Ok(format!("{}.{}", parts[0], parts[1]))
}

/// The build number of an Edge version; a lone number is already the build.
fn edge_build(version: &str) -> Result<u64, EngineError> {
    let cleaned =
        clean_version(version).ok_or_else(|| EngineError::InvalidVersionFormat(version.into()))?;
    let parts = components(&cleaned)?;
    if cleaned.contains('.') {
        Ok(parts[1])
    } else {
        Ok(parts[0])
    }
}

/// Converts a version string into a comparable value for the given software.
///
/// `value = major + minor / scale`, or the build number for Edge.
pub fn normalize(version: &str, software: &str) -> Result<f64, EngineError> {
    if software == EDGE {
        return Ok(edge_build(version)? as f64);
    }
    let parts = components(version)?;
    Ok(parts[0] as f64 + parts[1] as f64 / scale_for(software))
}

/// Splits a version into its major and minor numbers, treating missing parts as zero.
pub fn major_minor(version: &str) -> Result<(u64, u64), EngineError> {
    let parts = components(version)?;
    Ok((parts[0], parts[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("59.0b3", Some("59.0"))]
    #[case("v12.1", Some("12.1"))]
    #[case("65.0.3325.181", Some("65.0.3325.181"))]
    #[case("11", Some("11"))]
    #[case("5.", Some("5"))]
    #[case("10_13_2", Some("10"))]
    #[case("beta", None)]
    #[case("", None)]
    fn clean_version_returns_leading_numeric_run(
        #[case] input: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(clean_version(input), expected.map(|s| s.to_string()));
    }

    #[rstest]
    #[case("Mobile Safari", "mobile_safari")]
    #[case("Firefox", "firefox")]
    #[case("  Samsung Browser ", "samsung_browser")]
    fn canonical_name_lowercases_and_replaces_spaces(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_name(input), expected);
    }

    #[rstest]
    #[case("Mobile Safari", "safari")]
    #[case("CriOS", "chrome")]
    #[case("opera", "opera")]
    fn resolve_name_applies_aliases(#[case] input: &str, #[case] expected: &str) {
        let aliases = IndexMap::from([
            ("mobile_safari".to_string(), "safari".to_string()),
            ("crios".to_string(), "chrome".to_string()),
        ]);
        assert_eq!(resolve_name(input, &aliases), expected);
    }

    #[rstest]
    #[case("65.0.3325.181", "chrome", "65.0")]
    #[case("59", "firefox", "59.0")]
    #[case("10.13.2", "macos", "10.13")]
    #[case("40.15063", "edge", "15063")]
    #[case("16299", "edge", "16299")]
    fn truncate_version_keeps_key_components(
        #[case] version: &str,
        #[case] software: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(truncate_version(version, software).unwrap(), expected);
    }

    #[rstest]
    #[case("65.0", "chrome", 65.0)]
    #[case("65.5", "chrome", 65.5)]
    #[case("59.11", "firefox", 60.0)]
    #[case("10.13", "macos", 10.65)]
    #[case("6.1", "windows", 6.2)]
    #[case("2.49", "seamonkey", 2.0 + 49.0 / 55.0)]
    #[case("11", "safari", 11.0)]
    #[case("40.15063", "edge", 15063.0)]
    #[case("15063", "edge", 15063.0)]
    #[case("59.0b3", "firefox", 59.0)]
    fn normalize_scales_minor_per_software(
        #[case] version: &str,
        #[case] software: &str,
        #[case] expected: f64,
    ) {
        let value = normalize(version, software).unwrap();
        assert!(
            (value - expected).abs() < 1e-9,
            "normalize({version}, {software}) = {value}, expected {expected}"
        );
    }

    #[test]
    fn normalize_fails_without_numeric_component() {
        assert!(matches!(
            normalize("unknown", "chrome"),
            Err(EngineError::InvalidVersionFormat(_))
        ));
    }

    #[rstest]
    #[case("65.0.3325.181", "chrome")]
    #[case("10.13.2", "macos")]
    #[case("40.15063", "edge")]
    #[case("2.49.1", "seamonkey")]
    #[case("7", "android")]
    fn normalize_of_truncated_version_matches_full_version(
        #[case] version: &str,
        #[case] software: &str,
    ) {
        let truncated = truncate_version(version, software).unwrap();
        assert_eq!(
            normalize(&truncated, software).unwrap(),
            normalize(version, software).unwrap()
        );
    }

    #[test]
    fn oversized_components_saturate_instead_of_failing() {
        let huge = "65.123456789012345678901234";

        assert_eq!(major_minor(huge).unwrap(), (65, u64::MAX));
        assert!(normalize(huge, "chrome").unwrap() > 65.0);
        assert_eq!(
            truncate_version("99999999999999999999999.0", "chrome").unwrap(),
            format!("{}.0", u64::MAX)
        );
    }

    #[test]
    fn major_minor_pads_missing_minor() {
        assert_eq!(major_minor("10").unwrap(), (10, 0));
        assert_eq!(major_minor("6.3.9600").unwrap(), (6, 3));
    }
}
