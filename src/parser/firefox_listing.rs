//! Firefox release directory listing parser
//!
//! The releases directory lists one sub-directory per build (`59.0/`,
//! `59.0b3/`, `52.7.2esr/`, ...). Each release directory lists files with a
//! last-modified column such as `14-Mar-2018 17:44`.

use chrono::NaiveDate;
use regex::Regex;

use crate::parser::error::ParseError;
use crate::parser::html::HtmlStripper;
use crate::parser::natural::natural_cmp;

/// Substrings marking beta, ESR, plugin and release-candidate entries
const EXCLUDED_MARKERS: &[&str] = &["-", "b", "esr", "plugin", "rc"];

const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parser for Firefox release directory listings
pub struct FirefoxListingParser {
    html: HtmlStripper,
    /// Regex for listing dates: `D?D-Mon-YYYY[ HH:MM]`
    date_re: Regex,
}

impl FirefoxListingParser {
    pub fn new() -> Self {
        Self {
            html: HtmlStripper::new(),
            date_re: Regex::new(
                r"^(\d\d?)-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-(\d{4})(?:\s+(\d\d?):(\d\d))?",
            )
            .unwrap(),
        }
    }

    fn text_lines(&self, html: &str) -> Vec<String> {
        self.html
            .strip(html)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Returns every stable release in the listing, in natural order.
    pub fn stable_versions(&self, html: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .text_lines(html)
            .into_iter()
            .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
            .filter(|line| !EXCLUDED_MARKERS.iter().any(|m| line.contains(m)))
            .map(|line| line.trim_end_matches('/').to_string())
            .collect();

        versions.sort_by(|a, b| natural_cmp(a, b));
        versions.dedup();
        versions
    }

    /// Returns the highest stable release in the listing.
    pub fn latest_stable_version(&self, html: &str) -> Result<String, ParseError> {
        self.stable_versions(html)
            .pop()
            .ok_or(ParseError::NoStableVersion)
    }

    /// Returns the last date of the listing as a UTC timestamp.
    pub fn latest_date(&self, html: &str) -> Result<i64, ParseError> {
        let line = self
            .text_lines(html)
            .into_iter()
            .filter(|line| self.date_re.is_match(line))
            .last()
            .ok_or(ParseError::NoDate)?;

        self.parse_date(&line)
    }

    fn parse_date(&self, line: &str) -> Result<i64, ParseError> {
        let invalid = || ParseError::InvalidDate(line.to_string());
        let caps = self.date_re.captures(line).ok_or_else(invalid)?;

        let day: u32 = caps[1].parse().map_err(|_| invalid())?;
        let month = MONTHS
            .iter()
            .position(|m| *m == &caps[2])
            .ok_or_else(invalid)? as u32
            + 1;
        let year: i32 = caps[3].parse().map_err(|_| invalid())?;
        let hour: u32 = caps.get(4).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;
        let minute: u32 = caps.get(5).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(invalid)
    }
}

impl Default for FirefoxListingParser {
    fn default() -> Self {
        Self::new()
    }
}
