//! Chrome release feed parser
//!
//! The feed is CSV with one row per platform and channel:
//!
//! ```text
//! os,channel,current_version,previous_version,current_reldate,previous_reldate,...
//! mac,stable,62.0.3202.89,62.0.3202.75,11/06/17,10/26/17,...
//! ```
//!
//! Release dates are `MM/DD/YY` in UTC.

use chrono::NaiveDate;

use crate::parser::error::ParseError;
use crate::version::types::CurrentRelease;

const VERSION_FIELD: usize = 2;
const RELDATE_FIELD: usize = 4;

/// Parser for the Chrome release CSV feed
pub struct ChromeFeedParser {
    os: String,
    channel: String,
}

impl ChromeFeedParser {
    pub fn new(os: &str, channel: &str) -> Self {
        Self {
            os: os.to_string(),
            channel: channel.to_string(),
        }
    }

    /// Extracts the current release of the configured platform and channel.
    ///
    /// When the feed repeats the row, the last occurrence wins.
    pub fn parse(&self, content: &str) -> Result<CurrentRelease, ParseError> {
        let row = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| line.split(',').map(str::trim).collect::<Vec<_>>())
            .filter(|fields| fields.len() >= 2 && fields[0] == self.os && fields[1] == self.channel)
            .last()
            .ok_or_else(|| ParseError::MissingRow(format!("{},{}", self.os, self.channel)))?;

        let (Some(version), Some(reldate)) = (row.get(VERSION_FIELD), row.get(RELDATE_FIELD))
        else {
            return Err(ParseError::MalformedRow(row.join(",")));
        };

        if version.is_empty() {
            return Err(ParseError::MalformedRow(row.join(",")));
        }

        Ok(CurrentRelease {
            version: version.to_string(),
            released: parse_feed_date(reldate)?,
        })
    }
}

impl Default for ChromeFeedParser {
    fn default() -> Self {
        Self::new("mac", "stable")
    }
}

/// Parses an `MM/DD/YY` date as midnight UTC of a 21st century day.
fn parse_feed_date(date: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::InvalidDate(date.to_string());

    let parts: Vec<u32> = date
        .split('/')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    let [month, day, year] = parts[..] else {
        return Err(invalid());
    };

    NaiveDate::from_ymd_opt(2000 + year as i32, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(invalid)
}
