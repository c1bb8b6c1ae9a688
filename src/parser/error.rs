//! Error type for upstream document parsing

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No row of the feed describes the wanted platform and channel
    #[error("Unable to find line starting with \"{0}\"")]
    MissingRow(String),

    /// A row exists but lacks the expected fields
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// A date field could not be turned into a timestamp
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The directory listing holds no stable release entry
    #[error("No stable version in listing")]
    NoStableVersion,

    /// The directory listing holds no modification date
    #[error("No date in listing")]
    NoDate,
}
