//! Parser layer
//! - error.rs: ParseError for malformed upstream documents
//! - html.rs: HTML to plain text stripping
//! - natural.rs: natural, case-insensitive string ordering
//! - chrome_csv.rs: Chrome release CSV feed parser
//! - firefox_listing.rs: Firefox release directory listing parser
//!
//! Parsers work on response bodies only; fetching lives in `version::registries`.

pub mod chrome_csv;
pub mod error;
pub mod firefox_listing;
pub mod html;
pub mod natural;

pub use chrome_csv::ChromeFeedParser;
pub use error::ParseError;
pub use firefox_listing::FirefoxListingParser;
pub use html::HtmlStripper;
pub use natural::natural_cmp;
