//! Service layer: owns the timeline database and keeps it fresh
//!
//! - [`backend`]: `Engine`, the query API and the refresh entry point
//! - [`refresh`]: tier resolution and live release updates

pub mod backend;
pub mod refresh;

pub use backend::{Engine, RefreshReport};
pub use refresh::Tier;
