//! Version-age estimation core
//!
//! This module holds the timeline data model, the algorithms that answer
//! "how old is version V of software S", and the remote sources that keep the
//! timelines fresh.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Registries  │────▶│  Timeline   │◀────│ Interpolate │
//! │  (fetch)    │     │  Database   │     │   (age)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Parser    │     │    Cache    │     │  Normalize  │
//! │(csv, html)  │     │   (file)    │     │(ver → f64)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: JSON cache file and live-release memos with atomic writes
//! - [`checker`]: Outdatedness check and the Windows NT table
//! - [`error`]: Error types for cache, source and query operations
//! - [`interpolate`]: Age estimation by exact lookup or linear interpolation
//! - [`normalize`]: Version cleaning, truncation and normalization
//! - [`registry`]: Source traits for fetching release data
//! - [`registries`]: HTTP source implementations (canonical dataset, Chrome, Firefox)
//! - [`types`]: `VersionAnchor`, `SoftwareTimeline`, `TimelineDatabase`, `DatasetFile`

pub mod cache;
pub mod checker;
pub mod error;
pub mod interpolate;
pub mod normalize;
pub mod registries;
pub mod registry;
pub mod types;
