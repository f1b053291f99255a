//! Shoebox - a CLI toolkit for JPEG collections
//!
//! This library provides the building blocks behind the `shoebox`
//! pipeline stages:
//! - Content identity hashing over decoded pixels
//! - Duplicate counting with a shared retention policy
//! - Divergence resolution for identity groups with inconsistent
//!   capture times
//! - EXIF capture time reporting, adjustment and assignment
//! - Deterministic reorganization via hard links

pub mod cli;
pub mod config;
pub mod divergence;
pub mod error;
pub mod hash;
pub mod identity;
pub mod meta;
pub mod organize;
pub mod pathlist;
pub mod policy;
pub mod record;
pub mod remove;
pub mod scan;

pub use cli::Cli;
pub use config::{Config, ConfigError, Granularity, ModelPlacement};
pub use error::{Error, Result};
pub use record::ImageRecord;
