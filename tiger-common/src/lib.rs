//! # TIGER Review Common Library
//!
//! Shared code for the TIGER Review tool:
//! - OSM way data model and tag helpers
//! - Tag derivation (editable defaults and anomaly detection)
//! - Way editor (working tag set and finalize actions)
//! - Upload queue
//! - OSM XML serialization
//! - Overpass and OSM API clients
//! - Changeset upload orchestration
//! - Configuration loading

pub mod config;
pub mod derive;
pub mod editor;
pub mod error;
pub mod queue;
pub mod services;
pub mod upload;
pub mod way;
pub mod xml;

pub use editor::WayEditor;
pub use error::{Error, Result};
pub use queue::UploadQueue;
pub use way::{OsmWay, Tags};
