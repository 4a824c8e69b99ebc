//! Common error types for TIGER Review

use thiserror::Error;

/// Common result type for TIGER Review operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy across the review/upload pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML serialization error (wraps quick_xml::Error)
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Overpass query failure with a human-readable message
    #[error("Overpass error: {0}")]
    Overpass(String),

    /// OSM API returned a non-success status
    #[error("OSM API error {status}: {message}")]
    OsmApi { status: u16, message: String },

    /// Diff upload failed after the changeset was created. The changeset
    /// remains open on the server with no content; the id is carried so the
    /// caller can warn the user. No automatic close or retry is attempted.
    #[error("changeset {changeset} left open: diff upload failed: {source}")]
    ChangesetOrphaned {
        changeset: u64,
        #[source]
        source: Box<Error>,
    },

    /// Unexpected response body or malformed local input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid user input or unmet action precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested element not found
    #[error("Not found: {0}")]
    NotFound(String),
}
