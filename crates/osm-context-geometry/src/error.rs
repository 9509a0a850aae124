// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry processing

use osm_context_model::{ModelError, NodeId};
use thiserror::Error;

/// Geometry processing result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry processing errors
///
/// None of these abort a batch: builders catch them per ring or per face,
/// log them and count them.
#[derive(Error, Debug)]
pub enum Error {
    /// Input ring or polyline is unusable (too few points, bad values)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Zero-area ring, zero-length normal or similar
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Option value out of range or unparsable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Triangulation error
    #[error("Triangulation error: {0}")]
    Triangulation(String),

    /// Ring references a node that was never delivered
    #[error("Node not found: {0}")]
    MissingNode(NodeId),

    /// Error from the shared model
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Create a degenerate geometry error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a triangulation error
    pub fn triangulation(msg: impl Into<String>) -> Self {
        Error::Triangulation(msg.into())
    }
}
