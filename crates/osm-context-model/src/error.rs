// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model-level validation

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building model values from caller input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Project location is missing or not a finite number
    #[error("Invalid project location: {0}")]
    InvalidLocation(String),

    /// Search radius is not usable
    #[error("Invalid radius {0}: must be positive and finite")]
    InvalidRadius(f64),

    /// Feature source failed to deliver records
    #[error("Feature source error: {0}")]
    Source(String),
}

impl ModelError {
    /// Create an invalid location error
    pub fn location(msg: impl Into<String>) -> Self {
        ModelError::InvalidLocation(msg.into())
    }

    /// Create a feature source error
    pub fn source_failed(msg: impl Into<String>) -> Self {
        ModelError::Source(msg.into())
    }
}
