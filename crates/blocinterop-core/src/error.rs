// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for bloc interop.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum InteropError {
    // -- Channel errors --
    #[error("remote call `{method}` failed with code {code}: {message}")]
    Remote {
        method: String,
        code: String,
        message: String,
    },

    /// The remote bloc does not implement a method the adapter relies on.
    /// This is a build-time mismatch between both sides, never a runtime
    /// condition.
    #[error("remote bloc does not implement `{0}`")]
    NotImplemented(String),

    // -- Payload errors --
    #[error("malformed state payload: {0}")]
    Decode(String),

    #[error("event payload must serialize to a string-keyed mapping")]
    NotAMapping,

    #[error("malformed channel envelope: {0}")]
    Envelope(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InteropError>;
