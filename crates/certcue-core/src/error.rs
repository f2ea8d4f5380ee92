// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Certcue.

use thiserror::Error;

/// Top-level error type for all Certcue operations.
#[derive(Debug, Error)]
pub enum CertcueError {
    // -- Device errors --
    #[error("cue device request failed: {0}")]
    Device(String),

    // -- Tab record store --
    #[error("tab store error: {0}")]
    Store(String),

    // -- Host TLS introspection --
    #[error("TLS state lookup failed: {0}")]
    TlsLookup(String),

    // -- Serialization / I/O --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CertcueError>;
