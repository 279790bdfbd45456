//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `YascError`, so host code can simply return
//! `Result<T>`.
use crate::error::YascError;

/// Workspace-wide `Result` alias with `YascError` as the default error.
pub type Result<T, E = YascError> = std::result::Result<T, E>;
