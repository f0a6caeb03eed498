//! Limits applied when reading untrusted response bodies.

/// How much of a non-2xx response body is kept in [`crate::HttpError::HttpStatus`] (8KB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;
