/**
 * API Error Types
 *
 * This module defines the error taxonomy used by all HTTP handlers and
 * their conversion to JSON error responses.
 */

pub mod conversion;
pub mod types;

pub use types::ApiError;
