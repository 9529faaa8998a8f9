//! Core types shared by every conversion stage.
//!
//! - [`ConvertError`] - error variants for all conversion failure modes
//! - [`ErrorContext`] - user-friendly rendering with suggestions
//! - [`user_friendly_error`] - convert any `anyhow` error for CLI display

pub mod error;

pub use error::{ConvertError, ErrorContext, Result, user_friendly_error};
