//! Error handling for scenec
//!
//! This module provides the error type returned by every conversion operation
//! and the user-facing rendering used by the command line front-end. The
//! error system follows two rules:
//! 1. **Strongly-typed errors** ([`ConvertError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!
//! # Error Categories
//!
//! - **Arguments**: [`ConvertError::InvalidArgument`] (extracting the root node,
//!   malformed asset paths, unused materials)
//! - **Inputs**: [`ConvertError::ResourceNotFound`], [`ConvertError::SceneParse`],
//!   [`ConvertError::UnsupportedFormat`]
//! - **Output**: [`ConvertError::IoFailure`] for any copy or serialization failure
//! - **Dispatch**: [`ConvertError::UnsupportedDependencyKind`] when a generated
//!   dependency has no registered generator
//! - **Configuration**: [`ConvertError::ConfigError`]
//!
//! Every variant is fatal to the conversion call that produced it. Nothing is
//! retried internally; the caller decides whether to rerun the whole conversion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scenec_cli::core::{ConvertError, ErrorContext, user_friendly_error};
//!
//! let error = ConvertError::invalid_argument("only children can be extracted");
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// The main error type for conversion operations.
///
/// Variants that concern a single dependency carry its original key so a
/// failed run can always name the offending resource.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A caller supplied an argument the operation cannot honor.
    ///
    /// Raised when extracting a node that has no parent, when an asset path
    /// cannot be parsed into a key, or when a generated material is not used
    /// by any geometry.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// The source file backing a real dependency does not exist.
    #[error("Resource '{key}' not found at {}", path.display())]
    ResourceNotFound {
        /// Original key of the dependency
        key: String,
        /// Resolved on-disk location that was expected to exist
        path: PathBuf,
    },

    /// Copying or serializing a resource failed.
    #[error("Failed {operation} for '{key}' at {}: {source}", path.display())]
    IoFailure {
        /// Original key of the dependency (or the model name for the scene root)
        key: String,
        /// What was being done, e.g. "copying resource"
        operation: String,
        /// The file being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A generated dependency has no registered writer.
    #[error("No generator registered for '{key}' ({kind})")]
    UnsupportedDependencyKind {
        /// Original key of the dependency
        key: String,
        /// The kind of asset that could not be generated
        kind: String,
    },

    /// The model file extension has no loader in the format table.
    #[error("Unsupported model format '.{extension}' for {}", path.display())]
    UnsupportedFormat {
        /// Lowercase file extension
        extension: String,
        /// The file that was requested
        path: PathBuf,
    },

    /// A scene or material document could not be parsed.
    #[error("Failed to parse {}: {reason}", path.display())]
    SceneParse {
        /// Document that failed to parse
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Configuration is missing or inconsistent.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },
}

impl ConvertError {
    /// Shorthand for [`ConvertError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`ConvertError::IoFailure`].
    pub fn io(
        key: impl Into<String>,
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::IoFailure {
            key: key.into(),
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Shorthand for [`ConvertError::ConfigError`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Error wrapper that adds user-friendly details and a suggestion.
///
/// ```rust,no_run
/// use scenec_cli::core::{ConvertError, ErrorContext};
///
/// let context = ErrorContext::new(ConvertError::config("source root is not set"))
///     .with_suggestion("Pass --source-root or set source_root in scenec.toml");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// Rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`ConvertError`].
    #[must_use]
    pub fn new(error: ConvertError) -> Self {
        Self::from_message(error.to_string())
    }

    /// Create a context from an already rendered message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: message in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`ConvertError`] anywhere in the `anyhow` chain so that context
/// added by the CLI layer does not hide the tailored suggestion.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain_message = render_chain(&error);

    if let Some(convert_error) = error.chain().find_map(|e| e.downcast_ref::<ConvertError>()) {
        let context = create_error_context(convert_error);
        return ErrorContext {
            message: chain_message,
            ..context
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::from_message(chain_message)
                    .with_suggestion("Check file ownership and permissions of the source and target roots");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::from_message(chain_message)
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::from_message(chain_message)
            .with_suggestion("Check the TOML syntax of the configuration or material file");
    }

    ErrorContext::from_message(chain_message)
}

fn render_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(error: &ConvertError) -> ErrorContext {
    let context = ErrorContext::from_message(error.to_string());
    match error {
        ConvertError::InvalidArgument { .. } => context
            .with_suggestion("Check the node names and asset paths passed to the conversion"),
        ConvertError::ResourceNotFound { key, path } => context
            .with_suggestion(format!(
                "Make sure '{key}' exists under the source root, or pass the correct --source-root"
            ))
            .with_details(format!(
                "Dependency paths are resolved relative to the source root; expected {}",
                path.display()
            )),
        ConvertError::IoFailure { path, .. } => context
            .with_suggestion("Check free space and write permissions of the target root")
            .with_details(format!(
                "Output written before the failure is left in place; rerun the conversion once {} is writable",
                path.display()
            )),
        ConvertError::UnsupportedDependencyKind { kind, .. } => context
            .with_details(format!("Only materials and extracted sub-models can be generated, got {kind}")),
        ConvertError::UnsupportedFormat { extension, .. } => context
            .with_suggestion(format!(
                "Map '{extension}' to a loader in the [formats] table of scenec.toml"
            )),
        ConvertError::SceneParse { .. } => {
            context.with_suggestion("Check the document against the scene/material format")
        }
        ConvertError::ConfigError { .. } => context
            .with_suggestion("Pass the missing option on the command line or set it in scenec.toml"),
    }
}
