//! Error Types
//!
//! This module defines the error taxonomy for the authentication lifecycle.
//!
//! # Error Categories
//!
//! - `FieldError` - per-field credential validation failures, surfaced next
//!   to the offending input before any network call
//! - `AuthError` - everything the login flow can fail with, including the
//!   normalized HTTP error mapping produced by the gateway
//!
//! # Usage
//!
//! ```rust
//! use dashgate::error::{AuthError, FieldError};
//!
//! let error = AuthError::validation("username", FieldError::Required.to_string());
//! assert_eq!(error.to_string(), "username is required");
//! ```
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.
use thiserror::Error;

/// Validation failure for a single credential field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field was empty
    #[error("is required")]
    Required,

    /// The field was below its minimum length
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// The field was above its maximum length
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length
        max: usize,
    },

    /// The username contained characters outside `[A-Za-z0-9._-]`
    #[error("may only contain letters, digits and . _ -")]
    InvalidPattern,

    /// The password contained no uppercase letter
    #[error("must contain at least one uppercase letter")]
    MissingUpperCase,

    /// The password contained no digit
    #[error("must contain at least one digit")]
    MissingDigit,
}

/// Errors the login flow can end in.
///
/// Validation errors are produced locally and never reach the network; the
/// remaining variants are the gateway's normalization of transport and HTTP
/// failures. The `Display` text is what the notification collaborator shows,
/// so every variant renders as a complete human-readable sentence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A credential field failed local validation
    #[error("{field} {message}")]
    Validation {
        /// The field that failed validation
        field: &'static str,
        /// Human-readable error message
        message: String,
    },

    /// No response was received from the server
    #[error("could not connect to the server, check your network connection and try again")]
    ConnectionError,

    /// The server rejected the credentials (HTTP 401)
    #[error("wrong username or password")]
    Unauthorized,

    /// The server throttled the request (HTTP 429)
    #[error("too many login attempts, please try again later")]
    RateLimited,

    /// The server rejected the request shape (HTTP 400)
    #[error("invalid login details: {0}")]
    InvalidCredentialsFormat(String),

    /// Any other HTTP error response
    #[error("server error ({status}): {message}")]
    ServerError {
        /// The HTTP status code
        status: u16,
        /// Message taken from the response body when present
        message: String,
    },
}

impl AuthError {
    /// Create a new validation error for a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Whether this error was produced locally, before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
