//! Unified error handling for the access gate
//!
//! Structured error types with context and recovery suggestions. Pattern
//! errors are fatal at startup; authentication errors are recovered by the
//! login handshake and never reach the serving layer as faults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub type AlbatrossResult<T> = Result<T, AlbatrossError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Which configured pattern set a pattern belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Required,
    Exempt,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Required => f.write_str("required_patterns"),
            PatternKind::Exempt => f.write_str("exempt_patterns"),
        }
    }
}

/// Main error type for Albatross
#[derive(Error, Debug)]
pub enum AlbatrossError {
    #[error("Invalid pattern {pattern:?} at {kind}[{index}]: {source}")]
    InvalidPattern {
        pattern: String,
        kind: PatternKind,
        index: usize,
        #[source]
        source: Box<regex::Error>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication Error")]
    Authentication {
        /// Form field the error is reported against
        field: String,
        context: ErrorContext,
    },

    #[error("Session error: {message}")]
    Session {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authenticator error: {message}")]
    Authenticator {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl AlbatrossError {
    /// Credential mismatch or inactive account, reported on the username field
    pub fn authentication() -> Self {
        AlbatrossError::Authentication {
            field: crate::login::USERNAME_FIELD.to_string(),
            context: ErrorContext::new("login").with_operation("verify_credentials"),
        }
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            AlbatrossError::InvalidPattern { context, .. }
            | AlbatrossError::Config { context, .. }
            | AlbatrossError::Authentication { context, .. }
            | AlbatrossError::Session { context, .. }
            | AlbatrossError::Authenticator { context, .. } => context,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        match self {
            AlbatrossError::InvalidPattern { .. } | AlbatrossError::Config { .. } => {
                error!(error_id = %context.error_id, error = %self, "Configuration error");
            }
            AlbatrossError::Authentication { .. } => {
                warn!(error_id = %context.error_id, "Authentication rejected");
            }
            _ => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    operation = ?context.operation,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::AlbatrossError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::AlbatrossError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! session_error {
    ($msg:expr) => {
        $crate::AlbatrossError::Session {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new("session"),
        }
    };
    ($msg:expr, $source:expr) => {
        $crate::AlbatrossError::Session {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new("session"),
        }
    };
}
