//! Unified error hierarchy for coachrs
//!
//! Provides structured error types for plan handling, storage and the plan
//! generation collaborator, with severity levels that map onto tracing.

use chrono::NaiveDate;
use thiserror::Error;

/// Top-level error type for all coachrs operations
#[derive(Debug, Error)]
pub enum CoachError {
    /// Day plan lookup and structural plan errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Workout log / week plan storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Plan generation collaborator errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while locating or structurally checking a plan
#[derive(Debug, Error)]
pub enum PlanError {
    /// No day in the plan matches the requested date
    #[error("Day plan unavailable for {weekday} ({date})")]
    DayPlanUnavailable { weekday: String, date: NaiveDate },

    /// No week plan has been stored for the user
    #[error("No week plan stored for user {user_id}")]
    NoWeekPlan { user_id: String },

    /// A sub-workout is missing its instruction list (strict parsing only)
    #[error("Sub-workout '{title}' has no instructions list")]
    MissingInstructions { title: String },

    /// Generator output could not be read as a plan document
    #[error("Invalid plan document: {reason}")]
    InvalidDocument { reason: String },
}

/// Storage collaborator errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record not found: {table} {key}")]
    NotFound { table: String, key: String },
}

/// Plan generation collaborator errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A single model call failed
    #[error("Model {model} failed: {reason}")]
    ModelFailed { model: String, reason: String },

    /// Primary and backup models both failed
    #[error("Could not connect to plan service (primary: {primary}; backup: {backup})")]
    Connection { primary: String, backup: String },

    /// The model responded without usable content
    #[error("Model returned no content")]
    EmptyResponse,
}

/// Result type alias for coachrs operations
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoachError::Generation(GenerationError::Connection { .. }) | CoachError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoachError::Plan(PlanError::DayPlanUnavailable { .. }) => ErrorSeverity::Warning,
            CoachError::Plan(PlanError::NoWeekPlan { .. }) => ErrorSeverity::Warning,
            CoachError::Storage(StorageError::NotFound { .. }) => ErrorSeverity::Warning,
            CoachError::Validation(_) => ErrorSeverity::Warning,
            CoachError::Storage(StorageError::Sqlite(_)) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Plan(PlanError::DayPlanUnavailable { .. }) => {
                "Workout data unavailable.".to_string()
            }
            CoachError::Plan(PlanError::NoWeekPlan { .. }) => {
                "No plan yet. Generate a week plan first.".to_string()
            }
            CoachError::Generation(GenerationError::Connection { .. }) => {
                "Could not connect to AI service.".to_string()
            }
            CoachError::Generation(GenerationError::EmptyResponse) => {
                "AI returned no content.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
