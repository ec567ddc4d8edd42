// Library interface for coachrs modules
// This allows integration tests and benches to access the core functionality

pub mod config;
pub mod database;
pub mod error;
pub mod generator;
pub mod history;
pub mod logging;
pub mod models;
pub mod parser;
pub mod schedule;
pub mod session;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::{AppConfig, ParserSettings};
pub use database::Database;
pub use error::{CoachError, GenerationError, PlanError, Result, StorageError};
pub use generator::{FallbackGenerator, PlanContext, PlanGenerator};
pub use history::{merge_history, HistoryIndex, SessionLog};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use parser::WorkoutParser;
pub use session::WorkoutSession;
