//! Error types for the lazyrunner_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lazyrunner_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Stored profile could not be read; callers fall back to a fresh profile
    #[error("Profile load error: {0}")]
    ProfileLoad(String),

    /// A session was requested with no eligible exercise
    #[error("Aucun exercice sélectionné: select at least one exercise (green or white) to start a session")]
    NoExercisesSelected,

    /// An exercise of the wrong kind was handed to a session
    #[error("Exercise '{exercise_id}' cannot be part of a {session_type} session")]
    SessionTypeMismatch {
        exercise_id: String,
        session_type: String,
    },

    /// A session action that is not valid in the current phase
    #[error("Invalid session action: {0}")]
    InvalidAction(String),

    /// The OS notification layer refused a request
    #[error("Notification scheduling error: {0}")]
    NotificationScheduling(String),

    /// Update/remove referenced an alert that does not exist
    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    /// Malformed alert fields (label, color)
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    /// Not a valid HH:MM 24-hour clock value
    #[error("Invalid time '{0}': expected HH:MM (00:00 to 23:59)")]
    InvalidTime(String),

    /// Not one of the seven weekday tokens
    #[error("Invalid day '{0}': expected one of lundi, mardi, mercredi, jeudi, vendredi, samedi, dimanche")]
    InvalidDay(String),

    /// No exercise with this id in the catalog
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
