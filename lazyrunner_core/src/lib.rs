#![forbid(unsafe_code)]

//! Core domain model and business logic for LazyRunner.
//!
//! This crate provides:
//! - Domain types (exercises, levels, preferences, plans, alerts)
//! - The built-in exercise catalog
//! - Guided session engine and tick scheduling
//! - Weekly planner and training alert notifications
//! - Persistence (profile state, per-profile workout log, weekly stats)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod preferences;
pub mod plan;
pub mod timer;
pub mod engine;
pub mod scheduler;
pub mod notifications;
pub mod state;
pub mod workout_log;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use preferences::AnnotatedExercise;
pub use plan::{position_to_time, time_to_position, AlertStore, AlertUpdate};
pub use timer::{format_seconds, Timer, TimerEvent, TimerMode};
pub use engine::{reps_for_level, Phase, Session, SessionEvent, SessionSettings, SessionSnapshot};
pub use scheduler::{drive, DriverEvent, SessionObserver, Ticker};
pub use notifications::{NotificationService, OutboxNotifier};
pub use state::{JsonStore, ProfileRepository};
pub use workout_log::{export_csv, window_start, WorkoutLog};
pub use stats::{week_start, weekly_stats, TypeStats, WeeklyStats};
