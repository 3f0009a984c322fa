//! # gradebook-core
//!
//! Client core for the Gradebook exercise platform, shared by the CLI and
//! any other front end.
//!
//! This crate provides:
//! - Session state and persistence (`session` module)
//! - Login, registration and session checks (`auth` module)
//! - Role-gated routing decisions (`guard` module)
//! - The bearer-token API client with 401 handling (`client` module)
//! - Exercise, submission, statistics and notification endpoints (`services` module)
//! - Unified error handling (`error` module)

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;

// Re-exports for convenience
pub use auth::AuthGateway;
pub use client::{ApiClient, Credentials, FilePart, HttpTransport, Transport};
pub use config::{ClientConfig, ConfigSource};
pub use context::Gradebook;
pub use error::{Error, Result};
pub use guard::{resolve, GuardDecision, Resolution, RouteGuard, View};
pub use navigation::{History, Navigator, NoopNavigator};
pub use session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};

pub use models::{
    DailyCount, Exercise, ExerciseFilters, ExercisePerformance, ExerciseSort, ExerciseStats,
    ExerciseType, GlobalStats, Notification, NotificationFilters, NotificationKind,
    RegisterRequest, Role, ScorePoint, Session, SessionState, SortOrder, StudentStats,
    Submission, SubmissionFilters, SubmissionSort, SubmissionStatus, TopExercise, User,
};

pub use services::{
    Download, EvaluationCriterion, ExerciseService, ExerciseUpdate, NewCorrection, NewExercise,
    NotificationService, StatisticsService, SubmissionService,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
