//! grapho Core - Analysis domain model
//!
//! The pure domain layer for handwriting-analysis sessions:
//! - Score maps and the weighted score aggregator
//! - The analysis workflow state machine
//! - Client, user, and activity records
//! - The cached client directory and roster filtering/sorting
//!
//! # Example
//!
//! ```rust
//! use grapho_core::{combine, ScoreMap, Weight};
//!
//! let script = ScoreMap::from_pairs([("Cumulative", 80.0), ("Analytical", 20.0)]);
//! let questionnaire = ScoreMap::from_pairs([("Cumulative", 40.0), ("Analytical", 100.0)]);
//!
//! let combined = combine(&script, &questionnaire, Weight::default());
//! assert_eq!(combined.get("Cumulative"), Some(60.0));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod directory;
pub mod error;
pub mod roster;
pub mod scores;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use directory::ClientDirectory;
pub use error::CoreError;
pub use roster::{
    filter_activities, filter_users, sort_activities, sort_users, ActivitySortKey, SortDirection,
    UserSortKey,
};
pub use scores::{combine, ScoreMap, Weight, CANONICAL_CATEGORIES};
pub use types::{
    ActivityRecord, ActivityUser, ClientId, ClientPatch, ClientRecord, NewClient, UserAccount,
};
pub use workflow::{
    allowed_transitions, validate_transition, AnalysisSession, AnalysisStage, StageUpdate,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
