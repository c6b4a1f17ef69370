//! grapho API - Remote collaborators
//!
//! Typed clients for the analysis service's remote APIs:
//! - Session/user API (profile, logout, token refresh)
//! - Admin API (pending users, user list, activity log, verification)
//! - Client-management API (CRUD, send-form, response polling)
//! - Analysis API (sample upload)
//!
//! All clients share one [`Gateway`] that injects the session token,
//! applies deadlines, and owns the 401 policy; response envelopes are
//! normalized by the typed decoders in [`envelope`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod admin;
pub mod analysis;
pub mod clients;
pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod session;
pub mod transport;
pub mod user;

// Re-exports for convenience
pub use admin::{AdminApi, AdminSnapshot};
pub use analysis::{validate_sample, AnalysisApi, ALLOWED_EXTENSIONS, MAX_SAMPLE_BYTES};
pub use clients::{ClientApi, DeleteConfirmation, DirectoryService, ResponseCheck};
pub use config::ApiConfig;
pub use envelope::{decode_list, decode_record, decode_score_envelope, Decoded, ListShape};
pub use error::{ApiError, AuthError};
pub use gateway::Gateway;
pub use session::{Credentials, MemorySessionStore, SessionStore, UserKind};
pub use transport::{
    ApiRequest, ApiResponse, FilePart, HttpTransport, Method, Transport, TransportError,
};
pub use user::UserApi;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
