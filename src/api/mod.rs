pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::AuthClient;
pub use client::{ChatBackend, RagClient, candidate_endpoints};
pub use error::{ApiError, extract_error_message};
pub use types::{ChatReply, ChatRequest, SourceCounts, SourcesListing, UserInfo};
