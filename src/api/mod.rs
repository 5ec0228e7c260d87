pub mod client;
pub mod types;

pub use client::{
    ApiError, ChatBackend, HttpBackend, DEFAULT_BASE_URL, FALLBACK_NO_RESPONSE,
    FALLBACK_SERVER_ERROR, FALLBACK_UNREACHABLE,
};
pub use types::{ChatEntry, SessionSummary};
