//! QuestBoard Application - Request policy and shared client state
//!
//! This crate defines the application layer with:
//! - Port traits (backend API, user notifications, page visibility)
//! - The request wrapper with timeout, retry and backoff
//! - Single-flight deduplication and the query cache
//! - The active-competition resolver

pub mod call;
pub mod competition_resolver;
pub mod error;
pub mod ports;
pub mod query_client;
pub mod single_flight;

pub use call::{ApiCaller, ErrorInfo, extract_error_info, sleep};
pub use competition_resolver::{CompetitionResolver, REFRESH_FAILED_MESSAGE};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    AlwaysVisible, BrainClient, Notifier, PageVisibility, TransportError, TransportResult,
};
pub use query_client::{QueryClient, polling_interval};
pub use single_flight::{Flight, SingleFlight};
