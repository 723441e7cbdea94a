//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod brain_client;
mod notifier;
mod visibility;

pub use brain_client::{BrainClient, TransportError, TransportResult};
pub use notifier::Notifier;
pub use visibility::{AlwaysVisible, PageVisibility};
