//! Infrastructure adapters

mod reqwest_client;
mod tracing_notifier;
mod visibility;

pub use reqwest_client::{
    LEADERBOARD_PATH, LIST_COMPETITIONS_PATH, LIST_COMPETITIONS_V2_PATH, ReqwestBrainClient,
};
pub use tracing_notifier::TracingNotifier;
pub use visibility::SharedVisibility;
