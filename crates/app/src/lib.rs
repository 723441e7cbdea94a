//! QuestBoard CLI wiring.
//!
//! Connects the reqwest backend client, the log notifier and the
//! active-competition resolver for a single headless refresh.

use questboard_application::CompetitionResolver;
use questboard_application::ports::TransportError;
use questboard_domain::{ActiveCompetition, ClientSettings};
use questboard_infrastructure::{
    ReqwestBrainClient, SerializationError, SettingsError, TracingNotifier, to_json_stable,
};

/// Errors that stop the CLI before or after resolving.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be loaded or are invalid.
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    /// The backend client could not be built from the settings.
    #[error("backend client: {0}")]
    Client(#[from] TransportError),

    /// The result could not be rendered.
    #[error("output: {0}")]
    Output(#[from] SerializationError),
}

/// Builds a resolver for the backend described by `settings`.
///
/// # Errors
///
/// Returns `AppError::Client` if the base URL is unusable.
pub fn build_resolver(
    settings: &ClientSettings,
) -> Result<CompetitionResolver<ReqwestBrainClient, TracingNotifier>, AppError> {
    let client = ReqwestBrainClient::from_settings(settings)?;
    Ok(CompetitionResolver::new(client, TracingNotifier::new())
        .with_call_options(settings.call_options()))
}

/// Runs one refresh and renders the active competition as JSON (`null`
/// when there is none).
///
/// Backend failures do not fail the run; they resolve to the previous
/// (initially empty) selection.
///
/// # Errors
///
/// Returns an error if the client cannot be built or output fails.
pub async fn run(settings: &ClientSettings) -> Result<String, AppError> {
    let resolver = build_resolver(settings)?;
    let active: Option<ActiveCompetition> = resolver.refresh().await;
    Ok(to_json_stable(&active)?)
}
