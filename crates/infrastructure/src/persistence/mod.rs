//! File persistence

mod settings_repository;

pub use settings_repository::{
    ENV_API_URL, ENV_AUTH_TOKEN, ENV_TIMEOUT_MS, SettingsError, SettingsRepository,
};
