use std::path::PathBuf;

use anyhow::Context;

/// Default location of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/wait_time_model.json";

/// Application configuration loaded from environment variables.
///
/// Values are resolved once at startup and handed to each command
/// explicitly; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database connection URL, if one is configured.
    pub database_url: Option<String>,

    /// Path of the model artifact written by `train` and read by `predict`.
    pub model_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `DATABASE_URL`: `PostgreSQL` connection string, only needed by
    ///   commands that touch the `queuehistories` collection
    /// - `MODEL_PATH`: model artifact path (default: `models/wait_time_model.json`)
    #[must_use]
    pub fn from_env() -> Self {
        // Load .env file
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let model_path = lookup("MODEL_PATH")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH), PathBuf::from);

        Self {
            database_url,
            model_path,
        }
    }

    /// Replaces the model path when one was given on the command line.
    #[must_use]
    pub fn with_model_path(mut self, model_path: Option<PathBuf>) -> Self {
        if let Some(path) = model_path {
            self.model_path = path;
        }
        self
    }

    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL environment variable not set")
    }
}
