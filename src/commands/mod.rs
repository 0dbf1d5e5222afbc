//! CLI subcommand implementations.

mod players;
mod props;
mod run;

pub use players::*;
pub use props::*;
pub use run::*;

use crate::config::ConfigError;
use crate::players::PlayerError;
use crate::properties::PropertiesError;

/// Errors surfaced by a subcommand to the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Properties(#[from] PropertiesError),

    #[error(transparent)]
    Players(#[from] PlayerError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Property not set: {0}")]
    MissingProperty(String),
}
