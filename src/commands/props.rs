//! `props` subcommand: view and edit `server.properties`.

use std::path::Path;

use crate::display;
use crate::properties::ServerProperties;

use super::CliError;

/// What to do with the properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsAction {
    List,
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
}

/// Run a properties action against the server in `server_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or a requested
/// key is not set.
pub fn run_props(server_dir: &Path, action: PropsAction) -> Result<(), CliError> {
    let store = ServerProperties::new(server_dir);
    let mut properties = store.load()?;

    match action {
        PropsAction::List => {
            if properties.is_empty() {
                display::print_info(&format!("No properties in {}", store.path().display()));
            }
            for (key, value) in properties.iter() {
                println!("{key}={value}");
            }
        }
        PropsAction::Get { key } => {
            let value = properties
                .get(&key)
                .ok_or_else(|| CliError::MissingProperty(key.clone()))?;
            println!("{value}");
        }
        PropsAction::Set { key, value } => {
            properties.set(key.as_str(), value.as_str());
            store.save(&properties)?;
            display::print_info(&format!("{key}={value}"));
        }
        PropsAction::Unset { key } => {
            properties
                .remove(&key)
                .ok_or_else(|| CliError::MissingProperty(key.clone()))?;
            store.save(&properties)?;
            display::print_info(&format!("Removed {key}"));
        }
    }
    Ok(())
}
