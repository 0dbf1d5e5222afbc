//! `whitelist` and `ban` subcommands.

use std::path::Path;

use crate::display;
use crate::players::{IdentityResolver, PlayerLists};

use super::CliError;

/// Edit actions shared by the whitelist and ban list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    List,
    Add { name: String },
    Remove { name: String },
}

/// Run a whitelist action.
///
/// # Errors
///
/// Returns an error if the player cannot be resolved, is already listed or
/// missing, or the list cannot be written.
pub async fn run_whitelist(
    server_dir: &Path,
    resolver: &dyn IdentityResolver,
    action: ListAction,
) -> Result<(), CliError> {
    let lists = PlayerLists::new(server_dir);
    match action {
        ListAction::List => display::print_whitelist(&lists.whitelist()),
        ListAction::Add { name } => {
            let entry = lists.add_to_whitelist(resolver, &name).await?;
            display::print_info(&format!("Whitelisted {} ({})", entry.name, entry.uuid));
        }
        ListAction::Remove { name } => {
            let entry = lists.remove_from_whitelist(&name)?;
            display::print_info(&format!("Removed {} from the whitelist", entry.name));
        }
    }
    Ok(())
}

/// Run a ban list action. `reason` only applies to `Add`.
///
/// # Errors
///
/// Returns an error if the player cannot be resolved, is already banned or
/// not banned, or the list cannot be written.
pub async fn run_ban(
    server_dir: &Path,
    resolver: &dyn IdentityResolver,
    action: ListAction,
    reason: Option<&str>,
) -> Result<(), CliError> {
    let lists = PlayerLists::new(server_dir);
    match action {
        ListAction::List => display::print_bans(&lists.banned()),
        ListAction::Add { name } => {
            let entry = lists.ban(resolver, &name, reason).await?;
            display::print_info(&format!("Banned {}: {}", entry.name, entry.reason));
        }
        ListAction::Remove { name } => {
            let entry = lists.unban(&name)?;
            display::print_info(&format!("Unbanned {}", entry.name));
        }
    }
    Ok(())
}
