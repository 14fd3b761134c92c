//! Query commands: list, status and suggest.

use super::{resolve_identity, Manager};
use crate::cli::{ListArgs, ListFilter, StatusArgs, SuggestArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rapport_domain::{Identity, Relationship};

/// Execute the list command.
pub fn execute_list(args: ListArgs, manager: &Manager, formatter: &Formatter) -> Result<()> {
    let identity = resolve_identity(manager, &args.remote_id)?;
    let relationships = select(manager, &identity, &args.filter)?;

    println!("{}", formatter.format_relationships(&relationships, Some(&identity))?);
    Ok(())
}

/// Relationships of `identity` matching the filter flags.
pub fn select(
    manager: &Manager,
    identity: &Identity,
    filter: &ListFilter,
) -> Result<Vec<Relationship>> {
    let relationships = if filter.contacts {
        manager.get_contacts(identity)?
    } else if filter.pending {
        Some(manager.get_pending(identity)?)
    } else if filter.incoming {
        Some(manager.get_pending_for(identity, false)?)
    } else if filter.outgoing {
        Some(manager.get_pending_for(identity, true)?)
    } else {
        manager.get(identity)?
    };

    relationships.ok_or_else(|| CliError::UnknownIdentity(identity.to_string()))
}

/// Execute the status command.
pub fn execute_status(args: StatusArgs, manager: &Manager, formatter: &Formatter) -> Result<()> {
    let viewer = resolve_identity(manager, &args.viewer)?;
    let other = resolve_identity(manager, &args.other)?;

    let relationship = manager.get_relationship(&viewer, &other)?;
    let status = manager.get_relationship_status(relationship.as_ref(), &viewer);

    println!(
        "{}",
        formatter.format_status(&viewer, &other, relationship.as_ref(), status)?
    );
    Ok(())
}

/// Execute the suggest command.
pub fn execute_suggest(args: SuggestArgs, manager: &Manager, formatter: &Formatter) -> Result<()> {
    let identity = resolve_identity(manager, &args.remote_id)?;
    let suggestions = manager.get_public_relation(&identity)?;

    if suggestions.is_empty() {
        println!("{}", formatter.info(&format!("No suggestions for {}", identity)));
        return Ok(());
    }

    println!("{}", formatter.format_identities(&suggestions)?);
    Ok(())
}
