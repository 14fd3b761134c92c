//! Relationship lifecycle commands.

use super::{load_relationship, resolve_identity, Manager};
use crate::cli::{InviteArgs, RelationshipArg};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rapport_domain::Identity;
use tracing::debug;

/// A transition applied to an existing relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Accept the invitation
    Confirm,
    /// Decline the invitation
    Deny,
    /// Delete the relationship
    Remove,
    /// Ignore the invitation
    Ignore,
}

impl Transition {
    fn past_tense(&self) -> &'static str {
        match self {
            Transition::Confirm => "confirmed",
            Transition::Deny => "denied",
            Transition::Remove => "removed",
            Transition::Ignore => "ignored",
        }
    }
}

/// Execute the invite command.
///
/// Identities not registered yet are created under the configured provider.
pub fn execute_invite(
    args: InviteArgs,
    manager: &mut Manager,
    formatter: &Formatter,
) -> Result<()> {
    if args.from == args.to {
        return Err(CliError::InvalidInput(format!(
            "'{}' cannot invite themselves",
            args.from
        )));
    }

    let inviter = find_or_create(manager, &args.from)?;
    let invitee = find_or_create(manager, &args.to)?;

    if let Some(existing) = manager.get_relationship(&inviter, &invitee)? {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} and {} already have relationship {}",
                inviter, invitee, existing.id
            ))
        );
        return Ok(());
    }

    let relationship = manager.invite(&inviter, &invitee)?;
    println!("{}", formatter.transition("requested", &relationship));
    Ok(())
}

/// Execute confirm, deny, remove or ignore on a relationship.
pub fn execute_transition(
    transition: Transition,
    args: RelationshipArg,
    manager: &mut Manager,
    formatter: &Formatter,
) -> Result<()> {
    let mut relationship = load_relationship(manager, &args.id)?;
    debug!(relationship = %relationship.id, ?transition, "Applying transition");

    match transition {
        Transition::Confirm => manager.confirm(&mut relationship)?,
        Transition::Deny => manager.deny(&relationship)?,
        Transition::Remove => manager.remove(&relationship)?,
        Transition::Ignore => manager.ignore(&mut relationship)?,
    }

    println!("{}", formatter.transition(transition.past_tense(), &relationship));
    Ok(())
}

fn find_or_create(manager: &Manager, remote_id: &str) -> Result<Identity> {
    match resolve_identity(manager, remote_id) {
        Ok(identity) => Ok(identity),
        Err(CliError::UnknownIdentity(_)) => Ok(Identity::new(
            manager.config().identity_provider.clone(),
            remote_id,
        )),
        Err(e) => Err(e),
    }
}
