//! Identity management commands.

use crate::cli::{IdentityAction, IdentityArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rapport_domain::traits::IdentityDirectory;
use rapport_domain::Identity;
use rapport_store::SqliteStore;

/// Execute identity management commands.
pub fn execute_identity(
    args: IdentityArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        IdentityAction::Add {
            provider,
            remote_id,
        } => {
            let identity = add_identity(store, &provider, &remote_id)?;
            println!(
                "{}",
                formatter.success(&format!("Identity registered: {} ({})", identity, identity.id))
            );
        }
        IdentityAction::List { provider } => {
            let identities = match provider {
                Some(provider) => store.get_identities(&provider)?,
                None => store.list_identities()?,
            };
            println!("{}", formatter.format_identities(&identities)?);
        }
    }

    Ok(())
}

/// Register an identity unless the provider already has this remote id.
pub fn add_identity(store: &mut SqliteStore, provider: &str, remote_id: &str) -> Result<Identity> {
    if provider.trim().is_empty() || remote_id.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "Provider and remote id must not be empty".to_string(),
        ));
    }

    if let Some(existing) = store.find_identity_by_remote_id(provider, remote_id)? {
        return Ok(existing);
    }

    let identity = Identity::new(provider, remote_id);
    store.save_identity(&identity)?;
    Ok(identity)
}
