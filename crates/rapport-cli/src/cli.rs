//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rapport CLI - Manage relationships between identities.
#[derive(Debug, Parser)]
#[command(name = "rapport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(short, long, global = true, env = "RAPPORT_DATABASE")]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage registered identities
    Identity(IdentityArgs),

    /// Send an invitation from one identity to another
    Invite(InviteArgs),

    /// Accept an invitation
    Confirm(RelationshipArg),

    /// Decline an invitation (deletes it)
    Deny(RelationshipArg),

    /// Delete a relationship
    Remove(RelationshipArg),

    /// Ignore an invitation
    Ignore(RelationshipArg),

    /// List relationships of an identity
    List(ListArgs),

    /// Show the relationship status between two identities
    Status(StatusArgs),

    /// List identities not yet related to an identity
    Suggest(SuggestArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Arguments for identity management.
#[derive(Debug, Parser)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub action: IdentityAction,
}

/// Identity management actions.
#[derive(Debug, Subcommand)]
pub enum IdentityAction {
    /// Register an identity
    Add {
        /// Identity provider (e.g. organization)
        provider: String,
        /// Identifier within the provider
        remote_id: String,
    },

    /// List registered identities
    List {
        /// Only identities of this provider
        #[arg(short, long)]
        provider: Option<String>,
    },
}

/// Arguments for the invite command.
#[derive(Debug, Parser)]
pub struct InviteArgs {
    /// Remote id of the inviter
    pub from: String,

    /// Remote id of the invitee
    pub to: String,
}

/// A relationship identifier.
#[derive(Debug, Parser)]
pub struct RelationshipArg {
    /// Relationship ID
    pub id: String,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Remote id of the identity
    pub remote_id: String,

    #[command(flatten)]
    pub filter: ListFilter,
}

/// Which relationships to list. At most one flag applies.
#[derive(Debug, Default, Args)]
#[group(multiple = false)]
pub struct ListFilter {
    /// Confirmed relationships only
    #[arg(long)]
    pub contacts: bool,

    /// Pending relationships, sent and received
    #[arg(long)]
    pub pending: bool,

    /// Invitations waiting for this identity's answer
    #[arg(long)]
    pub incoming: bool,

    /// Invitations sent by this identity still unanswered
    #[arg(long)]
    pub outgoing: bool,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Remote id of the identity looking at the relationship
    pub viewer: String,

    /// Remote id of the other identity
    pub other: String,
}

/// Arguments for the suggest command.
#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Remote id of the identity
    pub remote_id: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_invite_command() {
        let cli = Cli::parse_from(["rapport", "invite", "john", "mary"]);
        match cli.command {
            Command::Invite(args) => {
                assert_eq!(args.from, "john");
                assert_eq!(args.to, "mary");
            }
            _ => panic!("Expected Invite command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "rapport",
            "confirm",
            "0190a5b2-0000-7000-8000-000000000000",
            "--database",
            "people.db",
            "--format",
            "json",
        ]);
        assert_eq!(cli.database, Some(PathBuf::from("people.db")));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(cli.command, Command::Confirm(_)));
    }

    #[test]
    fn test_list_filters_are_exclusive() {
        let result = Cli::try_parse_from(["rapport", "list", "john", "--contacts", "--pending"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["rapport", "list", "john", "--incoming"]);
        match cli.command {
            Command::List(args) => assert!(args.filter.incoming),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_identity_add() {
        let cli = Cli::parse_from(["rapport", "identity", "add", "organization", "john"]);
        match cli.command {
            Command::Identity(IdentityArgs {
                action: IdentityAction::Add { provider, remote_id },
            }) => {
                assert_eq!(provider, "organization");
                assert_eq!(remote_id, "john");
            }
            _ => panic!("Expected identity add"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["rapport", "config", "init", "--force"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected config init"),
        }
    }

    #[test]
    fn test_format_conversion() {
        let format: OutputFormat = CliFormat::Quiet.into();
        assert_eq!(format, OutputFormat::Quiet);
    }
}
