//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Schema-validated frontmatter for template-driven notes.
#[derive(Debug, Parser)]
#[command(name = "stela", version, about)]
pub struct Cli {
    /// Path to the vault configuration file
    #[arg(long, global = true, default_value = "./stela.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load, validate, and resolve every schema in the vault
    Check,

    /// Inspect schemas
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },

    /// Inspect property bank entries
    Property {
        #[command(subcommand)]
        action: PropertyAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SchemaAction {
    /// List every registered schema name
    List,

    /// Show a schema's resolved property set
    Show {
        /// Schema name
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PropertyAction {
    /// Show a property bank entry
    Show {
        /// Property bank key
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_parses() {
        let cli = Cli::try_parse_from(["stela", "check"]).unwrap();
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.config, PathBuf::from("./stela.json"));
    }

    #[test]
    fn config_flag_overrides_default() {
        let cli = Cli::try_parse_from(["stela", "--config", "/tmp/v.json", "check"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/v.json"));
    }

    #[test]
    fn schema_show_requires_name() {
        assert!(Cli::try_parse_from(["stela", "schema", "show"]).is_err());
        let cli = Cli::try_parse_from(["stela", "schema", "show", "meeting"]).unwrap();
        match cli.command {
            Command::Schema {
                action: SchemaAction::Show { name },
            } => assert_eq!(name, "meeting"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn property_show_parses() {
        let cli = Cli::try_parse_from(["stela", "property", "show", "std_title"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Property {
                action: PropertyAction::Show { .. }
            }
        ));
    }
}
