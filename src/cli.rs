use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{ENV_API_URL, ENV_AUTH_TOKEN};

#[derive(Parser)]
#[command(name = "latitude-provider")]
#[command(version)]
#[command(about = "Declarative management of Latitude.sh resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API token (falls back to auth_token in config.toml)
    #[arg(long, env = ENV_AUTH_TOKEN, hide_env_values = true, global = true)]
    pub auth_token: Option<String>,

    /// API base URL
    #[arg(long, env = ENV_API_URL, global = true)]
    pub api_url: Option<String>,

    /// State file (default: state.toml in the state directory)
    #[arg(long, value_name = "FILE", global = true)]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List resource kinds and data sources
    Kinds,

    /// Show the fields of a resource kind or data source
    Schema {
        /// Kind name, e.g. latitudesh_server
        kind: String,
    },

    /// Create a resource from a TOML or JSON file of field values
    Create {
        /// Resource kind, e.g. latitudesh_server
        kind: String,

        /// Name to track the instance under
        name: String,

        /// File with the declared fields
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },

    /// Refresh an instance from the API
    Read {
        /// Instance name
        name: String,
    },

    /// Change fields of an instance in place
    Update {
        /// Instance name
        name: String,

        /// Field assignment (repeatable); lists are comma-separated
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Delete an instance
    Delete {
        /// Instance name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Bring an existing object under management
    Import {
        /// Resource kind
        kind: String,

        /// Name to track the instance under
        name: String,

        /// Identifier of the existing object
        id: String,
    },

    /// Resolve a data source filter to exactly one record
    Lookup {
        /// Data source, e.g. latitudesh_plan
        kind: String,

        /// Filter term (repeatable)
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// List tracked instances
    List,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let cli = Cli::try_parse_from([
            "latitude-provider",
            "update",
            "web",
            "--set",
            "hostname=web-2",
            "--set",
            "ssh_keys=a,b",
        ])
        .unwrap();
        match cli.command {
            Command::Update { name, set } => {
                assert_eq!(name, "web");
                assert_eq!(set, vec!["hostname=web-2", "ssh_keys=a,b"]);
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_update_requires_set() {
        assert!(Cli::try_parse_from(["latitude-provider", "update", "web"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "latitude-provider",
            "list",
            "--state",
            "/tmp/state.toml",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.state.as_deref(), Some("/tmp/state.toml"));
        assert_eq!(cli.verbose, 2);
    }
}
