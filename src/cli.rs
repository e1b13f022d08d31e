use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Enigma — messaging API with public-key token authentication
#[derive(Parser)]
#[command(name = "enigma", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to bind (overrides ENIGMA_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage registered users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user with a PEM public key read from a file
    Add {
        #[arg(long)]
        username: String,
        /// Path to a PEM file (PUBLIC KEY or RSA PUBLIC KEY)
        #[arg(long)]
        public_key: PathBuf,
    },
    /// List registered users
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["enigma"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_user_add_parses() {
        let cli = Cli::try_parse_from([
            "enigma",
            "user",
            "add",
            "--username",
            "alice",
            "--public-key",
            "alice.pub.pem",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::User {
                command: UserCommands::Add { username, public_key },
            }) => {
                assert_eq!(username, "alice");
                assert_eq!(public_key, PathBuf::from("alice.pub.pem"));
            }
            _ => panic!("expected user add"),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["enigma", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9000) })));
    }
}
