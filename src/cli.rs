use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "rating profiles server")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the web server
    Serve {
        /// Port number (optional, defaults to 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// Create missing database tables
    Init,
    /// Drop and recreate every database table
    Reset,
    /// Load players, ratings and games from a JSON snapshot
    Import {
        /// Path to the snapshot file
        path: PathBuf,
    },
    /// Rebuild matchups, win counts and top ratings from stored games
    Process,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["rating_profiles", "serve"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: 8000 });

        let cli = Cli::try_parse_from(["rating_profiles", "serve", "-p", "9000"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: 9000 });

        let cli = Cli::try_parse_from(["rating_profiles", "import", "snapshot.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Import {
                path: PathBuf::from("snapshot.json")
            }
        );

        assert!(Cli::try_parse_from(["rating_profiles", "import"]).is_err());
    }
}
