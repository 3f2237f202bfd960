// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Defines all subcommands and global flags

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "little-plans")]
#[command(about = "List, edit and export your saved Little Plans documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL
    #[arg(long, global = true, env = "SUPABASE_URL", default_value = "http://localhost:54321")]
    pub api_base: String,

    /// Public (anon) API key sent with every request
    #[arg(long, global = true, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Access token (overrides session file/env)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Account id owning the documents (looked up from the token if omitted)
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Where downloads are written
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Export platform: limited exports Markdown, standard exports .docx
    #[arg(long, global = true, value_enum, default_value_t = PlatformChoice::Auto)]
    pub platform: PlatformChoice,

    /// User-agent string used for platform detection in auto mode
    #[arg(long, global = true, env = "LITTLE_PLANS_USER_AGENT")]
    pub user_agent: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformChoice {
    Auto,
    Limited,
    Standard,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List your documents (default)
    List,

    /// Download a document's stored content
    Download {
        /// Document ID
        id: String,

        /// Open the file once it is written
        #[arg(long)]
        open: bool,
    },

    /// Print a document as the editor sees it
    Show {
        /// Document ID
        id: String,
    },

    /// Edit a document in $VISUAL/$EDITOR and save it back
    Edit {
        /// Document ID
        id: String,

        /// Download the edited content before saving
        #[arg(long)]
        download: bool,

        /// Copy the edited content to the clipboard before saving
        #[arg(long)]
        copy: bool,

        /// Close without saving
        #[arg(long)]
        discard: bool,
    },

    /// Copy a document's text to the clipboard
    Copy {
        /// Document ID
        id: String,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::List)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_list() {
        let cli = Cli::parse_from(["little-plans", "--api-base", "http://localhost"]);
        assert!(matches!(cli.command(), Commands::List));
        assert_eq!(cli.api_base, "http://localhost");
        assert_eq!(cli.platform, PlatformChoice::Auto);
    }

    #[test]
    fn test_edit_flags() {
        let cli = Cli::parse_from([
            "little-plans",
            "--api-base",
            "http://localhost",
            "edit",
            "42",
            "--download",
            "--platform",
            "limited",
        ]);
        assert_eq!(cli.platform, PlatformChoice::Limited);
        match cli.command() {
            Commands::Edit {
                id,
                download,
                copy,
                discard,
            } => {
                assert_eq!(id, "42");
                assert!(download);
                assert!(!copy);
                assert!(!discard);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::parse_from(["little-plans", "--api-base", "x", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
