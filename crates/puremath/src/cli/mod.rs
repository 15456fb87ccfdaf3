//! Command-line interface for puremath.
//!
//! This module provides the CLI structure and command handlers for the
//! `pmath` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CacheCommand, CategoryArg, ConfigCommand, HistoryCommand, OutputFormat, SolveCommand,
    TranscriptFormatArg,
};

/// pmath - step-by-step math answers
///
/// Solves arithmetic, algebra, geometry, and calculus questions and
/// narrates every transformation on the way to the answer.
#[derive(Debug, Parser)]
#[command(name = "pmath")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a single question and print the worked transcript
    Solve(SolveCommand),

    /// Start an interactive chat session
    Chat,

    /// Show sample problems to try
    Examples,

    /// Inspect past questions
    #[command(subcommand)]
    History(HistoryCommand),

    /// Inspect or clear the solution cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "pmath");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_quiet() {
        let cli = Cli {
            config: None,
            verbose: 0,
            quiet: true,
            command: Command::Examples,
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_normal() {
        let cli = Cli {
            config: None,
            verbose: 0,
            quiet: false,
            command: Command::Examples,
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_verbose() {
        let cli = Cli {
            config: None,
            verbose: 1,
            quiet: false,
            command: Command::Examples,
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_trace() {
        let cli = Cli {
            config: None,
            verbose: 2,
            quiet: false,
            command: Command::Examples,
        };
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_solve() {
        let args = vec!["pmath", "solve", "what is 2 + 2"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Solve(cmd) = cli.command else {
            panic!("expected solve command");
        };
        assert_eq!(cmd.question, "what is 2 + 2");
        assert!(!cmd.no_cache);
        assert_eq!(cmd.format, TranscriptFormatArg::Plain);
    }

    #[test]
    fn test_parse_solve_with_options() {
        let args = vec![
            "pmath", "solve", "factor x^2 - 9", "--format", "json", "--no-cache", "--client",
            "alice",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Solve(cmd) = cli.command else {
            panic!("expected solve command");
        };
        assert!(cmd.no_cache);
        assert_eq!(cmd.client.as_deref(), Some("alice"));
        assert_eq!(cmd.format, TranscriptFormatArg::Json);
    }

    #[test]
    fn test_parse_solve_requires_question() {
        let args = vec!["pmath", "solve"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_chat() {
        let args = vec!["pmath", "chat"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Chat));
    }

    #[test]
    fn test_parse_examples() {
        let args = vec!["pmath", "examples"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Examples));
    }

    #[test]
    fn test_parse_history_list() {
        let args = vec!["pmath", "history", "list", "--limit", "5", "--category", "algebra"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::History(HistoryCommand::List {
            limit, category, ..
        }) = cli.command
        else {
            panic!("expected history list command");
        };
        assert_eq!(limit, 5);
        assert_eq!(category, Some(CategoryArg::Algebra));
    }

    #[test]
    fn test_parse_history_search() {
        let args = vec!["pmath", "history", "search", "derivative"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::History(HistoryCommand::Search { query, limit, .. }) = cli.command else {
            panic!("expected history search command");
        };
        assert_eq!(query, "derivative");
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_parse_history_clear() {
        let args = vec!["pmath", "history", "clear", "--yes"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::History(HistoryCommand::Clear { yes: true })
        ));
    }

    #[test]
    fn test_parse_cache_stats() {
        let args = vec!["pmath", "cache", "stats", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cache(CacheCommand::Stats { json: true })
        ));
    }

    #[test]
    fn test_parse_cache_clear_without_yes() {
        let args = vec!["pmath", "cache", "clear"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cache(CacheCommand::Clear { yes: false })
        ));
    }

    #[test]
    fn test_parse_config_show() {
        let args = vec!["pmath", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }

    #[test]
    fn test_parse_config_validate_with_file() {
        let args = vec!["pmath", "config", "validate", "--file", "/tmp/pm.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Config(ConfigCommand::Validate { file }) = cli.command else {
            panic!("expected config validate command");
        };
        assert_eq!(file, Some(PathBuf::from("/tmp/pm.toml")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["pmath", "-c", "/custom/config.toml", "examples"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["pmath", "-v", "examples"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["pmath", "-q", "examples"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
