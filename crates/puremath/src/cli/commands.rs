//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::explain::TranscriptFormat;
use crate::problem::Category;

/// Solve command arguments.
#[derive(Debug, Args)]
pub struct SolveCommand {
    /// The question to solve (quote multi-word questions)
    pub question: String,

    /// Skip the solution cache for this question
    #[arg(long)]
    pub no_cache: bool,

    /// Client id used for rate limiting (limits are skipped when omitted)
    #[arg(long)]
    pub client: Option<String>,

    /// Transcript format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: TranscriptFormatArg,
}

/// History commands.
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List recent questions
    List {
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show questions of this category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Search past questions and answers
    Search {
        /// Text to look for in questions and answer previews
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete all history entries
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Cache commands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show cache and history statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete all cached solutions
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Problem category argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Plain numeric computation
    Arithmetic,
    /// Equations and symbolic manipulation
    Algebra,
    /// Shape measurements
    Geometry,
    /// Derivatives, integrals, and limits
    Calculus,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Arithmetic => Self::Arithmetic,
            CategoryArg::Algebra => Self::Algebra,
            CategoryArg::Geometry => Self::Geometry,
            CategoryArg::Calculus => Self::Calculus,
        }
    }
}

/// Transcript format argument for the solve command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TranscriptFormatArg {
    /// Plain text transcript
    #[default]
    Plain,
    /// Markdown transcript
    Markdown,
    /// JSON transcript
    Json,
}

impl From<TranscriptFormatArg> for TranscriptFormat {
    fn from(arg: TranscriptFormatArg) -> Self {
        match arg {
            TranscriptFormatArg::Plain => Self::Plain,
            TranscriptFormatArg::Markdown => Self::Markdown,
            TranscriptFormatArg::Json => Self::Json,
        }
    }
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
