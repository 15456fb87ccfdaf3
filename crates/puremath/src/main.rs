//! `pmath` - CLI for puremath
//!
//! This binary provides the command-line interface for solving math questions,
//! chatting with the tutor, and inspecting past solutions.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use puremath::chat::{examples_message, ChatSession, ConsoleFrontend};
use puremath::cli::{
    CacheCommand, Cli, Command, ConfigCommand, HistoryCommand, OutputFormat, SolveCommand,
};
use puremath::storage::HistoryEntry;
use puremath::tutor::{failure_message, Tutor};
use puremath::{init_logging, Config, Error, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Solve(solve_cmd) => handle_solve(config, solve_cmd).await,
        Command::Chat => handle_chat(config).await,
        Command::Examples => {
            println!("{}", examples_message());
            Ok(())
        }
        Command::History(history_cmd) => handle_history(&config, history_cmd),
        Command::Cache(cache_cmd) => handle_cache(&config, cache_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_solve(config: Config, cmd: SolveCommand) -> Result<()> {
    let mut tutor = Tutor::new(config)?;
    let reply = tutor
        .ask_with_options(&cmd.question, cmd.client.as_deref(), !cmd.no_cache)
        .await;

    match reply {
        Ok(reply) => {
            println!("{}", reply.render(cmd.format.into())?);
            Ok(())
        }
        Err(err)
            if err.is_user_error()
                || err.is_rate_limited()
                || matches!(err, Error::Timeout { .. }) =>
        {
            eprintln!("{}", failure_message(&err));
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn handle_chat(config: Config) -> Result<()> {
    let prompt = config.chat.prompt.clone();
    let tutor = Tutor::new(config)?;
    let mut session = ChatSession::new(tutor, ConsoleFrontend::new(prompt));
    session.run().await?;
    Ok(())
}

fn handle_history(config: &Config, cmd: HistoryCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        HistoryCommand::List {
            limit,
            category,
            format,
        } => {
            let entries = match category {
                Some(category) => storage.history_by_category(category.into(), limit)?,
                None => storage.history_recent(limit)?,
            };
            print_history(&entries, format)?;
        }
        HistoryCommand::Search {
            query,
            limit,
            format,
        } => {
            let entries = storage.history_search(&query, limit)?;
            print_history(&entries, format)?;
        }
        HistoryCommand::Clear { yes } => {
            if yes {
                let removed = storage.history_clear()?;
                println!("Removed {removed} history entries.");
            } else {
                println!("This will delete all question history.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn print_history(entries: &[HistoryEntry], format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }

    match format {
        OutputFormat::Plain => {
            for entry in entries {
                println!(
                    "{} [{}] {} => {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.category,
                    entry.statement,
                    entry.answer_preview
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<17} {:<10} {:<6} {}",
                "TIME", "CATEGORY", "CACHE", "QUESTION"
            );
            for entry in entries {
                let time = entry.timestamp.format("%Y-%m-%d %H:%M").to_string();
                let cache = if entry.cache_hit { "hit" } else { "miss" };
                println!(
                    "{:<17} {:<10} {:<6} {}",
                    time,
                    entry.category.to_string(),
                    cache,
                    truncate(&entry.statement, 60)
                );
            }
        }
        OutputFormat::Json => {}
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{prefix}...")
    }
}

fn handle_cache(config: &Config, cmd: CacheCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        CacheCommand::Stats { json } => {
            let stats = storage.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("puremath storage");
                println!("----------------");
                println!("Database:         {}", storage.path().display());
                println!("Cached solutions: {}", stats.cached_solutions);
                println!("History entries:  {}", stats.history_entries);
                if let Some(oldest) = stats.oldest_entry {
                    println!("Oldest entry:     {}", oldest.format("%Y-%m-%d %H:%M"));
                }
                if let Some(newest) = stats.newest_entry {
                    println!("Newest entry:     {}", newest.format("%Y-%m-%d %H:%M"));
                }
                println!("Database size:    {} bytes", stats.db_size_bytes);
            }
        }
        CacheCommand::Clear { yes } => {
            if yes {
                let removed = storage.cache_clear()?;
                println!("Removed {removed} cached solutions.");
            } else {
                println!("This will delete all cached solutions.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:     {}", config.database_path().display());
                println!("  Max history:       {}", config.storage.max_history);
                println!("  Max age (days):    {}", config.storage.max_age_days);
                println!("  Cache TTL (days):  {}", config.storage.cache_ttl_days);
                println!("  Preview chars:     {}", config.storage.answer_preview_chars);
                println!();
                println!("[Solver]");
                println!("  Timeout (secs):    {}", config.solver.timeout_secs);
                println!("  Max steps:         {}", config.solver.max_steps);
                println!("  Approx decimals:   {}", config.solver.approx_decimals);
                println!();
                println!("[Limits]");
                println!("  Enabled:           {}", config.limits.enabled);
                println!("  Max requests:      {}", config.limits.max_requests);
                println!("  Window (secs):     {}", config.limits.window_secs);
                println!();
                println!("[Normalize]");
                println!("  Rules enabled:     {}", config.normalize.rules_enabled);
                println!("  Custom rules:      {}", config.normalize.custom_rules.len());
                println!();
                println!("[Chat]");
                println!("  Prompt:            {:?}", config.chat.prompt);
                println!("  Show timing:       {}", config.chat.show_timing);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
