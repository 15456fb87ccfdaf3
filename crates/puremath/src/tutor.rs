//! The answering service.
//!
//! [`Tutor`] runs one question end to end: rate-limit check, cache lookup,
//! normalize, classify, solve on a blocking thread with a timeout, then
//! cache store and history record. Every surface (chat loop, one-shot CLI)
//! goes through it, so caching and limiting behave the same everywhere.

use std::sync::Arc;
use std::time::Instant;

use chrono::Duration;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::explain::{self, TranscriptFormat};
use crate::limiter::RateLimiter;
use crate::normalize::Normalizer;
use crate::problem::{Problem, Solution};
use crate::solve::SolverEngine;
use crate::storage::{HistoryEntry, Storage};

/// A finished answer with its timing and cache provenance.
#[derive(Debug, Clone)]
pub struct Reply {
    /// The question, raw and normalized.
    pub problem: Problem,
    /// The worked solution.
    pub solution: Solution,
    /// Wall-clock time spent answering, in milliseconds.
    pub duration_ms: u64,
    /// Whether the answer came from the cache.
    pub cache_hit: bool,
}

impl Reply {
    /// Render the transcript in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: TranscriptFormat) -> Result<String> {
        explain::render(&self.problem, &self.solution, format)
    }

    /// The elapsed time as a short human-readable string, e.g. `0.04s`.
    #[must_use]
    pub fn elapsed_display(&self) -> String {
        let secs = self.duration_ms / 1000;
        let hundredths = (self.duration_ms % 1000) / 10;
        format!("{secs}.{hundredths:02}s")
    }
}

/// Answers questions, front to back.
#[derive(Debug)]
pub struct Tutor {
    config: Config,
    normalizer: Normalizer,
    engine: Arc<SolverEngine>,
    storage: Storage,
    limiter: RateLimiter,
}

impl Tutor {
    /// Create a tutor backed by the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        Ok(Self::with_storage(config, storage))
    }

    /// Create a tutor over an existing storage instance.
    #[must_use]
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let normalizer = Normalizer::with_config(&config.normalize);
        let engine = Arc::new(SolverEngine::new(&config.solver));
        let limiter = RateLimiter::new(&config.limits);

        Self {
            config,
            normalizer,
            engine,
            storage,
            limiter,
        }
    }

    /// Answer a question, consulting the cache.
    ///
    /// # Errors
    ///
    /// Returns an error when the client is rate limited, the question cannot
    /// be understood or solved, or solving exceeds the configured timeout.
    pub async fn ask(&mut self, question: &str, client: Option<&str>) -> Result<Reply> {
        self.ask_with_options(question, client, true).await
    }

    /// Answer a question, optionally bypassing the cache lookup.
    ///
    /// A bypassed lookup still stores the fresh solution, so the cache
    /// stays warm for later callers.
    ///
    /// # Errors
    ///
    /// Returns an error when the client is rate limited, the question cannot
    /// be understood or solved, or solving exceeds the configured timeout.
    pub async fn ask_with_options(
        &mut self,
        question: &str,
        client: Option<&str>,
        use_cache: bool,
    ) -> Result<Reply> {
        if let Some(client) = client {
            self.limiter.check(client)?;
        }

        let started = Instant::now();
        let statement = self.normalizer.normalize(question);
        let problem = Problem::new(question.to_string(), statement);

        if use_cache {
            let ttl = self.cache_ttl();
            if let Some(cached) = self.storage.cache_lookup(&problem.statement_hash, ttl)? {
                let duration_ms = elapsed_ms(started);
                debug!("Cache hit for: {}", problem.statement);
                self.record_history(&problem, &cached.solution, duration_ms, true)?;

                return Ok(Reply {
                    problem,
                    solution: cached.solution,
                    duration_ms,
                    cache_hit: true,
                });
            }
        }

        let solution = self.solve_with_timeout(&problem.statement).await?;
        let duration_ms = elapsed_ms(started);
        info!(
            category = %solution.category,
            steps = solution.step_count(),
            duration_ms,
            "answered: {}",
            problem.statement
        );

        self.storage.cache_store(&problem, &solution)?;
        self.record_history(&problem, &solution, duration_ms, false)?;

        Ok(Reply {
            problem,
            solution,
            duration_ms,
            cache_hit: false,
        })
    }

    /// Run the solver on a blocking thread, bounded by the configured timeout.
    async fn solve_with_timeout(&self, statement: &str) -> Result<Solution> {
        let engine = Arc::clone(&self.engine);
        let text = statement.to_string();
        let handle = task::spawn_blocking(move || engine.solve_text(&text));

        match timeout(self.config.solve_timeout(), handle).await {
            Err(_) => Err(Error::Timeout {
                operation: format!("solving '{statement}'"),
            }),
            Ok(Err(join_error)) => Err(Error::internal(format!(
                "solver task failed: {join_error}"
            ))),
            Ok(Ok(result)) => result,
        }
    }

    /// Log the interaction and apply the configured history retention.
    fn record_history(
        &self,
        problem: &Problem,
        solution: &Solution,
        duration_ms: u64,
        cache_hit: bool,
    ) -> Result<()> {
        let entry = HistoryEntry::new(
            problem.statement.clone(),
            solution.category,
            &solution.answer,
            duration_ms,
            cache_hit,
            self.config.storage.answer_preview_chars,
        );
        self.storage.history_record(&entry)?;

        if self.config.storage.max_history > 0 {
            self.storage
                .history_prune_keep_recent(self.config.storage.max_history)?;
        }
        if let Some(max_age) = self
            .config
            .history_max_age()
            .and_then(|age| Duration::from_std(age).ok())
        {
            self.storage.history_prune_older_than(max_age)?;
        }

        Ok(())
    }

    fn cache_ttl(&self) -> Option<Duration> {
        self.config
            .cache_ttl()
            .and_then(|ttl| Duration::from_std(ttl).ok())
    }

    /// The storage behind this tutor.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Map an error to the stable message shown to the person asking.
#[must_use]
pub fn failure_message(error: &Error) -> String {
    match error {
        Error::RateLimited { retry_after_secs } => format!(
            "Too many requests. Please wait {retry_after_secs} seconds before asking again."
        ),
        Error::Parse { message, .. } => {
            format!("I couldn't read that as a math problem: {message}.")
        }
        Error::UnsupportedProblem { message } | Error::MathDomain { message } => {
            format!("I couldn't generate a solution: {message}. Please try rephrasing your question.")
        }
        Error::Timeout { .. } => {
            "That took too long to solve. Please try a simpler form of the question.".to_string()
        }
        _ => "An error occurred while processing your question. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tutor() -> Tutor {
        let mut config = Config::default();
        config.limits.enabled = false;
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        Tutor::with_storage(config, storage)
    }

    #[tokio::test]
    async fn test_ask_solves_and_records() {
        let mut tutor = create_test_tutor();

        let reply = tutor.ask("what is 2 + 2", None).await.unwrap();
        assert_eq!(reply.solution.answer, "4");
        assert!(!reply.cache_hit);

        let history = tutor.storage().history_recent(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].statement, "what is 2 + 2");
        assert!(!history[0].cache_hit);
    }

    #[tokio::test]
    async fn test_second_ask_hits_cache() {
        let mut tutor = create_test_tutor();

        let first = tutor.ask("what is 6 * 7", None).await.unwrap();
        assert!(!first.cache_hit);

        let second = tutor.ask("what is 6 * 7", None).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.solution.answer, first.solution.answer);

        let history = tutor.storage().history_recent(10).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].cache_hit);
    }

    #[tokio::test]
    async fn test_notation_variants_share_cache_entry() {
        let mut tutor = create_test_tutor();

        tutor.ask("2 × 2", None).await.unwrap();
        let reply = tutor.ask("2 * 2", None).await.unwrap();

        assert!(reply.cache_hit);
        assert_eq!(tutor.storage().cache_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_bypasses_lookup_but_still_stores() {
        let mut tutor = create_test_tutor();

        let first = tutor
            .ask_with_options("what is 3 + 3", None, false)
            .await
            .unwrap();
        let second = tutor
            .ask_with_options("what is 3 + 3", None, false)
            .await
            .unwrap();

        assert!(!first.cache_hit);
        assert!(!second.cache_hit);
        assert_eq!(tutor.storage().cache_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_enforced_per_client() {
        let mut config = Config::default();
        config.limits.enabled = true;
        config.limits.max_requests = 1;
        config.limits.window_secs = 60;
        let storage = Storage::open_in_memory().unwrap();
        let mut tutor = Tutor::with_storage(config, storage);

        tutor.ask("1 + 1", Some("alice")).await.unwrap();
        let denied = tutor.ask("2 + 2", Some("alice")).await.unwrap_err();
        assert!(denied.is_rate_limited());

        // Anonymous requests are not limited.
        assert!(tutor.ask("3 + 3", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_question_maps_to_rephrase_message() {
        let mut tutor = create_test_tutor();

        let err = tutor
            .ask("prove the riemann hypothesis", None)
            .await
            .unwrap_err();
        let message = failure_message(&err);
        assert!(message.contains("rephras"));
    }

    #[tokio::test]
    async fn test_history_keeps_normalized_statement() {
        let mut tutor = create_test_tutor();
        tutor.ask("Solve 2x + 5 = 13", None).await.unwrap();

        let history = tutor.storage().history_recent(1).unwrap();
        assert_eq!(history[0].statement, "solve 2x + 5 = 13");
        assert_eq!(history[0].answer_preview, "x = 4");
    }

    #[tokio::test]
    async fn test_history_prune_applies_max() {
        let mut config = Config::default();
        config.limits.enabled = false;
        config.storage.max_history = 2;
        let storage = Storage::open_in_memory().unwrap();
        let mut tutor = Tutor::with_storage(config, storage);

        for question in ["1 + 1", "2 + 2", "3 + 3", "4 + 4"] {
            tutor.ask(question, None).await.unwrap();
        }

        assert_eq!(tutor.storage().history_count().unwrap(), 2);
    }

    #[test]
    fn test_failure_message_rate_limited() {
        let message = failure_message(&Error::RateLimited {
            retry_after_secs: 42,
        });
        assert!(message.contains("42 seconds"));
    }

    #[test]
    fn test_failure_message_unsupported() {
        let message = failure_message(&Error::unsupported("matrix inverses are not supported"));
        assert!(message.contains("matrix inverses are not supported"));
        assert!(message.contains("rephrasing"));
    }

    #[test]
    fn test_failure_message_fallback() {
        let message = failure_message(&Error::internal("boom"));
        assert!(!message.contains("boom"));
        assert!(message.contains("try again"));
    }

    #[test]
    fn test_elapsed_display() {
        let reply = Reply {
            problem: Problem::new("2+2".to_string(), "2+2".to_string()),
            solution: Solution {
                answer: "4".to_string(),
                steps: vec![],
                category: crate::problem::Category::Arithmetic,
            },
            duration_ms: 1234,
            cache_hit: false,
        };
        assert_eq!(reply.elapsed_display(), "1.23s");
    }
}
