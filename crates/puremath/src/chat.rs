//! The interactive chat loop.
//!
//! A [`ChatSession`] reads messages from a [`ChatFrontend`], answers slash
//! commands itself, and hands everything else to the [`Tutor`]. The
//! [`ConsoleFrontend`] adapts the loop to stdin/stdout; other transports
//! implement the same trait.

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::debug;

use crate::error::Result;
use crate::explain::TranscriptFormat;
use crate::tutor::{failure_message, Tutor};

/// Client id under which chat questions are rate limited.
const CHAT_CLIENT: &str = "console";

/// A transport the chat loop can run over.
#[async_trait]
pub trait ChatFrontend {
    /// The next message from the person chatting, or `None` when the
    /// input has closed.
    async fn next_message(&mut self) -> Result<Option<String>>;

    /// Deliver a reply.
    async fn send(&mut self, text: &str) -> Result<()>;
}

/// Frontend over stdin/stdout with a prompt.
#[derive(Debug)]
pub struct ConsoleFrontend {
    prompt: String,
    input: BufReader<Stdin>,
    output: Stdout,
}

impl ConsoleFrontend {
    /// Create a console frontend with the given prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            input: BufReader::new(io::stdin()),
            output: io::stdout(),
        }
    }
}

#[async_trait]
impl ChatFrontend for ConsoleFrontend {
    async fn next_message(&mut self) -> Result<Option<String>> {
        self.output.write_all(self.prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

/// One chat conversation: a tutor behind a frontend.
#[derive(Debug)]
pub struct ChatSession<F> {
    tutor: Tutor,
    frontend: F,
    show_timing: bool,
}

impl<F: ChatFrontend> ChatSession<F> {
    /// Create a session over the given frontend.
    #[must_use]
    pub fn new(tutor: Tutor, frontend: F) -> Self {
        let show_timing = tutor.config().chat.show_timing;
        Self {
            tutor,
            frontend,
            show_timing,
        }
    }

    /// Run the conversation until the input closes or the person quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend fails to read or deliver messages.
    pub async fn run(&mut self) -> Result<()> {
        self.frontend.send(&welcome_banner()).await?;

        while let Some(message) = self.frontend.next_message().await? {
            let message = message.trim();
            if message.is_empty() {
                continue;
            }

            if let Some(command) = message.strip_prefix('/') {
                if !self.handle_command(command).await? {
                    break;
                }
                continue;
            }

            self.answer(message).await?;
        }

        Ok(())
    }

    /// Handle a slash command. Returns `false` when the session should end.
    async fn handle_command(&mut self, command: &str) -> Result<bool> {
        match command.trim().to_lowercase().as_str() {
            "start" => self.frontend.send(&welcome_banner()).await?,
            "help" => self.frontend.send(&help_message()).await?,
            "about" => self.frontend.send(&about_message()).await?,
            "examples" => self.frontend.send(&examples_message()).await?,
            "quit" | "exit" => {
                self.frontend.send("Goodbye!").await?;
                return Ok(false);
            }
            _ => self.frontend.send("Unknown command. Try /help").await?,
        }
        Ok(true)
    }

    async fn answer(&mut self, question: &str) -> Result<()> {
        match self.tutor.ask(question, Some(CHAT_CLIENT)).await {
            Ok(reply) => {
                let transcript = reply.render(TranscriptFormat::Plain)?;
                self.frontend.send(&transcript).await?;

                if self.show_timing {
                    let cached = if reply.cache_hit { " (cached)" } else { "" };
                    let line = format!(
                        "Answered in {}{cached}. Ask another question!",
                        reply.elapsed_display()
                    );
                    self.frontend.send(&line).await?;
                }
            }
            Err(err) => {
                debug!("question not answered: {err}");
                self.frontend.send(&failure_message(&err)).await?;
            }
        }
        Ok(())
    }
}

/// The banner shown when a conversation starts.
#[must_use]
pub fn welcome_banner() -> String {
    [
        "Welcome to puremath!",
        "",
        "I can help with:",
        "  - algebra equations",
        "  - calculus problems",
        "  - geometry formulas",
        "  - plain arithmetic",
        "",
        "Send a math problem, or try /examples for ideas.",
    ]
    .join("\n")
}

/// The `/help` menu.
#[must_use]
pub fn help_message() -> String {
    [
        "Commands:",
        "  /help      show this menu",
        "  /about     version and capabilities",
        "  /examples  sample problems to try",
        "  /quit      leave the chat",
        "",
        "Send math problems like:",
        "  solve 2x + 5 = 15",
        "  factor x^2 - 16",
        "  integral of x^2 + 3x dx",
        "",
        "Every answer shows its steps.",
    ]
    .join("\n")
}

/// The `/about` blurb.
#[must_use]
pub fn about_message() -> String {
    [
        concat!("puremath ", env!("CARGO_PKG_VERSION")),
        "",
        "A step-by-step tutor for arithmetic, algebra, geometry,",
        "and calculus. Every answer is a worked transcript, and",
        "repeated questions are answered from a local cache.",
    ]
    .join("\n")
}

/// The examples catalog, shared by the `/examples` chat command and the
/// `examples` CLI command.
#[must_use]
pub fn examples_message() -> String {
    [
        "Algebra:",
        "  solve 3x + 7 = 22",
        "  factor x^2 - 9",
        "  expand (x + 2)(x - 3)",
        "",
        "Calculus:",
        "  derivative of sin(x^2)",
        "  integral of e^x dx",
        "  limit of sin(x)/x as x -> 0",
        "",
        "Geometry:",
        "  area of circle r=5",
        "  volume of sphere r=3",
        "  pythagorean theorem a=3 b=4",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::config::Config;
    use crate::storage::Storage;

    struct ScriptedFrontend {
        inputs: VecDeque<String>,
        outputs: Vec<String>,
    }

    impl ScriptedFrontend {
        fn new(inputs: &[&str]) -> Self {
            Self {
                inputs: inputs.iter().map(ToString::to_string).collect(),
                outputs: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ChatFrontend for ScriptedFrontend {
        async fn next_message(&mut self) -> Result<Option<String>> {
            Ok(self.inputs.pop_front())
        }

        async fn send(&mut self, text: &str) -> Result<()> {
            self.outputs.push(text.to_string());
            Ok(())
        }
    }

    fn create_test_session(inputs: &[&str]) -> ChatSession<ScriptedFrontend> {
        let mut config = Config::default();
        config.limits.enabled = false;
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        let tutor = Tutor::with_storage(config, storage);
        ChatSession::new(tutor, ScriptedFrontend::new(inputs))
    }

    #[tokio::test]
    async fn test_welcome_banner_first() {
        let mut session = create_test_session(&[]);
        session.run().await.unwrap();

        assert!(session.frontend.outputs[0].contains("Welcome to puremath"));
    }

    #[tokio::test]
    async fn test_answers_math_question() {
        let mut session = create_test_session(&["what is 2 + 2"]);
        session.run().await.unwrap();

        let transcript = &session.frontend.outputs[1];
        assert!(transcript.contains("Solution: [4]"));

        let timing = &session.frontend.outputs[2];
        assert!(timing.contains("Ask another question!"));
    }

    #[tokio::test]
    async fn test_timing_line_suppressed() {
        let mut config = Config::default();
        config.limits.enabled = false;
        config.chat.show_timing = false;
        let storage = Storage::open_in_memory().unwrap();
        let tutor = Tutor::with_storage(config, storage);
        let mut session = ChatSession::new(tutor, ScriptedFrontend::new(&["2 + 2"]));

        session.run().await.unwrap();

        // Banner and transcript only.
        assert_eq!(session.frontend.outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_help_command() {
        let mut session = create_test_session(&["/help"]);
        session.run().await.unwrap();

        assert!(session.frontend.outputs[1].contains("/examples"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut session = create_test_session(&["/frobnicate"]);
        session.run().await.unwrap();

        assert_eq!(session.frontend.outputs[1], "Unknown command. Try /help");
    }

    #[tokio::test]
    async fn test_quit_stops_before_remaining_input() {
        let mut session = create_test_session(&["/quit", "2 + 2"]);
        session.run().await.unwrap();

        assert_eq!(session.frontend.outputs.len(), 2);
        assert_eq!(session.frontend.outputs[1], "Goodbye!");
    }

    #[tokio::test]
    async fn test_empty_input_skipped() {
        let mut session = create_test_session(&["", "   ", "/quit"]);
        session.run().await.unwrap();

        assert_eq!(session.frontend.outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_becomes_friendly_message() {
        let mut session = create_test_session(&["prove the riemann hypothesis"]);
        session.run().await.unwrap();

        let message = &session.frontend.outputs[1];
        assert!(message.contains("rephras") || message.contains("couldn't"));
    }

    #[tokio::test]
    async fn test_rate_limited_question_reported() {
        let mut config = Config::default();
        config.limits.enabled = true;
        config.limits.max_requests = 1;
        config.limits.window_secs = 60;
        let storage = Storage::open_in_memory().unwrap();
        let tutor = Tutor::with_storage(config, storage);
        let mut session =
            ChatSession::new(tutor, ScriptedFrontend::new(&["1 + 1", "2 + 2"]));

        session.run().await.unwrap();

        let last = session.frontend.outputs.last().unwrap();
        assert!(last.contains("Too many requests"));
    }

    #[tokio::test]
    async fn test_examples_catalog_problems_all_solve() {
        let mut config = Config::default();
        config.limits.enabled = false;
        let storage = Storage::open_in_memory().unwrap();
        let mut tutor = Tutor::with_storage(config, storage);

        for line in examples_message().lines() {
            let problem = line.trim();
            if problem.is_empty() || problem.ends_with(':') {
                continue;
            }
            let reply = tutor.ask(problem, None).await;
            assert!(reply.is_ok(), "catalog problem failed: {problem}");
        }
    }
}
