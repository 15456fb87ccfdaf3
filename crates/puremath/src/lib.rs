//! `puremath` - a step-by-step math tutor
//!
//! This library turns natural-language math questions into worked solutions.
//! Questions are normalized, classified into a category (arithmetic, algebra,
//! geometry, or calculus), solved with every transformation narrated, and
//! rendered as a transcript. Solutions are cached and every answered question
//! is recorded in a local history database.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod explain;
pub mod limiter;
pub mod logging;
pub mod normalize;
pub mod parse;
pub mod problem;
pub mod solve;
pub mod storage;
pub mod tutor;

pub use config::Config;
pub use error::{Error, Result};
pub use explain::TranscriptFormat;
pub use logging::init_logging;
pub use normalize::Normalizer;
pub use problem::{Category, Problem, Solution, Step};
pub use solve::SolverEngine;
pub use storage::{Storage, StorageStats};
pub use tutor::{Reply, Tutor};
