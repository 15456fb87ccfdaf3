//! Category-dispatched problem solving.
//!
//! [`classify`] turns a normalized question into a [`Task`]; the
//! [`SolverEngine`] hands each task to the solver for its category.
//! Every solver narrates its work step by step, so the result carries
//! both the answer and the route there.
//!
//! ```
//! use puremath::config::SolverConfig;
//! use puremath::solve::SolverEngine;
//!
//! let engine = SolverEngine::new(&SolverConfig::default());
//! let solution = engine.solve_text("solve 2x + 5 = 13")?;
//! assert_eq!(solution.answer, "x = 4");
//! # Ok::<(), puremath::Error>(())
//! ```

mod algebra;
mod arithmetic;
mod calculus;
mod engine;
mod geometry;
mod intent;
mod polynomial;

pub use algebra::AlgebraSolver;
pub use arithmetic::ArithmeticSolver;
pub use calculus::CalculusSolver;
pub use engine::{CategorySolver, SolverEngine};
pub use geometry::{parse_request, GeometryRequest, GeometrySolver};
pub use intent::{builtin_intents, classify, Classifier, IntentPattern, LimitTarget, Task};
pub use polynomial::Poly;
