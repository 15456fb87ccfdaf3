//! # PuReMath Design Documentation
//!
//! This crate contains design documentation, architectural decision records,
//! and implementation guides for the PuReMath project.
//!
//! ## Documentation Location
//!
//! All design documents are located in the `docs/` directory at the root
//! of this crate.
//!
//! Key documents:
//! - `architecture.md` - Overall system architecture
//! - `solving.md` - Solver pipeline and transcript design
//! - `adr/` - Architectural Decision Records

// This is a documentation-only crate
#![no_std]
