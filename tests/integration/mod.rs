//! Integration test suite for scenec
//!
//! End-to-end conversions against real source trees on disk, through both the
//! library and the `scenec` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **convert**: rehoming, shared dependencies, reports, CLI conversion
//! - **extract**: sub-model extraction and reloading the written output
//! - **probe**: probe output through the CLI

mod convert;
mod extract;
mod probe;
