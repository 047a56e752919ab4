//! # `kxp-core`
//! This crate contains the core logic of `kuttl-expand`: parsing a test
//! definition, resolving suites and patches into concrete test cases, and
//! expanding those test cases onto disk from a Jinja2 template tree.
//!
//! # Pipeline
//! 1. [`loader`] parses the test-definition YAML into a [`loader::TestMatrixInput`].
//! 2. [`resolver`] turns that input into one [`model::EffectiveSuite`] per
//!    declared suite (plus the implicit `default` suite).
//! 3. [`expand`] walks a test's template tree and renders it once per
//!    resolved [`model::TestCase`].
//! 4. [`driver`] wires the three together against a filesystem layout.

pub mod driver;
pub mod error;
pub mod expand;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod resolver;

pub use error::{ConfigError, Error};

/// The tool name, used for the tracing target filter installed by the CLI
/// crate.
pub const TOOL_NAME: &str = "kxp";
