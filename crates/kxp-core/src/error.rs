//! The error hierarchy shared by the loader, resolver, and expanders.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The maximum directory nesting level the template-tree expander will walk
/// before aborting, counted from the test-definition root (which counts as
/// level one).
pub const MAX_WALK_DEPTH: usize = 4;

/// Errors produced while loading, resolving, and expanding a test matrix.
#[derive(Debug, Error)]
pub enum Error {
    /// The input, a suite selection, or a filesystem layout was malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A filesystem operation failed.
    #[error("io error at {path}")]
    Io {
        /// The path the failing operation was performed on.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The template engine failed to render a template.
    #[error("failed to render template {template}")]
    Render {
        /// The name of the template that failed to render.
        template: String,

        /// The underlying error.
        #[source]
        source: minijinja::Error,
    },
}

impl Error {
    /// Wraps an [`io::Error`] with the path the operation was performed on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a [`minijinja::Error`] with the name of the failing template.
    pub fn render(template: impl Into<String>, source: minijinja::Error) -> Self {
        Self::Render {
            template: template.into(),
            source,
        }
    }
}

/// Configuration errors: malformed input, unknown references, or a
/// filesystem layout that doesn't match what the matrix expects.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input YAML failed to parse.
    #[error("failed to parse test definition yaml")]
    Yaml(#[from] serde_yaml::Error),

    /// A suite entry was missing its `name` field.
    #[error("a suite is missing its required [name] property")]
    SuiteMissingName,

    /// A dimension declared an empty `values` list.
    #[error("dimension {name:?} has an empty values list")]
    EmptyDimension {
        /// The offending dimension's name.
        name: String,
    },

    /// No suite with the requested name exists among the resolved effective
    /// suites.
    #[error("cannot find suite {name:?}")]
    UnknownSuite {
        /// The suite name that was requested.
        name: String,
    },

    /// A test definition's template directory doesn't exist (or isn't a
    /// directory) under the template root.
    #[error("test definition directory not found: {path}")]
    MissingTemplateDir {
        /// The expected template directory.
        path: PathBuf,
    },

    /// The runner-config template file doesn't exist.
    #[error("runner config template not found: {path}")]
    MissingRunnerConfigTemplate {
        /// The expected template file.
        path: PathBuf,
    },

    /// The template-tree walker exceeded [`MAX_WALK_DEPTH`] while expanding a
    /// test case.
    #[error("maximum recursion depth ({MAX_WALK_DEPTH}) exceeded under {root}")]
    DepthExceeded {
        /// The test-definition root the walk started from.
        root: PathBuf,
    },

    /// The `lookup` template hook was called with a domain other than `env`.
    #[error("lookup() only supports the 'env' domain, got {domain:?}")]
    InvalidLookupDomain {
        /// The domain that was requested.
        domain: String,
    },
}
