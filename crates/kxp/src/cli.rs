//! Command line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use kxp_core::driver::DriverConfig;

/// kuttl-expand exited successfully.
pub const EXIT_OK: u8 = 0;

/// The input, a suite selection, or a filesystem layout was invalid.
pub const EXIT_CONFIG_ERROR: u8 = 1;

/// A filesystem operation failed.
pub const EXIT_IO_ERROR: u8 = 2;

/// A template failed to render.
pub const EXIT_RENDER_ERROR: u8 = 3;

/// Expands a kuttl test matrix of Jinja2 templates into concrete kuttl test
/// suites.
#[derive(Debug, Parser)]
#[command(version, about, disable_version_flag = true)]
pub struct CliArguments {
    /// Print version information and exit.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    pub version: (),

    /// Path to the test-definition YAML describing dimensions, tests, and
    /// suites.
    #[arg(
        long = "test_definition",
        short = 'i',
        env = "KXP_TEST_DEFINITION",
        default_value = "tests/test-definition.yaml"
    )]
    pub test_definition: PathBuf,

    /// Root directory containing one template subdirectory per test
    /// definition.
    #[arg(
        long = "template_dir",
        short = 't',
        env = "KXP_TEMPLATE_DIR",
        default_value = "tests/templates/kuttl"
    )]
    pub template_dir: PathBuf,

    /// Base output directory; expanded test cases are written under
    /// `<output_dir>/tests`.
    #[arg(
        long = "output_dir",
        short = 'o',
        env = "KXP_OUTPUT_DIR",
        default_value = "tests/_work"
    )]
    pub output_dir: PathBuf,

    /// Path to the kuttl runner-config template.
    #[arg(
        long = "kuttl_test",
        short = 'k',
        env = "KXP_KUTTL_TEST",
        default_value = "tests/kuttl-test.yaml.jinja2"
    )]
    pub kuttl_test: PathBuf,

    /// Name of the suite to expand.
    #[arg(long, short, env = "KXP_SUITE", default_value = "default")]
    pub suite: String,

    /// Log verbosity.
    #[arg(
        long = "log_level",
        short = 'l',
        env = "KXP_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: LogLevel,
}

impl CliArguments {
    /// Converts the parsed flags into the plain filesystem configuration
    /// [`kxp_core::driver`] expects.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            test_definition: self.test_definition.clone(),
            template_dir: self.template_dir.clone(),
            output_dir: self.output_dir.clone(),
            kuttl_test: self.kuttl_test.clone(),
            suite: self.suite.clone(),
        }
    }
}

/// The `--log_level` values this tool accepts.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    /// Verbose logging, including per-file expansion steps.
    Debug,

    /// Suite- and test-case-level progress only.
    Info,
}

impl LogLevel {
    /// The `tracing` level this option maps to.
    pub fn as_level_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
        }
    }
}
