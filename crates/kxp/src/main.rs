//! Expands a kuttl test matrix of Jinja2 templates into concrete kuttl test
//! suites.

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre;
use kxp_core::Error;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

use crate::cli::CliArguments;

mod cli;

fn main() -> ExitCode {
    let args = CliArguments::parse();

    if let Err(err) = color_eyre::install() {
        eprintln!("{err:?}");
        return ExitCode::from(cli::EXIT_CONFIG_ERROR);
    }

    init_tracing(&args);

    match kxp_core::driver::run(&args.driver_config()) {
        Ok(suite) => {
            tracing::info!(cases = suite.test_cases.len(), "expansion complete");
            ExitCode::from(cli::EXIT_OK)
        }
        Err(err) => {
            let code = exit_code_for(&err);
            eprintln!("{:?}", eyre::Report::new(err));
            ExitCode::from(code)
        }
    }
}

fn init_tracing(args: &CliArguments) {
    tracing_subscriber::registry()
        .with(HierarchicalLayer::new(2).with_targets(true))
        .with(Targets::new().with_target(kxp_core::TOOL_NAME, args.log_level.as_level_filter()))
        .init();
}

fn exit_code_for(err: &Error) -> u8 {
    match err {
        Error::Config(_) => cli::EXIT_CONFIG_ERROR,
        Error::Io { .. } => cli::EXIT_IO_ERROR,
        Error::Render { .. } => cli::EXIT_RENDER_ERROR,
    }
}
