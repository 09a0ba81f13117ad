//! serlog - log line-oriented serial output from a microcontroller to a file

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serlog_core::config::{resolve_port, LoggerConfig};
use serlog_core::link::{list_ports, open_port};
use serlog_core::session::{CancelToken, ConsoleOperator, SessionEngine, SessionError};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("serlog=debug,serlog_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_ports {
        for port in list_ports() {
            match &port.product {
                Some(product) => println!("{}\t{}", port.name, product),
                None => println!("{}", port.name),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = match &cli.config {
        Some(path) => LoggerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LoggerConfig::default(),
    };

    let lister = cli.lister();
    let port = resolve_port(
        cli.port.as_deref(),
        file_config.port.as_deref(),
        lister.as_deref(),
    )
    .context("Could not determine which port to use")?;

    let now = chrono::Local::now().naive_local();
    let config = file_config
        .into_session_config(port, &cli.overrides(), now)
        .context("Invalid configuration")?;
    tracing::debug!("resolved configuration: {:?}", config);

    let link = open_port(&config.port, config.baud_rate, config.timeout)
        .with_context(|| format!("Could not open {}", config.port))?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            // Second Ctrl-C while blocked on the begin prompt
            std::process::exit(130);
        }
        handler_token.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    let engine = match SessionEngine::new(config, link, ConsoleOperator::stdio()) {
        Ok(engine) => engine.with_cancel(cancel),
        Err(e) => return Ok(report_failure(&e)),
    };
    match engine.run() {
        Ok(report) => {
            println!(
                "Logged {} lines to {}",
                report.lines_written,
                report.output_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}

/// Print a session failure with its hint and pick the exit code
fn report_failure(e: &SessionError) -> ExitCode {
    eprintln!("error: {}", e);
    if let Some(hint) = e.hint() {
        eprintln!("hint: {}", hint);
    }
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &SessionError) -> u8 {
    e.exit_code().clamp(1, 255) as u8
}
