//! lamp-mcp: MCP server for switching a GPIO-driven lamp
//!
//! Speaks line-delimited JSON on stdin/stdout and drives the lamp through
//! Linux sysfs GPIO (or a simulated output).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use lamp_mcp::config::{self, PinBackend};
use lamp_mcp::lamp::Lamp;
use lamp_mcp::mcp::{McpServer, SessionEngine};

/// MCP server for switching a GPIO-driven lamp.
///
/// Exposes turn-on, turn-off and status tools plus a `lamp://status`
/// resource over stdio.
#[derive(Parser, Debug)]
#[command(name = "lamp-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// GPIO line driving the lamp (overrides the config file)
    #[arg(long, value_name = "GPIO")]
    pin: Option<u32>,

    /// Use a simulated output instead of sysfs GPIO
    #[arg(long)]
    simulate: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the GPL notice printed to stderr at startup.
fn license_notice() -> String {
    format!(
        "lamp-mcp {}  Copyright (C) 2026  The Embedded Society\n\
         This program comes with ABSOLUTELY NO WARRANTY.\n\
         This is free software, licensed under GPL-3.0-or-later.\n\
         Source: {}\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY"),
    )
}

/// Entry point for the lamp-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(pin) = args.pin {
        cfg.gpio.pin = pin;
    }
    if args.simulate {
        cfg.gpio.backend = PinBackend::Simulated;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // GPLv3 section 5d interactive notice, kept off stdout
    eprintln!("{}", license_notice());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pin = cfg.gpio.pin,
        backend = ?cfg.gpio.backend,
        "Starting lamp-mcp server"
    );

    let lamp = match Lamp::open(&cfg.gpio) {
        Ok(lamp) => lamp,
        Err(e) => {
            error!(error = %e, "Failed to open lamp output");
            return ExitCode::FAILURE;
        }
    };

    let mut server = McpServer::new(SessionEngine::new(lamp));

    info!("MCP server ready, waiting for client connection...");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn license_notice_names_license_and_source() {
        let notice = license_notice();
        assert!(notice.starts_with(&format!("lamp-mcp {}  ", env!("CARGO_PKG_VERSION"))));
        assert!(notice.contains("ABSOLUTELY NO WARRANTY"));
        assert!(notice.contains("GPL-3.0-or-later"));
        assert!(notice.contains("Source: https://github.com/embedded-society/lamp-mcp"));
        assert_eq!(notice.lines().count(), 4);
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }

    #[test]
    fn config_level_used_without_flags() {
        assert_eq!(get_log_level(0, false, "DEBUG"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
    }
}
