//! proctor - Linux process inspection CLI.
//!
//! Entry point: parses arguments, resolves configuration, sets up tracing
//! logging and dispatches subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod output;
mod startup_checks;
mod state;

use clap::Parser;
use proctor::Inspector;
use tracing::{debug, level_filters::LevelFilter};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_check, command_clear_cache, command_config, command_fingerprint, command_get,
    command_list, command_refresh, command_tree, command_ui, open_inspector,
};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level().unwrap_or(LogLevel::Warn) {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    debug!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Config generation doesn't need an effective config
    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        return command_config(output.clone(), format.clone(), *commented);
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config);

    if args.reset_cache {
        open_inspector(&config).clear_process_cache()?;
    }

    let format = args.output;
    match args.command.unwrap_or(Commands::List) {
        Commands::List => command_list(&config, format),
        Commands::Get { selector } => command_get(&selector, &config, format),
        Commands::Tree { pid } => command_tree(pid, &config, format),
        Commands::Fingerprint { pid } => command_fingerprint(pid, &config, format),
        Commands::Refresh => command_refresh(&config),
        Commands::ClearCache => command_clear_cache(&config),
        Commands::Check => command_check(&config),
        Commands::Ui { bind, port } => command_ui(bind, port, &config).await,
        Commands::Config { .. } => unreachable!("Config handled above"),
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
