//! Autoscaling CLI
//!
//! Reconfigures the Autoscaling service instance bound to an app and
//! re-enables it.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::configure;

/// Autoscaling CLI
#[derive(Parser)]
#[command(name = "cf-autoscaling")]
#[command(author, version, about = "Configure the Autoscaling service bound to an app", long_about = None)]
pub struct Cli {
    /// Directory holding the CF CLI `.cf/config.json` (defaults to the home directory)
    #[arg(long, env = "CF_HOME", global = true)]
    pub cf_home: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure an instance of the Autoscaling Service
    ConfigureAutoscaling {
        /// Name of the app
        #[arg(value_name = "APP_NAME")]
        app_name: String,

        /// Name of the Autoscaling service instance bound to the app
        #[arg(value_name = "SERVICE_INSTANCE")]
        service_instance: String,

        /// (optional) set the minimum instance count
        #[arg(long, default_value_t = 0)]
        min_instances: u32,

        /// (optional) set the maximum instance count
        #[arg(long, default_value_t = 0)]
        max_instances: u32,

        /// (optional) set the minimum cpu threshold percentage
        #[arg(long, default_value_t = 0)]
        min_threshold: u32,

        /// (optional) set the maximum cpu threshold percentage
        #[arg(long, default_value_t = 0)]
        max_threshold: u32,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn init_tracing(verbose: bool, log_format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ConfigureAutoscaling {
            app_name,
            service_instance,
            min_instances,
            max_instances,
            min_threshold,
            max_threshold,
        } => {
            let overrides = autoscaling_lib::OverrideFlags::from_flag_values(
                min_instances,
                max_instances,
                min_threshold,
                max_threshold,
            );
            configure::configure_autoscaling(
                cli.cf_home.as_deref(),
                &app_name,
                &service_instance,
                overrides,
                cli.format,
            )
            .await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
