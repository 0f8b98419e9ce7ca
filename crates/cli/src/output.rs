//! Output formatting utilities

use autoscaling_lib::AutoscalingBinding;
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the binding table
#[derive(Tabled)]
struct BindingRow {
    #[tabled(rename = "Min Instances")]
    min_instances: u32,
    #[tabled(rename = "Max Instances")]
    max_instances: u32,
    #[tabled(rename = "CPU Min")]
    cpu_min_threshold: String,
    #[tabled(rename = "CPU Max")]
    cpu_max_threshold: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl From<&AutoscalingBinding> for BindingRow {
    fn from(binding: &AutoscalingBinding) -> Self {
        Self {
            min_instances: binding.min_instances,
            max_instances: binding.max_instances,
            cpu_min_threshold: format_percent(binding.cpu_min_threshold),
            cpu_max_threshold: format_percent(binding.cpu_max_threshold),
            enabled: color_enabled(binding.enabled),
        }
    }
}

/// Print an Autoscaling binding in the requested format
pub fn print_binding(binding: &AutoscalingBinding, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            let table = Table::new([BindingRow::from(binding)])
                .with(Style::rounded())
                .to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(binding)?);
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Format a CPU threshold
pub fn format_percent(value: u32) -> String {
    format!("{}%", value)
}

fn color_enabled(enabled: bool) -> String {
    if enabled {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}
