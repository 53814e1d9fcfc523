//! `aclgen-cisco` entry point.
//!
//! Renders policy files into Cisco IOS access-list configuration, one
//! `<policy>.acl` file per policy.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use aclgen_cisco::generate::{generate_file, render_file};
use aclgen_cisco::GeneratorConfig;

/// Cisco IOS access-list generator
#[derive(Parser, Debug)]
#[command(name = "aclgen-cisco")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Policy files (YAML or JSON)
    #[arg(required = true)]
    policies: Vec<PathBuf>,

    /// Directory generated files are written to
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Generator configuration file (YAML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Warn about terms expiring within this many weeks
    #[arg(long)]
    exp_info: Option<u64>,

    /// Compilation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Print generated configuration instead of writing files
    #[arg(long)]
    stdout: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "aclgen-cisco: generation failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(weeks) = args.exp_info {
        config.exp_info_weeks = weeks;
    }
    if args.date.is_some() {
        config.today = args.date;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    info!(
        platform = %config.platform,
        date = %config.current_date(),
        policies = args.policies.len(),
        "aclgen-cisco: starting"
    );

    for path in &args.policies {
        if args.stdout {
            if let Some(text) = render_file(path, &config)
                .with_context(|| format!("rendering {}", path.display()))?
            {
                println!("{}", text);
            }
            continue;
        }

        generate_file(path, &args.output_dir, &config)
            .with_context(|| format!("rendering {}", path.display()))?;
    }
    Ok(())
}
