use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

mod terminal;

use anyhow::Context;
use clap::ArgAction;
use msl::{
    Config, FileError,
    domain::DEFAULT_CONFIG_FILE_NAME,
    storage::{self, Outcome},
};
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The spec file to convert in place, or a directory of spec files
    path: PathBuf,

    /// Print the converted document instead of writing it back
    #[arg(long)]
    dry_run: bool,

    /// Print the extracted fields as JSON instead of converting
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,

    /// Path to the configuration file [default: .msl.toml, if present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<ExitCode> {
        Self::setup_logging(self.verbose);

        if !self.path.exists() {
            println!("Error: File not found: {}", self.path.display());
            return Ok(ExitCode::FAILURE);
        }

        let config = self.load_config()?;

        if self.path.is_dir() {
            if self.dry_run || self.json {
                anyhow::bail!("--dry-run and --json take a single file, not a directory");
            }
            Ok(Self::convert_directory(&self.path, &config))
        } else if self.dry_run || self.json {
            self.preview()
        } else {
            Self::convert_file(&self.path, &config)
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE_NAME))),
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn preview(&self) -> anyhow::Result<ExitCode> {
        let document = match storage::read_document(&self.path) {
            Ok(document) => document,
            Err(FileError::Convert { path, source }) => {
                report_failure(&path, &source);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&document)?);
        } else {
            print!("{}", document.to_msl());
        }
        Ok(ExitCode::SUCCESS)
    }

    #[instrument(skip(config))]
    fn convert_file(path: &Path, config: &Config) -> anyhow::Result<ExitCode> {
        match storage::convert_file(path, config.skip_unchanged) {
            Ok(outcome) => {
                report_success(path, outcome);
                Ok(ExitCode::SUCCESS)
            }
            Err(FileError::Convert { path, source }) => {
                report_failure(&path, &source);
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(config))]
    fn convert_directory(root: &Path, config: &Config) -> ExitCode {
        let summary = storage::convert_directory(root, config);

        for (path, result) in summary.iter() {
            match result {
                Ok(outcome) => report_success(path, *outcome),
                Err(FileError::Convert { source, .. }) => report_failure(path, source),
                Err(e) => {
                    println!("{} Failed to convert: {}", "✗".warning(), path.display());
                    println!("  {}", e.to_string().dim());
                }
            }
        }

        let converted = summary.count(Outcome::Converted) + summary.count(Outcome::Unchanged);
        println!();
        println!("Converted: {converted}/{}", summary.len());

        if summary.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn report_success(path: &Path, outcome: Outcome) {
    match outcome {
        Outcome::Converted => println!("{} Converted: {}", "✓".success(), path.display()),
        Outcome::Unchanged => println!(
            "{} Already converted: {}",
            "✓".success(),
            path.display().to_string().dim()
        ),
    }
}

fn report_failure(path: &Path, reason: &impl std::fmt::Display) {
    println!("{} Failed to convert: {}", "✗".warning(), path.display());
    println!("  {}", reason.to_string().dim());
}
