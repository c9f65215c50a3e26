pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use marquee_core::config::{AppConfig, LoadOptions, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "marquee",
    about = "Marquee operator CLI",
    long_about = "Ask catalog questions through the full pipeline, inspect the dataset and \
                  configuration, and check runtime readiness.",
    after_help = "Examples:\n  marquee ask \"What percentage of content is Korean?\"\n  \
                  marquee ask \"Recommend a comedy\" --audience kids --json\n  \
                  marquee dataset --detail full\n  marquee doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to marquee.toml (must exist when given)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one question through classification, handlers and guardrails")]
    Ask {
        #[arg(help = "Natural-language question about the catalog")]
        query: String,
        #[arg(long, help = "Audience: general, kids, family, teen or adult")]
        audience: Option<String>,
        #[arg(long, help = "Emit the full response as JSON")]
        json: bool,
    },
    #[command(about = "Summarize the loaded catalog")]
    Dataset {
        #[arg(long, default_value = "basic", help = "Summary depth: basic, detailed or full")]
        detail: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, prompt templates, dataset load and reasoning provider")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            ..LoadOptions::default()
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    // Logging goes to stderr so command output stays machine-readable.
    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Ask { query, audience, json } => {
            commands::ask::run(options, &query, audience.as_deref(), json)
        }
        Command::Dataset { detail } => commands::dataset::run(options, &detail),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(logging: &LoggingConfig) {
    use marquee_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_accepts_audience_and_json_flags() {
        let cli = Cli::parse_from([
            "marquee",
            "ask",
            "Recommend a comedy",
            "--audience",
            "kids",
            "--json",
        ]);

        match cli.command {
            Command::Ask { query, audience, json } => {
                assert_eq!(query, "Recommend a comedy");
                assert_eq!(audience.as_deref(), Some("kids"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_config_path_is_required_to_exist() {
        let cli = Cli::parse_from(["marquee", "--config", "ops/marquee.toml", "config"]);
        let options = cli.load_options();

        assert!(options.require_file);
        assert_eq!(options.config_path, Some(PathBuf::from("ops/marquee.toml")));
    }

    #[test]
    fn dataset_detail_defaults_to_basic() {
        let cli = Cli::parse_from(["marquee", "dataset"]);

        assert!(matches!(cli.command, Command::Dataset { ref detail } if detail == "basic"));
    }
}
