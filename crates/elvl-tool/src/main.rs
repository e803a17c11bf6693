//! `elvl-region`: inspect, convert and verify eLVL map regions.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use elvl_config::{CliArgs, Config, default_config_dir};
use elvl_log::init_logging;

use crate::error::ToolError;

#[derive(Parser, Debug)]
#[command(name = "elvl-region", about = "eLVL map region codec", version)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a region file.
    Inspect {
        /// Binary region file.
        file: PathBuf,
    },
    /// Decode a region file to RON.
    Decode {
        /// Binary region file.
        file: PathBuf,
        /// Write RON here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a RON region to its binary form.
    Encode {
        /// RON region description.
        input: PathBuf,
        /// Binary output file.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decode, re-encode and decode again, checking nothing changed.
    Roundtrip {
        /// Binary region file.
        file: PathBuf,
    },
}

fn run(command: &Command, config: &Config) -> Result<(), ToolError> {
    match command {
        Command::Inspect { file } => println!("{}", commands::inspect(file, config)?),
        Command::Decode { file, output } => {
            if let Some(text) = commands::decode(file, output.as_deref(), config)? {
                println!("{text}");
            }
        }
        Command::Encode { input, output } => commands::encode(input, output, config)?,
        Command::Roundtrip { file } => println!("{}", commands::roundtrip(file, config)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = cli
        .args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&cli.args);

    let log_dir = config.log_dir_or(&config_dir);
    init_logging(Some(&log_dir), config.log.json_file, Some(&config));
    tracing::debug!(config_dir = %config_dir.display(), ?config, "configuration loaded");

    match run(&cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["elvl-region", "decode", "a.rgn", "-o", "a.ron"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Decode { ref file, output: Some(ref out) }
                if file == &PathBuf::from("a.rgn") && out == &PathBuf::from("a.ron")
        ));

        let cli = Cli::try_parse_from(["elvl-region", "roundtrip", "b.rgn", "--super-chunk"])
            .unwrap();
        assert!(cli.args.super_chunk);
        assert!(matches!(cli.command, Command::Roundtrip { .. }));
    }

    #[test]
    fn test_encode_requires_output() {
        assert!(Cli::try_parse_from(["elvl-region", "encode", "a.ron"]).is_err());
        assert!(Cli::try_parse_from(["elvl-region"]).is_err());
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
