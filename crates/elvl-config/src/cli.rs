//! Command-line overrides shared by the region tools.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Global options, flattened into each tool's parser.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Log level or filter directive (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Region files carry the outer `REGN` header.
    #[arg(long, global = true)]
    pub super_chunk: bool,

    /// Leave rectangles out of decoded output.
    #[arg(long, global = true)]
    pub no_rectangles: bool,

    /// Write RON on a single line.
    #[arg(long, global = true)]
    pub compact: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Switches only ever turn their setting on; an absent switch keeps the
    /// configured value.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.log.level = level.clone();
        }
        if args.super_chunk {
            self.codec.super_chunk = true;
        }
        if args.no_rectangles {
            self.output.include_rectangles = false;
        }
        if args.compact {
            self.output.pretty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: CliArgs,
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            log_level: Some("debug".to_string()),
            super_chunk: true,
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.log.level, "debug");
        assert!(config.codec.super_chunk);
        // Non-overridden fields retain defaults
        assert!(config.output.include_rectangles);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config {
            codec: crate::CodecConfig { super_chunk: true },
            ..Config::default()
        };
        let mut config = original.clone();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_flags_parse() {
        let cli = TestCli::try_parse_from([
            "elvl-region",
            "--no-rectangles",
            "--compact",
            "--config",
            "/tmp/cfg",
        ])
        .unwrap();
        assert!(cli.args.no_rectangles && cli.args.compact);
        assert!(!cli.args.super_chunk);
        assert_eq!(cli.args.config, Some(PathBuf::from("/tmp/cfg")));

        let mut config = Config::default();
        config.apply_cli_overrides(&cli.args);
        assert!(!config.output.include_rectangles);
        assert!(!config.output.pretty);
    }
}
