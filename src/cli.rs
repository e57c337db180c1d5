//! Command line surface.

use crate::config::{AppConfig, AppConfigBuilder};
use crate::error::Result;
use clap::{ArgAction, Parser};
use core_analysis::Notation;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "keyfinder-cli",
    version,
    about = "Estimate the musical key of an audio file",
    after_help = notation_help()
)]
pub struct Cli {
    /// Audio file to analyze
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Notation used to print the key
    #[arg(short, long, value_name = "NOTATION", default_value = "standard")]
    pub notation: String,

    /// Log progress to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn to_builder(&self) -> AppConfigBuilder {
        AppConfig::builder()
            .input(self.file.clone())
            .notation(self.notation.clone())
            .verbosity(self.verbose)
    }

    pub fn into_config(self) -> Result<AppConfig> {
        self.to_builder().build()
    }
}

fn notation_help() -> String {
    let names: Vec<&str> = Notation::ALL.iter().map(|n| n.name()).collect();
    format!("Notations: {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from(["keyfinder-cli", "-n", "camelot", "-vv", "song.flac"]).unwrap();

        assert_eq!(cli.file, PathBuf::from("song.flac"));
        assert_eq!(cli.notation, "camelot");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_notation_defaults_to_standard() {
        let config = Cli::try_parse_from(["keyfinder-cli", "song.flac"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.notation(), Notation::Standard);
    }

    #[test]
    fn test_long_notation_flag() {
        let config = Cli::try_parse_from(["keyfinder-cli", "--notation", "openkey", "song.flac"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.notation(), Notation::OpenKey);
    }

    #[test]
    fn test_file_is_required() {
        let err = Cli::try_parse_from(["keyfinder-cli"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_and_version() {
        let err = Cli::try_parse_from(["keyfinder-cli", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["keyfinder-cli", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_clap_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
