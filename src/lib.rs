//! # Key Finder CLI
//!
//! Decodes an audio file, estimates its musical key and prints the key in the
//! requested notation.
//!
//! [`run`] is the whole program with its collaborators passed in: the
//! arguments, the key estimator and the two output streams. The binary wires
//! in the process arguments, [`ChromaKeyEstimator`](core_analysis::ChromaKeyEstimator)
//! and real stdio.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::{AppConfig, AppConfigBuilder};
pub use error::{CliError, Result};

use clap::error::ErrorKind;
use clap::Parser;
use core_analysis::{display, KeyEstimator};
use core_decoder::decode_file;
use core_runtime::logging::{init_logging, loggable_path};
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, error, info};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Run one invocation and return the process exit code.
///
/// Standard output receives the rendered key and nothing else; it stays
/// empty when the estimator reports silence. Every failure is printed to
/// `stderr` and yields [`EXIT_FAILURE`], including a failure to write to
/// `stdout`. Failed writes to `stderr` itself are ignored.
pub fn run<I, T, E, O, R>(args: I, estimator: &E, stdout: &mut O, stderr: &mut R) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    E: KeyEstimator + ?Sized,
    O: Write,
    R: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    match write!(stdout, "{}", err.render()).and_then(|()| stdout.flush()) {
                        Ok(()) => EXIT_SUCCESS,
                        Err(e) => {
                            let _ = writeln!(stderr, "{}", CliError::Output(e));
                            EXIT_FAILURE
                        }
                    }
                }
                _ => {
                    let _ = write!(stderr, "{}", err.render());
                    EXIT_FAILURE
                }
            };
        }
    };

    match cli.into_config().and_then(|config| execute(&config, estimator, stdout)) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            error!("Key finding failed: {}", err);
            let _ = writeln!(stderr, "{}", err);
            EXIT_FAILURE
        }
    }
}

/// Decode, classify and render a fully validated invocation.
pub fn execute<E, O>(config: &AppConfig, estimator: &E, stdout: &mut O) -> Result<()>
where
    E: KeyEstimator + ?Sized,
    O: Write,
{
    if let Some(logging) = config.logging() {
        // A subscriber installed earlier in the process keeps precedence
        if let Err(err) = init_logging(logging) {
            debug!("Logging already configured: {}", err);
        }
    }

    let audio = decode_file(config.input(), config.decode())?;
    let classification = estimator.estimate(&audio.buffer)?;

    info!(
        file = %loggable_path(config.input(), config.decode().redact_paths),
        ?classification,
        notation = %config.notation(),
        "Key estimated"
    );

    if let Some(label) = display(classification, config.notation()) {
        writeln!(stdout, "{}", label)?;
        stdout.flush()?;
    }

    Ok(())
}
