//! # SPARKFIELD
//!
//! Opens a window and runs the particle field until it is closed.
//!
//! Usage: `sparkfield [CONFIG.toml]`. Without an argument the field reads
//! `config/sparkfield.toml`, falling back to built-in defaults if that file
//! does not exist. Log level follows `RUST_LOG` (default `info`).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod driver;

use std::path::PathBuf;
use std::process::ExitCode;

use sparkfield_core::FieldConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/sparkfield.toml";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => FieldConfig::load(PathBuf::from(path)),
        None => FieldConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };

    let result = config
        .map_err(driver::DriverError::from)
        .and_then(driver::run);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
