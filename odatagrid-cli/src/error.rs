//! CLI error type

use odatagrid_lib::error::RelayError;
use odatagrid_lib::error::TableError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    /// A `--sort` or `--filter` argument could not be parsed.
    #[error("Invalid {flag} argument '{value}': expected {expected}")]
    Argument {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Interrupted: {0}")]
    Signal(#[from] std::io::Error),
}
