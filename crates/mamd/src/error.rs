//! CLI error types.

use mamd_config::ConfigError;
use mamd_site::{BuildError, TemplateError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0} of {1} pages failed")]
    PagesFailed(usize, usize),
}
