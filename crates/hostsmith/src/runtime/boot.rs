//! Boot — logging init and config load.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{AppConfig, ConfigError};

use super::cli::Cli;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout is reserved for merged output.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config (file, then env), apply CLI overrides on top and validate
/// the result.
pub fn boot(cli: &Cli) -> Result<AppConfig, ConfigError> {
    info!("Starting hostsmith v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    cli.apply(&mut config);
    config.validate()?;

    info!(
        "Normalization: comments={}, leading_ip={}, punycode={}, omit_empty={}, replacement_ip={:?}",
        config.normalize.trim_comment,
        config.normalize.trim_leading_ip,
        config.normalize.idna_compatible_out,
        config.normalize.omit_empty_line,
        config.normalize.replacement_ip
    );

    Ok(config)
}
