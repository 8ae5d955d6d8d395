use tracing_subscriber::{EnvFilter, fmt};

/// Rendered lines go to stdout, so logs are written to stderr.
pub fn init_logging(level: Option<&str>) {
    let default_level = level.unwrap_or(crate::utils::consts::LOG_LEVEL);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(crate::utils::consts::LOG_LEVEL));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}
