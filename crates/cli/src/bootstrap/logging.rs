use dnsguard_domain::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `[logging] level` when set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    if config.logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }

    info!(
        level = %config.logging.level,
        format = %config.logging.format,
        "Logging initialized"
    );
}
