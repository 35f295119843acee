use dnsguard_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(config_path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;

    info!(
        config_file = config_path.unwrap_or("default"),
        control_port = config.server.control_port,
        bind = %config.server.bind_address,
        blocking = config.blocking.enabled,
        cache = config.cache.enabled,
        interface_binding = config.interfaces.binding_enabled,
        telemetry = config.telemetry.enabled,
        "Configuration loaded"
    );

    Ok(config)
}
