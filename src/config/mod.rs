// config/mod.rs
use crate::devices::provisioning::ServerInstance;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub instance: ServerInstance,
    pub host: String,
    /// Defaults to the instance's well-known port.
    pub port: Option<u16>,
    /// Upper bound on concurrent calls, monitor streams included.
    pub max_workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        let port = self.port.unwrap_or_else(|| self.instance.default_port());
        format!("{}:{}", self.host, port)
    }
}

impl Settings {
    /// Layers defaults, `config/config.toml`, `APP_*` environment variables
    /// and finally an explicit instance selection.
    pub fn load(instance: Option<u8>) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("server.instance", 1)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.max_workers", 10)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000)?
            .add_source(config::File::with_name("config/config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.instance", instance.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_instance_selects_default_port() {
        let settings = Settings::load(Some(2)).unwrap();
        assert_eq!(settings.server.instance, ServerInstance::Second);
        assert_eq!(settings.server.max_workers, 10);
        assert_eq!(settings.server.address(), "0.0.0.0:50052");
    }

    #[test]
    fn invalid_instance_is_rejected() {
        assert!(Settings::load(Some(3)).is_err());
        assert!(Settings::load(Some(0)).is_err());
    }

    #[test]
    fn explicit_port_wins() {
        let server = ServerSettings {
            instance: ServerInstance::First,
            host: "127.0.0.1".into(),
            port: Some(6000),
            max_workers: 1,
        };
        assert_eq!(server.address(), "127.0.0.1:6000");
    }
}
