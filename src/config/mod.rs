// Configuration module entry point
// Loads the immutable startup configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, CorsConfig};

/// Default configuration file, resolved by the `config` crate as `config.toml`
const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for structured environment overrides, e.g. `EASYAUTH_SERVER__PORT`
const ENV_PREFIX: &str = "EASYAUTH";

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the file,
    /// `EASYAUTH_*` variables, then the platform's `PORT` and `NODE_ENV`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::build_with(config::File::with_name(config_path).required(false), None)
    }

    /// Resolve against `env`, or the process environment when `None`
    fn build_with<S>(
        file: S,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let platform_var = |name: &str| match &env {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        let port = platform_var("PORT");
        let node_env = platform_var("NODE_ENV");

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .set_override_option("server.port", port)?
            .set_override_option("app.environment", node_env)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    const FILE_WITH_PORT: &str = r#"
        [server]
        port = 5000

        [app]
        environment = "staging"
    "#;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.app.environment, "development");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.cors.allowed_origin_patterns, vec!["azurewebsites.net"]);
        assert!(cfg.cors.allow_credentials);
        assert!(cfg
            .cors
            .allowed_headers
            .iter()
            .any(|h| h == "X-MS-CLIENT-PRINCIPAL"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [logging]
            access_log_format = "json"

            [performance]
            max_connections = 64

            [cors]
            allowed_origin_patterns = ["example.net", "contoso.com"]
        "#;
        let cfg =
            Config::build_with(File::from_str(toml, FileFormat::Toml), Some(env(&[]))).unwrap();

        assert_eq!(cfg.logging.access_log_format, "json");
        // untouched keys in a partially specified section keep their defaults
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.performance.backlog, 128);
        assert_eq!(
            cfg.cors.allowed_origin_patterns,
            vec!["example.net", "contoso.com"]
        );
        assert_eq!(cfg.cors.allowed_methods.len(), 5);
    }

    #[test]
    fn test_prefixed_env_overrides_file() {
        let cfg = Config::build_with(
            File::from_str(FILE_WITH_PORT, FileFormat::Toml),
            Some(env(&[
                ("EASYAUTH_SERVER__PORT", "4000"),
                ("EASYAUTH_LOGGING__ACCESS_LOG_FORMAT", "json"),
                ("EASYAUTH_PERFORMANCE__MAX_CONNECTIONS", "32"),
                ("UNRELATED_SERVER__PORT", "1"),
            ])),
        )
        .unwrap();

        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.app.environment, "staging");
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.performance.max_connections, Some(32));
    }

    #[test]
    fn test_platform_vars_take_precedence() {
        let cfg = Config::build_with(
            File::from_str(FILE_WITH_PORT, FileFormat::Toml),
            Some(env(&[
                ("EASYAUTH_SERVER__PORT", "4000"),
                ("PORT", "8081"),
                ("NODE_ENV", "production"),
            ])),
        )
        .unwrap();

        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.app.environment, "production");
    }

    #[test]
    fn test_file_only_without_env() {
        let cfg = Config::build_with(
            File::from_str(FILE_WITH_PORT, FileFormat::Toml),
            Some(env(&[])),
        )
        .unwrap();

        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.app.environment, "staging");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::build_with(
            File::from_str("", FileFormat::Toml),
            Some(env(&[("PORT", "not-a-port")])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        assert!(Config::load_from("does-not-exist/easyauth").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 8081;
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8081".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
