//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Coordinator instance identifier
    pub instance_id: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rollup-prover".to_string(),
            instance_id: "0".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RP_SERVICE_NAME`: Service name (default: rollup-prover)
    /// - `RP_INSTANCE_ID`: Instance identifier (default: 0)
    /// - `RP_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `RP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `RP_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `RP_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("RP_SERVICE_NAME")
                .unwrap_or_else(|_| "rollup-prover".to_string()),

            instance_id: env::var("RP_INSTANCE_ID").unwrap_or_else(|_| "0".to_string()),

            log_level: env::var("RP_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("RP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("RP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            network: env::var("RP_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }

    /// Service name qualified by instance, e.g. `rollup-prover-2`.
    pub fn full_service_name(&self) -> String {
        if self.instance_id == "0" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.instance_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "rollup-prover");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_full_service_name() {
        let mut config = TelemetryConfig::default();
        assert_eq!(config.full_service_name(), "rollup-prover");

        config.instance_id = "3".to_string();
        assert_eq!(config.full_service_name(), "rollup-prover-3");
    }
}
