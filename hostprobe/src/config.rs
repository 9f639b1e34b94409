//! Configuration for the host probe.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors. All of these abort startup; nothing here is
/// recoverable at runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Collector endpoint settings.
    pub collector: CollectorConfig,

    /// Probe and collection settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Collector connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// WebSocket URL of the collector (e.g. "ws://collector:8080/serverws").
    pub url: String,

    /// Initial reconnect delay in seconds (default: 1).
    #[serde(default = "default_backoff_initial")]
    pub backoff_initial_secs: u64,

    /// Maximum reconnect delay in seconds (default: 60).
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,
}

fn default_backoff_initial() -> u64 {
    1
}

fn default_backoff_max() -> u64 {
    60
}

/// Probe collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Collection interval in seconds (default: 60).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Primary network interface checked by the link probe (default: "enp0s3").
    #[serde(default = "default_interface")]
    pub network_interface: String,

    /// UPower device path queried by the battery probe.
    #[serde(default = "default_battery_device")]
    pub battery_device: String,

    /// Deadline for the port-scan probe in seconds (default: 30).
    /// A scan still running at the deadline degrades to a placeholder
    /// without stalling the rest of the cycle.
    #[serde(default = "default_scan_timeout")]
    pub port_scan_timeout_secs: u64,

    /// Which probes to run.
    #[serde(default)]
    pub enable: EnabledProbes,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            network_interface: default_interface(),
            battery_device: default_battery_device(),
            port_scan_timeout_secs: default_scan_timeout(),
            enable: EnabledProbes::default(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_interface() -> String {
    "enp0s3".to_string()
}

fn default_battery_device() -> String {
    "/org/freedesktop/UPower/devices/battery_BAT0".to_string()
}

fn default_scan_timeout() -> u64 {
    30
}

/// Per-probe enable flags.
///
/// Hostname, IP, CPU model, memory and uptime come from the in-process
/// stats interface and are always collected; the flags below cover the
/// probes that shell out to external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnabledProbes {
    /// Hardware model/vendor via dmidecode (privileged).
    #[serde(default = "default_true")]
    pub hardware: bool,

    /// Operating system name via hostnamectl.
    #[serde(default = "default_true")]
    pub os: bool,

    /// Firewall status via ufw (privileged).
    #[serde(default = "default_true")]
    pub firewall: bool,

    /// Aggregate disk usage via df.
    #[serde(default = "default_true")]
    pub disk: bool,

    /// Network link descriptor via ip.
    #[serde(default = "default_true")]
    pub network: bool,

    /// Battery state via upower.
    #[serde(default = "default_true")]
    pub battery: bool,

    /// Bluetooth adapter state via hciconfig.
    #[serde(default = "default_true")]
    pub bluetooth: bool,

    /// Established inbound SSH sessions via ss.
    #[serde(default = "default_true")]
    pub ssh: bool,

    /// Local open-port scan via nmap (privileged, slow).
    /// Disabled by default.
    #[serde(default)]
    pub port_scan: bool,
}

impl Default for EnabledProbes {
    fn default() -> Self {
        Self {
            hardware: true,
            os: true,
            firewall: true,
            disk: true,
            network: true,
            battery: true,
            bluetooth: true,
            ssh: true,
            port_scan: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AgentConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AgentConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.collector.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "collector.url must not be empty".to_string(),
            ));
        }
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(ConfigError::Validation(format!(
                "collector.url must use a ws:// or wss:// scheme, got '{}'",
                url
            )));
        }

        if self.collector.backoff_initial_secs == 0 {
            return Err(ConfigError::Validation(
                "collector.backoff_initial_secs must be > 0".to_string(),
            ));
        }
        if self.collector.backoff_max_secs < self.collector.backoff_initial_secs {
            return Err(ConfigError::Validation(
                "collector.backoff_max_secs must be >= backoff_initial_secs".to_string(),
            ));
        }

        if self.probe.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "probe.interval_secs must be > 0".to_string(),
            ));
        }
        if self.probe.port_scan_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "probe.port_scan_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.probe.enable.port_scan
            && self.probe.port_scan_timeout_secs >= self.probe.interval_secs
        {
            return Err(ConfigError::Validation(
                "probe.port_scan_timeout_secs must be shorter than probe.interval_secs"
                    .to_string(),
            ));
        }
        if self.probe.network_interface.trim().is_empty() {
            return Err(ConfigError::Validation(
                "probe.network_interface must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{
            collector: { url: "ws://localhost:8080/serverws" }
        }"#;

        let config: AgentConfig = json5::from_str(json).unwrap();
        config.validate().unwrap();

        assert_eq!(config.probe.interval_secs, 60);
        assert_eq!(config.probe.network_interface, "enp0s3");
        assert_eq!(config.collector.backoff_initial_secs, 1);
        assert!(config.probe.enable.disk);
        assert!(!config.probe.enable.port_scan);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            collector: {
                url: "wss://collector.example.com/serverws",
                backoff_initial_secs: 2,
                backoff_max_secs: 120,
            },
            probe: {
                interval_secs: 30,
                network_interface: "eth0",
                battery_device: "/org/freedesktop/UPower/devices/battery_BAT1",
                port_scan_timeout_secs: 20,
                enable: {
                    hardware: false,
                    firewall: false,
                    port_scan: true,
                },
            },
            logging: { level: "debug" },
        }"#;

        let config: AgentConfig = json5::from_str(json).unwrap();
        config.validate().unwrap();

        assert_eq!(config.probe.network_interface, "eth0");
        assert_eq!(config.probe.port_scan_timeout_secs, 20);
        assert!(!config.probe.enable.hardware);
        assert!(config.probe.enable.port_scan);
        assert!(config.probe.enable.ssh);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_rejects_http_url() {
        let json = r#"{
            collector: { url: "http://localhost:8080" }
        }"#;

        let config: AgentConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let json = r#"{
            collector: { url: "ws://localhost:8080" },
            probe: { interval_secs: 0 }
        }"#;

        let config: AgentConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_scan_timeout_at_interval() {
        let json = r#"{
            collector: { url: "ws://localhost:8080" },
            probe: {
                interval_secs: 10,
                port_scan_timeout_secs: 10,
                enable: { port_scan: true },
            }
        }"#;

        let config: AgentConfig = json5::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }
}
