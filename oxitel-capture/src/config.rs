use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub cycle: CycleConfig,
    pub transport: TransportConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CycleConfig {
    /// Number of acquisition attempts per measurement cycle.
    pub sample_count: usize,
    /// Pacing delay between acquisition attempts, in seconds.
    pub interval_secs: u64,
    /// Reject frames whose vital bytes contain non-decimal nibbles.
    /// Off by default; the reference device occasionally emits them.
    pub strict_bcd: bool,
    /// Upper bound on one sync-marker scan. Unset means the scan only ends
    /// when a marker arrives, the stream closes, or the cycle is cancelled.
    pub scan_timeout_secs: Option<u64>,
}

impl CycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn scan_timeout(&self) -> Option<Duration> {
        self.scan_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    Serial {
        /// Serial device path, e.g. /dev/ttyUSB0
        device: String,
        /// Baud rate of the sensor link
        baud: u32,
        /// Per-read timeout; an expired read yields zero bytes
        read_timeout_ms: u64,
    },
    /// Synthetic frame generator, no hardware required.
    Mock,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Sqlite { path: PathBuf },
    Http { endpoint: String },
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle: CycleConfig {
                sample_count: 5,
                interval_secs: 1,
                strict_bcd: false,
                scan_timeout_secs: None,
            },
            transport: TransportConfig::Serial {
                device: "/dev/ttyUSB0".to_string(),
                baud: 38400,
                read_timeout_ms: 1000,
            },
            sink: SinkConfig::Sqlite {
                path: PathBuf::from("vitals.db"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serial_sqlite_config() {
        let toml = r#"
            [cycle]
            sample_count = 5
            interval_secs = 1
            strict_bcd = false

            [transport]
            type = "serial"
            device = "/dev/ttyUSB1"
            baud = 38400
            read_timeout_ms = 1000

            [sink]
            type = "sqlite"
            path = "out.db"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cycle.sample_count, 5);
        assert!(config.cycle.scan_timeout().is_none());
        match config.transport {
            TransportConfig::Serial { ref device, .. } => assert_eq!(device, "/dev/ttyUSB1"),
            _ => panic!("expected serial transport"),
        }
    }

    #[test]
    fn parses_mock_http_config() {
        let toml = r#"
            [cycle]
            sample_count = 3
            interval_secs = 0
            strict_bcd = true
            scan_timeout_secs = 10

            [transport]
            type = "mock"

            [sink]
            type = "http"
            endpoint = "http://localhost:9000/vitals"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.cycle.strict_bcd);
        assert_eq!(config.cycle.scan_timeout(), Some(Duration::from_secs(10)));
        assert!(matches!(config.transport, TransportConfig::Mock));
        match config.sink {
            SinkConfig::Http { ref endpoint } => {
                assert_eq!(endpoint, "http://localhost:9000/vitals")
            }
            _ => panic!("expected http sink"),
        }
    }
}
