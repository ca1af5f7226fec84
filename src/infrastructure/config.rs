use crate::domain::thermal::{DEFAULT_BREAKPOINTS, DEFAULT_SMOOTHING_FACTOR};
use crate::infrastructure::connection_manager::DEFAULT_CONNECT_TIMEOUT;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub control: ControlSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub thermal: ThermalSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws".to_string(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControlSettings {
    pub api_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    pub suppression_ms: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            suppression_ms: 4000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThermalSettings {
    pub breakpoints: [f64; 4],
    pub smoothing_factor: f64,
    pub frame_interval_ms: u64,
    pub idle_temperature_c: f64,
}

impl Default for ThermalSettings {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            frame_interval_ms: 16,
            idle_temperature_c: 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

impl MonitorConfig {
    pub fn suppression(&self) -> Duration {
        Duration::from_millis(self.alerts.suppression_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.stream.connect_timeout_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control.timeout_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.thermal.frame_interval_ms.max(1))
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.stream.connect_timeout_ms == 0 {
            anyhow::bail!("stream.connect_timeout_ms must be positive");
        }

        let breakpoints = self.thermal.breakpoints;
        if breakpoints.iter().any(|b| !b.is_finite())
            || breakpoints.windows(2).any(|pair| pair[0] >= pair[1])
        {
            anyhow::bail!(
                "thermal.breakpoints must be finite and strictly increasing, got {:?}",
                breakpoints
            );
        }

        let factor = self.thermal.smoothing_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            anyhow::bail!("thermal.smoothing_factor must be in (0, 1], got {}", factor);
        }

        Ok(self)
    }
}

/// Load `config/monitor.toml` (optional) overlaid with `MONITOR__*` environment variables
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/monitor").required(false))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config: MonitorConfig = settings.try_deserialize()?;
    config.validate()
}

/// The stream endpoint is often configured with the same scheme as the HTTP API
pub fn websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> anyhow::Result<MonitorConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config: MonitorConfig = settings.try_deserialize()?;
        config.validate()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = parse("").unwrap();
        assert_eq!(config.stream.url, "ws://localhost:8080/ws");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.suppression(), Duration::from_millis(4000));
        assert_eq!(config.thermal.breakpoints, [20.0, 100.0, 170.0, 220.0]);
        assert_eq!(config.thermal.smoothing_factor, 0.1);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
            [control]
            api_url = "http://backend:9000"

            [thermal]
            smoothing_factor = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.control.api_url, "http://backend:9000");
        assert_eq!(config.control_timeout(), Duration::from_secs(5));
        assert_eq!(config.thermal.smoothing_factor, 0.25);
        assert_eq!(config.thermal.frame_interval_ms, 16);
    }

    #[test]
    fn test_stream_connect_timeout() {
        let config = parse(
            r#"
            [stream]
            url = "ws://autoclave-7:8080/ws"
            connect_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.connect_timeout(), Duration::from_millis(2500));

        // Setting only the url keeps the default handshake timeout
        let config = parse("[stream]\nurl = \"ws://autoclave-7:8080/ws\"").unwrap();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));

        assert!(parse("[stream]\nurl = \"ws://x/ws\"\nconnect_timeout_ms = 0").is_err());
    }

    #[test]
    fn test_rejects_unordered_breakpoints() {
        let result = parse(
            r#"
            [thermal]
            breakpoints = [20.0, 170.0, 100.0, 220.0]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_smoothing_factor() {
        assert!(parse("[thermal]\nsmoothing_factor = 0.0").is_err());
        assert!(parse("[thermal]\nsmoothing_factor = 1.5").is_err());
        assert!(parse("[thermal]\nsmoothing_factor = 1.0").is_ok());
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(websocket_url("http://localhost:8080/ws"), "ws://localhost:8080/ws");
        assert_eq!(websocket_url("https://plant.example/ws"), "wss://plant.example/ws");
        assert_eq!(websocket_url("ws://10.0.0.2/ws"), "ws://10.0.0.2/ws");
    }
}
