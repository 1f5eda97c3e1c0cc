use std::net::SocketAddr;

use tracing::trace;

/// Thresholds (in minutes) for deriving a device's status from the age of
/// its last observed transaction. Must satisfy active < standby < warning.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct StatusThresholds {
    /// Up to this age the device is LIVE/active
    #[serde(default = "default_active_minutes")]
    pub active_minutes: i64,

    /// Up to this age the device is LIVE/standby
    #[serde(default = "default_standby_minutes")]
    pub standby_minutes: i64,

    /// Up to this age the device is WARNING; beyond it, DOWN
    #[serde(default = "default_warning_minutes")]
    pub warning_minutes: i64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            active_minutes: default_active_minutes(),
            standby_minutes: default_standby_minutes(),
            warning_minutes: default_warning_minutes(),
        }
    }
}

impl StatusThresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.active_minutes <= 0
            || self.active_minutes >= self.standby_minutes
            || self.standby_minutes >= self.warning_minutes
        {
            anyhow::bail!(
                "status thresholds must satisfy 0 < active < standby < warning (got {}/{}/{})",
                self.active_minutes,
                self.standby_minutes,
                self.warning_minutes
            );
        }
        Ok(())
    }
}

fn default_active_minutes() -> i64 {
    10
}

fn default_standby_minutes() -> i64 {
    30
}

fn default_warning_minutes() -> i64 {
    60
}

/// Monitoring loop configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Seconds between passes over the fleet
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// Deadline for a single device's classify+write step; a slow store call
    /// for one device must not delay the rest of the pass
    #[serde(default = "default_device_timeout")]
    pub device_timeout_secs: u64,

    #[serde(default)]
    pub thresholds: StatusThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            device_timeout_secs: default_device_timeout(),
            thresholds: StatusThresholds::default(),
        }
    }
}

fn default_tick_interval() -> u64 {
    30
}

fn default_device_timeout() -> u64 {
    5
}

/// Weather snapshot configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WeatherConfig {
    /// Seconds between weather pushes (slow cadence)
    #[serde(default = "default_weather_interval")]
    pub interval_secs: u64,

    /// Sites to report on (plaza names)
    #[serde(default)]
    pub sites: Vec<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_weather_interval(),
            sites: Vec::new(),
        }
    }
}

fn default_weather_interval() -> u64 {
    3600
}

/// API server configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_bind_addr")]
    pub bind: SocketAddr,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: default_bind_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

fn default_enable_cors() -> bool {
    true
}

/// A device declared in the config file.
///
/// Declared devices start unseen (no last transaction) and are classified on
/// the first pass; transaction ingest is owned by an external pipeline.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DeviceSeed {
    pub id: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub api: ApiSettings,

    pub devices: Option<Vec<DeviceSeed>>,
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))?;
    config.monitor.thresholds.validate()?;
    trace!("loaded config: {config:?}");
    Ok(config)
}
