use std::net::SocketAddr;

use renderpulse_core::error::{PulseError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub heartbeat: HeartbeatSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            heartbeat: HeartbeatSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::BadRequest("config version must be 1".into()));
        }
        self.server.validate()?;
        self.heartbeat.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.bind_addr().map(|_| ())
    }

    /// Listen address assembled from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            PulseError::BadRequest(format!(
                "server.host/server.port is not a valid socket address: {e}"
            ))
        })
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatSection {
    #[serde(default = "default_heartbeat_enabled")]
    pub enabled: bool,

    /// Log collector address (UDP).
    #[serde(default = "default_heartbeat_target")]
    pub target: String,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub interval_ms: u64,

    /// Service name stamped into every record.
    #[serde(default = "default_heartbeat_service")]
    pub service: String,

    /// Environment tag stamped into every record.
    #[serde(default = "default_heartbeat_env")]
    pub env: String,
}

impl Default for HeartbeatSection {
    fn default() -> Self {
        Self {
            enabled: default_heartbeat_enabled(),
            target: default_heartbeat_target(),
            interval_ms: default_heartbeat_interval_ms(),
            service: default_heartbeat_service(),
            env: default_heartbeat_env(),
        }
    }
}

impl HeartbeatSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.interval_ms) {
            return Err(PulseError::BadRequest(
                "heartbeat.interval_ms must be between 100 and 60000".into(),
            ));
        }
        if self.target.parse::<SocketAddr>().is_err() {
            return Err(PulseError::BadRequest(
                "heartbeat.target must be a valid socket address".into(),
            ));
        }
        Ok(())
    }
}

fn default_heartbeat_enabled() -> bool {
    true
}
fn default_heartbeat_target() -> String {
    "127.0.0.1:5140".into()
}
fn default_heartbeat_interval_ms() -> u64 {
    2000
}
fn default_heartbeat_service() -> String {
    "renderpulse".into()
}
fn default_heartbeat_env() -> String {
    "local".into()
}
