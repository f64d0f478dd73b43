//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration, read once at startup
///
/// Environment overrides (durations in humantime form, e.g. "15s", "2min"):
/// `LATCH_BIND`, `LATCH_ADMIN_KEY`, `LATCH_AUTO_APPROVE`,
/// `LATCH_HEARTBEAT_INTERVAL`, `LATCH_SWEEP_INTERVAL`, `LATCH_INTAKE_TIMEOUT`
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Shared static admin key compared against the `x-admin-key` header
    pub admin_key: String,
    /// Initial auto-approve policy state
    pub auto_approve: bool,
    /// Heartbeat cadence on live event streams
    pub heartbeat_interval: Duration,
    /// Cadence of the expired-grant sweep
    pub sweep_interval: Duration,
    /// Intake requests time out instead of hanging
    pub intake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: ([127, 0, 0, 1], 8470).into(),
            admin_key: "change-me".to_owned(),
            auto_approve: false,
            heartbeat_interval: Duration::from_secs(15),
            sweep_interval: Duration::from_secs(60),
            intake_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();

        if let Some(bind) = env_var("LATCH_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => tracing::warn!(value = %bind, "ignoring unparseable LATCH_BIND"),
            }
        }
        if let Some(key) = env_var("LATCH_ADMIN_KEY") {
            config.admin_key = key;
        }
        if let Some(flag) = env_var("LATCH_AUTO_APPROVE") {
            config.auto_approve = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(interval) = env_duration("LATCH_HEARTBEAT_INTERVAL") {
            config.heartbeat_interval = interval;
        }
        if let Some(interval) = env_duration("LATCH_SWEEP_INTERVAL") {
            config.sweep_interval = interval;
        }
        if let Some(timeout) = env_duration("LATCH_INTAKE_TIMEOUT") {
            config.intake_timeout = timeout;
        }

        config
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_duration(name: &str) -> Option<Duration> {
    let raw = env_var(name)?;
    match humantime::parse_duration(&raw) {
        Ok(duration) => Some(duration),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable duration");
            None
        }
    }
}
