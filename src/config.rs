//! Configuration from env vars (port, keep-alive, room lifetimes).

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// WebSocket liveness: how often the server pings, and how long a socket may
/// stay silent before it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self { interval: Duration::from_secs(30), timeout: Duration::from_secs(60) }
    }
}

/// When the janitor evicts a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPolicy {
    /// No subscribers and no mutation for this long.
    pub idle_ttl: Duration,
    /// Host left outside a running game and has not come back.
    pub host_rejoin_grace: Duration,
    pub sweep_interval: Duration,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(3600),
            host_rejoin_grace: Duration::from_secs(120),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub keepalive: KeepAlive,
    pub rooms: RoomPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            keepalive: KeepAlive::default(),
            rooms: RoomPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let keepalive = KeepAlive::default();
        let rooms = RoomPolicy::default();
        Self {
            addr: server_addr(),
            keepalive: KeepAlive {
                interval: env_secs("KAZHUTHA_PING_INTERVAL_SECS", keepalive.interval),
                timeout: env_secs("KAZHUTHA_CONNECTION_TIMEOUT_SECS", keepalive.timeout),
            },
            rooms: RoomPolicy {
                idle_ttl: env_secs("KAZHUTHA_ROOM_IDLE_SECS", rooms.idle_ttl),
                host_rejoin_grace: env_secs("KAZHUTHA_HOST_REJOIN_GRACE_SECS", rooms.host_rejoin_grace),
                sweep_interval: env_secs("KAZHUTHA_SWEEP_INTERVAL_SECS", rooms.sweep_interval),
            },
        }
    }
}

fn env_secs(key: &str, default: Duration) -> Duration {
    parse_secs(env::var(key).ok().as_deref(), default)
}

fn parse_secs(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map_or(default, Duration::from_secs)
}
