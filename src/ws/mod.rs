//! WebSocket push channel: protocol, per-room hub, connection lifecycle.

pub mod connection;
pub mod hub;
pub mod protocol;
