//! Kazhutha: a multiplayer shedding card game served over HTTP and WebSocket.

pub mod config;
pub mod game;
pub mod http;
pub mod room;
pub mod telemetry;
pub mod util;
pub mod ws;
