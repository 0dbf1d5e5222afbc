//! Minecraft server manager: supervise a server process, stream its console,
//! send it commands and watch its resource usage.

pub mod commands;
pub mod config;
pub mod console;
pub mod display;
pub mod players;
pub mod properties;
pub mod server;
