//! JIOPad - JIO node daemon
//!
//! Wires the wallet registry, the PoW and PoS block producers and the
//! JSON-RPC control surface together and serves it over WebSocket.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod ui;

pub use cli::Args;
pub use config::Config;
pub use daemon::Daemon;
