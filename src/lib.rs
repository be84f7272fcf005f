//! Start the container engine's desktop application on demand, wait for
//! the daemon to answer, then hand the command line to the engine client.

pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod logging;
pub mod platform;
