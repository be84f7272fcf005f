mod loader;
mod types;

pub use types::{Argv, Config, DesktopConfig, MIN_POLL_INTERVAL_MS};
