// Desktop application control, one strategy per operating system.

pub mod command;
pub mod windows;

use anyhow::{Result, bail};

use crate::config::DesktopConfig;

pub use command::CommandDesktop;
pub use windows::WindowsDesktop;

/// What the wrapper needs from the engine's desktop application.
pub trait Desktop {
    /// Whether the desktop process is active. Never fails: a broken
    /// inspection mechanism reads as "not running".
    fn is_running(&self) -> bool;

    /// Start the desktop application without waiting for it to come up.
    fn launch(&self) -> Result<()>;
}

/// Pick the strategy for `os` (a `std::env::consts::OS` value), with any
/// configured commands taking the place of the native ones.
pub fn select(os: &str, overrides: &DesktopConfig) -> Box<dyn Desktop> {
    let native = native(os);
    if overrides.detect.is_none() && overrides.launch.is_none() {
        return native;
    }
    Box::new(Configured {
        overrides: overrides.clone(),
        native,
    })
}

fn native(os: &str) -> Box<dyn Desktop> {
    match os {
        "windows" => Box::new(WindowsDesktop::new()),
        "macos" => Box::new(CommandDesktop::macos()),
        "linux" => Box::new(CommandDesktop::linux()),
        other => Box::new(Unsupported { os: other.to_string() }),
    }
}

/// Platforms with no known way to find or start the desktop.
struct Unsupported {
    os: String,
}

impl Desktop for Unsupported {
    fn is_running(&self) -> bool {
        false
    }

    fn launch(&self) -> Result<()> {
        bail!("unsupported platform: {}", self.os)
    }
}

/// Native strategy with either half replaced by a configured command.
struct Configured {
    overrides: DesktopConfig,
    native: Box<dyn Desktop>,
}

impl Desktop for Configured {
    fn is_running(&self) -> bool {
        match &self.overrides.detect {
            Some(query) => command::desktop_running(query),
            None => self.native.is_running(),
        }
    }

    fn launch(&self) -> Result<()> {
        match &self.overrides.launch {
            Some(launch) => command::spawn_detached(command::command_for(launch)),
            None => self.native.launch(),
        }
    }
}
