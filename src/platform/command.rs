use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

use super::Desktop;
use crate::config::Argv;

/// Run a process-listing query and report whether it matched anything.
///
/// Matches mean the query exited successfully with non-blank stdout. A
/// missing tool or any other execution error reads as "not running".
pub fn process_listed(query: &Argv) -> bool {
    let (program, args) = query.split_program();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(out) if out.status.success() => !String::from_utf8_lossy(&out.stdout).trim().is_empty(),
        Ok(out) => {
            debug!("`{query}` exited with {}", out.status);
            false
        }
        Err(e) => {
            debug!("Error checking Docker Desktop with `{query}`: {e}");
            false
        }
    }
}

/// [`process_listed`], logging the result as the desktop's state.
pub fn desktop_running(query: &Argv) -> bool {
    let running = process_listed(query);
    debug!("Docker Desktop running: {running}");
    running
}

/// Spawn `command` with detached stdio and return without waiting on it.
pub fn spawn_detached(mut command: Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("Starting Docker Desktop with command: {command:?}");
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run `{program}`"))?;
    Ok(())
}

pub fn command_for(argv: &Argv) -> Command {
    let (program, args) = argv.split_program();
    let mut command = Command::new(program);
    command.args(args);
    command
}

/// A desktop driven entirely by two external commands: one that lists
/// the desktop process, one that starts it.
#[derive(Debug, Clone)]
pub struct CommandDesktop {
    detect: Argv,
    launch: Argv,
}

impl CommandDesktop {
    pub fn new(detect: Argv, launch: Argv) -> Self {
        Self { detect, launch }
    }

    /// Docker Desktop on macOS: a GUI app bundle.
    pub fn macos() -> Self {
        Self::new(
            Argv::from_words(["pgrep", "-f", "Docker Desktop"]),
            Argv::from_words(["open", "-a", "Docker Desktop"]),
        )
    }

    /// Docker on Linux: the desktop process, falling back to the system
    /// service for starting.
    pub fn linux() -> Self {
        Self::new(
            Argv::from_words(["pgrep", "-f", "docker-desktop"]),
            Argv::from_words(["sudo", "systemctl", "start", "docker"]),
        )
    }
}

impl Desktop for CommandDesktop {
    fn is_running(&self) -> bool {
        desktop_running(&self.detect)
    }

    fn launch(&self) -> Result<()> {
        spawn_detached(command_for(&self.launch))
    }
}
