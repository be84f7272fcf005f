use std::path::PathBuf;
use std::process::Command;

use anyhow::{Result, bail};
use tracing::debug;

use super::Desktop;
use super::command::{desktop_running, spawn_detached};
use crate::config::Argv;

/// Well-known install locations, searched in order.
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Docker\Docker\Docker Desktop.exe",
    r"C:\Program Files (x86)\Docker\Docker\Docker Desktop.exe",
    r"%LOCALAPPDATA%\Programs\Docker\Docker\Docker Desktop.exe",
];

/// `CREATE_NO_WINDOW` from the Win32 process creation flags.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

pub struct WindowsDesktop {
    candidates: Vec<String>,
}

impl WindowsDesktop {
    pub fn new() -> Self {
        Self::with_candidates(INSTALL_PATHS.iter().map(|p| p.to_string()).collect())
    }

    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// First candidate that exists after environment expansion.
    pub fn find_install(&self) -> Option<PathBuf> {
        self.candidates
            .iter()
            .map(|candidate| PathBuf::from(expand_env(candidate, |name| std::env::var(name).ok())))
            .find(|path| path.is_file())
    }
}

impl Default for WindowsDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl Desktop for WindowsDesktop {
    fn is_running(&self) -> bool {
        let query = Argv::from_words([
            "powershell",
            "-Command",
            "Get-Process 'Docker Desktop' -ErrorAction SilentlyContinue",
        ]);
        desktop_running(&query)
    }

    fn launch(&self) -> Result<()> {
        let Some(path) = self.find_install() else {
            debug!("Docker Desktop not found in standard paths: {:?}", self.candidates);
            bail!("Docker Desktop not found. Please ensure Docker Desktop is installed");
        };
        debug!("Found Docker Desktop at: {}", path.display());

        #[allow(unused_mut)]
        let mut command = Command::new(&path);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }
        spawn_detached(command)
    }
}

/// Expand `%NAME%` references using `lookup`. Unknown names and a lone
/// `%` are kept verbatim.
pub fn expand_env<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
