#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

/// Detection query that always reports the desktop as running.
pub const RUNNING: &str = "sh -c 'echo 4242'";
/// Detection query that always reports the desktop as stopped.
pub const STOPPED: &str = "sh -c 'exit 1'";

/// Scratch directory holding fake engine scripts and a config file.
///
/// The fake engine is `sh`, so every forwarded command and probe is a
/// script path run by the shell rather than an executable written on the fly.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a shell script and return its path as a string.
    pub fn script(&self, name: &str, body: &str) -> String {
        let path = self.path(name);
        std::fs::write(&path, format!("{body}\n")).expect("failed to write script");
        path.display().to_string()
    }

    /// Write a config using `sh` as the engine.
    pub fn config(&self, timeout: i64, probe: &str, detect: &str, launch: &str) -> String {
        let yaml = format!(
            "engine: sh\n\
             timeout: {timeout}\n\
             poll_interval_ms: 100\n\
             probes: ['{probe}']\n\
             desktop:\n  detect: \"{detect}\"\n  launch: '{launch}'\n"
        );
        let path = self.path("autostart.yaml");
        std::fs::write(&path, yaml).expect("failed to write config");
        path.display().to_string()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

pub fn autostart() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docker-autostart"));
    cmd.timeout(Duration::from_secs(30));
    cmd
}
