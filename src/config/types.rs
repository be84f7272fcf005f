use std::fmt;
use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::engine::POLL_INTERVAL;

/// Floor for `poll_interval_ms`, so a config file cannot make the
/// readiness loop hammer a starting engine.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// A command line written as a single string and split with shell quoting
/// rules, e.g. `open -a "Docker Desktop"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Argv(Vec<String>);

impl Argv {
    pub fn parse(line: &str) -> Result<Self> {
        let words = shell_words::split(line)?;
        if words.is_empty() {
            bail!("command line cannot be blank");
        }
        Ok(Self(words))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    /// The first word and the remaining arguments.
    pub fn split_program(&self) -> (&str, &[String]) {
        match self.0.split_first() {
            Some((program, args)) => (program.as_str(), args),
            None => ("", &[]),
        }
    }
}

impl TryFrom<String> for Argv {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl fmt::Display for Argv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.0))
    }
}

/// Overrides for how the desktop application is found and started.
/// Unset fields fall back to the platform's native mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesktopConfig {
    pub detect: Option<Argv>,
    pub launch: Option<Argv>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Engine client binary used for probes and forwarding.
    pub engine: String,
    /// Seconds to wait for the engine after a launch. Zero or negative
    /// gives up without probing.
    pub timeout: i64,
    pub poll_interval_ms: u64,
    /// Engine subcommands tried in order on every tick.
    pub probes: Vec<Argv>,
    pub desktop: DesktopConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: "docker".to_string(),
            timeout: 120,
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            probes: vec![
                Argv::from_words(["info"]),
                Argv::from_words(["version"]),
                Argv::from_words(["ps"]),
            ],
            desktop: DesktopConfig::default(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            bail!("engine cannot be blank");
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            bail!("poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}");
        }
        if self.probes.is_empty() {
            bail!("probes must list at least one engine command");
        }
        Ok(())
    }
}
