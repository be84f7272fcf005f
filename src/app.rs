use std::ffi::OsString;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{self, Clock, EngineProbe, SystemClock};
use crate::platform::Desktop;

/// Make sure the engine is up, then run `command` through it.
///
/// Returns the forwarded command's exit code. Launch failures, readiness
/// timeouts and a command that cannot be run at all are errors.
pub fn run(config: &Config, desktop: &dyn Desktop, command: &[OsString]) -> Result<i32> {
    ensure_engine(config, desktop, &SystemClock::new())?;
    engine::forward(&config.engine, command)
}

/// Start the desktop application if needed and wait for the engine to
/// answer. Does nothing when the desktop is already running.
pub fn ensure_engine<C>(config: &Config, desktop: &dyn Desktop, clock: &C) -> Result<()>
where
    C: Clock + ?Sized,
{
    if desktop.is_running() {
        debug!("Docker Desktop is already running");
        return Ok(());
    }

    info!("Docker Desktop is not running. Starting it...");
    desktop.launch().context("Failed to start Docker Desktop")?;

    info!("Waiting for Docker to be ready (timeout: {}s)...", config.timeout);
    let probe = EngineProbe::new(&config.engine, &config.probes);
    let outcome =
        engine::wait_until_ready(config.timeout, config.poll_interval(), clock, |budget| {
            probe.is_ready(budget)
        });
    debug!(
        "Readiness wait finished after {:?} and {} probe(s)",
        outcome.elapsed(),
        outcome.attempts()
    );

    if !outcome.is_ready() {
        bail!("Docker failed to start within {} seconds", config.timeout);
    }

    info!("Docker is ready!");
    Ok(())
}
