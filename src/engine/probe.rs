use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Argv;

/// How often a running probe is checked for exit.
const EXIT_POLL: Duration = Duration::from_millis(20);

/// Asks the engine whether its daemon will accept commands.
///
/// Each probe is a cheap engine subcommand (`info`, `version`, `ps` by
/// default). They are tried in order and the first one that exits
/// successfully marks the engine ready; which one answered carries no
/// meaning.
pub struct EngineProbe<'a> {
    engine: &'a str,
    probes: &'a [Argv],
}

impl<'a> EngineProbe<'a> {
    pub fn new(engine: &'a str, probes: &'a [Argv]) -> Self {
        Self { engine, probes }
    }

    /// Run the probes, sharing `budget` between them. A probe still running
    /// when the budget is spent is killed and counts as a failure.
    pub fn is_ready(&self, budget: Duration) -> bool {
        let deadline = Instant::now() + budget;
        for (i, probe) in self.probes.iter().enumerate() {
            if Instant::now() >= deadline {
                break;
            }
            if run_quietly(self.engine, probe, deadline) {
                debug!("{} ready check passed (method {}: {probe})", self.engine, i + 1);
                return true;
            }
        }
        false
    }
}

/// Run `engine <probe...>` with all standard streams detached. Failing to
/// spawn or missing `deadline` counts as "not ready".
fn run_quietly(engine: &str, probe: &Argv, deadline: Instant) -> bool {
    let child = Command::new(engine)
        .args(probe.words())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match child {
        Ok(mut child) => loop {
            match child.try_wait() {
                Ok(Some(status)) => return status.success(),
                Ok(None) => {}
                Err(_) => {
                    reap(&mut child);
                    return false;
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!("`{engine} {probe}` did not answer before the deadline");
                reap(&mut child);
                return false;
            }
            std::thread::sleep(EXIT_POLL.min(deadline - now));
        },
        Err(_) => false,
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
