use std::ffi::OsString;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Run `engine args...` with the caller's stdin, stdout and stderr, wait
/// for it, and return its exit code.
///
/// Errors when the child cannot be spawned or ends without an exit code
/// (e.g. killed by a signal).
pub fn forward(engine: &str, args: &[OsString]) -> Result<i32> {
    debug!("Executing {engine} command: {args:?}");

    let mut child = Command::new(engine)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Error executing {engine} command"))?;

    let status = {
        let _interrupts = InterruptGuard::ignore();
        child
            .wait()
            .with_context(|| format!("Error waiting for {engine} command"))?
    };

    let code = exit_code(engine, status)?;
    if code != 0 {
        debug!("{engine} command failed: {status}");
    }
    Ok(code)
}

fn exit_code(engine: &str, status: ExitStatus) -> Result<i32> {
    if let Some(code) = status.code() {
        return Ok(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            bail!("{engine} command was terminated by signal {signal}");
        }
    }

    bail!("{engine} command exited without a status code ({status})")
}

/// Ignores SIGINT for as long as it is alive, so a terminal Ctrl-C only
/// interrupts the child and the wrapper can still relay its exit code.
///
/// Installed after the child is spawned: ignored dispositions survive
/// `exec`, and the child must keep the default one.
#[cfg(unix)]
struct InterruptGuard {
    previous: libc::sighandler_t,
}

#[cfg(unix)]
impl InterruptGuard {
    fn ignore() -> Self {
        // SAFETY: signal() only swaps the process-wide disposition; SIG_IGN
        // runs no handler code.
        let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
        Self { previous }
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if self.previous != libc::SIG_ERR {
            // SAFETY: restores the disposition returned by the earlier call.
            unsafe {
                libc::signal(libc::SIGINT, self.previous);
            }
        }
    }
}

#[cfg(not(unix))]
struct InterruptGuard;

#[cfg(not(unix))]
impl InterruptGuard {
    fn ignore() -> Self {
        InterruptGuard
    }
}
