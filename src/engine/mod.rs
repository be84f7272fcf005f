// Engine client interaction: readiness probing, waiting, forwarding.

pub mod forward;
pub mod probe;
pub mod wait;

pub use forward::forward;
pub use probe::EngineProbe;
pub use wait::{Clock, POLL_INTERVAL, SystemClock, WaitOutcome, wait_until_ready};
