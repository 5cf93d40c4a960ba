//! Tracing setup shared by every crate in the workspace.
//!
//! Components never configure their own subscriber; the surrounding binary
//! (out of scope for this core, see spec.md §1) calls [`init_tracing`] once
//! at startup. Everything else just does `tracing::info!(...)` and friends.

use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Installs a global tracing subscriber reading its filter directives from
/// `RUST_LOG`, defaulting to `info` when unset.
///
/// `json` selects the structured formatter used in production deployments;
/// the human-readable formatter is generally preferred for local debugging.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// The minimum interval between repeated log messages about the same
/// recurring condition (e.g. "no PTC duties for this slot" every slot).
const LOG_DEBOUNCE_INTERVAL: Duration = Duration::from_secs(30);

/// De-bounces a recurring log line so it's only emitted once per interval
/// even if the condition it reports is checked every slot.
#[derive(Default)]
pub struct TimeLatch(Option<Instant>);

impl TimeLatch {
    /// Returns `true` at most once every [`LOG_DEBOUNCE_INTERVAL`].
    pub fn elapsed(&mut self) -> bool {
        let now = Instant::now();
        let is_elapsed = self.0.is_some_and(|elapse_time| now > elapse_time);

        if is_elapsed || self.0.is_none() {
            self.0 = Some(now + LOG_DEBOUNCE_INTERVAL);
        }

        is_elapsed
    }
}
