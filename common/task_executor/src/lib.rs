//! A thin wrapper around a [`tokio::runtime::Handle`] that tags every spawned
//! task with a name (for `tokio-console`/metrics correlation) and ties it to
//! a process-wide shutdown signal.
//!
//! Every long-running loop in `ssv_runner` (the cache sweep, a duty's driver
//! task) is spawned through a [`TaskExecutor`] rather than `tokio::spawn`
//! directly, so that a single `shutdown()` call can unwind them all.

use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error};

struct Inner {
    handle: Handle,
    exit: async_channel::Receiver<()>,
}

/// Cloneable handle used to spawn tasks onto a shared tokio runtime.
///
/// Cloning is cheap (an `Arc` clone); every clone observes the same
/// shutdown signal.
#[derive(Clone)]
pub struct TaskExecutor {
    inner: Arc<Inner>,
}

impl TaskExecutor {
    /// Builds a new executor bound to `handle`, with `exit` closing once
    /// the process begins shutting down.
    pub fn new(handle: Handle, exit: async_channel::Receiver<()>) -> Self {
        Self {
            inner: Arc::new(Inner { handle, exit }),
        }
    }

    /// Convenience constructor that creates a fresh shutdown channel,
    /// returning the executor paired with the sender that triggers it.
    pub fn new_with_shutdown(handle: Handle) -> (Self, async_channel::Sender<()>) {
        let (tx, rx) = async_channel::bounded(1);
        (Self::new(handle, rx), tx)
    }

    /// Returns a future that resolves once shutdown has been signalled.
    pub fn exit(&self) -> impl Future<Output = ()> + 'static {
        let exit = self.inner.exit.clone();
        async move {
            let _ = exit.recv().await;
        }
    }

    /// Spawns `task`, logging (but not propagating) a panic.
    ///
    /// This is the executor's default spawn style: the caller has already
    /// decided that a panicking task should not bring down the process, the
    /// way a `BaseRunner`'s per-duty driver task shouldn't take out the
    /// cache sweep or other duties.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static, name: &'static str) {
        debug!(task = name, "spawning task");
        self.inner.handle.spawn(async move {
            task.await;
            debug!(task = name, "task finished");
        });
    }

    /// Spawns a `Result`-returning future, logging the `Err` case instead of
    /// propagating it. Used for one-shot work (e.g. a single duty's fetch)
    /// where failure should be observable but must not panic the spawner.
    pub fn spawn_ignoring_error<E>(
        &self,
        task: impl Future<Output = Result<(), E>> + Send + 'static,
        name: &'static str,
    ) where
        E: std::fmt::Debug + Send + 'static,
    {
        self.inner.handle.spawn(async move {
            if let Err(e) = task.await {
                error!(task = name, error = ?e, "task returned an error");
            }
        });
    }

    /// Handle to the underlying tokio runtime, for code that needs to spawn
    /// blocking work (`spawn_blocking`) directly.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }
}
