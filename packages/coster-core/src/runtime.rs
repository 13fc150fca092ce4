//! Task spawning abstraction.
//!
//! The coordinator's maintenance loop is spawned through [`TaskSpawner`]
//! so the library never reaches for a global runtime on its own; the caller
//! decides which runtime owns the connection task.

use std::future::Future;

/// Abstraction for spawning detached background tasks.
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future that runs until it completes.
    ///
    /// There is no join or cancel handle; long-running tasks are expected to
    /// watch their own cancellation token.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Spawner backed by a Tokio runtime handle.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Creates a spawner for the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates a spawner for the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn spawned_task_runs_on_current_runtime() {
        let spawner = TokioSpawner::current();
        let (tx, rx) = oneshot::channel();

        spawner.spawn(async move {
            let _ = tx.send(7u8);
        });

        assert_eq!(rx.await.ok(), Some(7));
    }
}
