// src/session.rs

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};

type StopHook = Box<dyn FnOnce(&str) + Send>;

/// Local compute session: a dedicated rayon pool that aggregations run on.
///
/// Released exactly once, either by [`Session::stop`] or on drop.
pub struct Session {
    app_name: String,
    workers: usize,
    pool: ThreadPool,
    stopped: bool,
    on_stop: Option<StopHook>,
}

pub struct SessionBuilder {
    app_name: String,
    workers: usize,
    on_stop: Option<StopHook>,
}

impl SessionBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Callback fired once when the session is released.
    pub fn on_stop(mut self, hook: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_stop = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Result<Session> {
        if self.workers == 0 {
            return Err(BenchError::Session(
                "a session needs at least one worker".to_string(),
            ));
        }

        let prefix = self.app_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(move |i| format!("{}-worker-{}", prefix, i))
            .build()
            .map_err(|e| BenchError::Session(format!("building worker pool: {}", e)))?;

        info!(app = %self.app_name, workers = self.workers, "session started");
        Ok(Session {
            app_name: self.app_name,
            workers: self.workers,
            pool,
            stopped: false,
            on_stop: self.on_stop,
        })
    }
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            app_name: crate::config::DEFAULT_APP_NAME.to_string(),
            workers: 1,
            on_stop: None,
        }
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        Session::builder()
            .app_name(config.app_name.clone())
            .workers(config.workers)
            .build()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `op` on the session's worker pool, blocking until it finishes.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(hook) = self.on_stop.take() {
            hook(&self.app_name);
        }
        info!(app = %self.app_name, "session stopped");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("app_name", &self.app_name)
            .field("workers", &self.workers)
            .field("stopped", &self.stopped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(counter: &Arc<AtomicUsize>) -> SessionBuilder {
        let counter = Arc::clone(counter);
        Session::builder().on_stop(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn explicit_stop_releases_once() -> anyhow::Result<()> {
        let stops = Arc::new(AtomicUsize::new(0));
        let session = counted(&stops).build()?;
        session.stop();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn drop_releases_once() -> anyhow::Result<()> {
        let stops = Arc::new(AtomicUsize::new(0));
        {
            let _session = counted(&stops).build()?;
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            Session::builder().workers(0).build(),
            Err(BenchError::Session(_))
        ));
    }

    #[test]
    fn install_runs_on_named_worker() -> anyhow::Result<()> {
        let session = Session::builder().app_name("unit").build()?;
        let name = session.install(|| std::thread::current().name().map(str::to_string));
        assert_eq!(name.as_deref(), Some("unit-worker-0"));
        assert_eq!(session.workers(), 1);
        assert_eq!(session.install(rayon::current_num_threads), 1);
        Ok(())
    }
}
