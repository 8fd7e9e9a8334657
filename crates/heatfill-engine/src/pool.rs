//! Fixed-size worker pool for assembly and block-multiply tasks.
//!
//! Workers pull boxed jobs from a shared unbounded crossbeam channel in
//! FIFO order. Each submitted task gets its own bounded(1) reply channel;
//! the returned [`TaskHandle`] blocks on it. A panicking task is caught
//! on the worker, reported through its reply channel, and the worker
//! keeps serving.
//!
//! Dropping the pool closes the queue and joins every worker after the
//! already-queued jobs have run.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors from submitting to or waiting on the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// A worker thread could not be spawned.
    SpawnFailed {
        /// OS error description.
        reason: String,
    },
    /// The pool has been shut down.
    Closed,
    /// The task panicked.
    TaskPanicked {
        /// Panic payload, when it was a string.
        message: String,
    },
    /// The task was dropped without producing a result.
    Abandoned,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed { reason } => write!(f, "failed to spawn worker: {reason}"),
            Self::Closed => write!(f, "worker pool is shut down"),
            Self::TaskPanicked { message } => write!(f, "task panicked: {message}"),
            Self::Abandoned => write!(f, "task dropped without a result"),
        }
    }
}

impl Error for PoolError {}

/// Pending result of a submitted task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    reply: Receiver<Result<T, PoolError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes.
    pub fn wait(self) -> Result<T, PoolError> {
        self.reply.recv().unwrap_or(Err(PoolError::Abandoned))
    }
}

/// A bounded set of named worker threads.
pub struct WorkerPool {
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one).
    ///
    /// If a spawn fails, the workers already started are shut down
    /// before the error is returned.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let size = size.max(1);
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut pool = Self {
            queue: Some(tx),
            workers: Vec::with_capacity(size),
            size,
        };
        for i in 0..size {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("heatfill-worker-{i}"))
                .spawn(move || worker_loop(rx))
                .map_err(|e| PoolError::SpawnFailed {
                    reason: e.to_string(),
                })?;
            pool.workers.push(handle);
        }
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue `task` and return a handle to its result.
    pub fn submit<T, F>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let queue = self.queue.as_ref().ok_or(PoolError::Closed)?;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
                PoolError::TaskPanicked {
                    message: panic_message(payload.as_ref()),
                }
            });
            // The submitter may have stopped waiting.
            let _ = reply_tx.send(result);
        });
        queue.send(job).map_err(|_| PoolError::Closed)?;
        Ok(TaskHandle { reply: reply_rx })
    }

    /// Close the queue and join every worker. Returns the number of
    /// workers that exited cleanly. Idempotent.
    pub fn shutdown(&mut self) -> usize {
        self.queue.take();
        let mut joined = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_ok() {
                joined += 1;
            }
        }
        joined
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("running", &self.workers.len())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rx: Receiver<Job>) {
    while let Ok(job) = rx.recv() {
        job();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
