//! Bounded worker pool with an unbounded, self-feeding task queue.
//!
//! `workers` OS threads pop tasks from a shared FIFO. A running task may ask
//! for more work through its `TaskSubmitter`; each request enqueues another
//! copy of the pool's template task. `wait_idle` returns once the queue is
//! empty and nothing is running.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::error::PoolError;
use crate::task::{FetchTask, TaskSubmitter};

/// Unit of work the pool can run and clone on demand.
pub trait PoolTask: Clone + Send + Sync + 'static {
    fn run(&self, submitter: &dyn TaskSubmitter);
}

impl PoolTask for FetchTask {
    fn run(&self, submitter: &dyn TaskSubmitter) {
        FetchTask::run(self, submitter)
    }
}

struct QueueState<T> {
    queue: VecDeque<T>,
    /// Queued plus running.
    pending: usize,
    closed: bool,
}

struct Shared<T> {
    template: T,
    state: Mutex<QueueState<T>>,
    work_ready: Condvar,
    idle: Condvar,
    submitted: AtomicU64,
}

impl<T: PoolTask> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self) {
        let mut state = self.lock();
        if state.closed {
            tracing::warn!("task submitted after pool shutdown; dropped");
            return;
        }
        state.queue.push_back(self.template.clone());
        state.pending += 1;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        drop(state);
        self.work_ready.notify_one();
    }

    fn next_task(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(task) = state.queue.pop_front() {
                return Some(task);
            }
            if state.closed {
                return None;
            }
            state = self
                .work_ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn finish_one(&self) {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Cloneable "submit one more task" handle given to running tasks.
pub struct PoolHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: PoolTask> TaskSubmitter for PoolHandle<T> {
    fn submit_one(&self) {
        self.shared.submit();
    }
}

pub struct WorkerPool<T: PoolTask> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: PoolTask> WorkerPool<T> {
    /// Starts `workers` threads (at least one). No task runs until one is submitted.
    ///
    /// Fails only if no thread could be spawned; a partial set is used as-is.
    pub fn start(workers: usize, template: T) -> Result<Self, PoolError> {
        Self::start_with(workers, template, |i, handle| {
            std::thread::Builder::new()
                .name(format!("fetch-worker-{}", i))
                .spawn(move || worker_loop(handle))
        })
    }

    fn start_with<F>(workers: usize, template: T, spawn: F) -> Result<Self, PoolError>
    where
        F: Fn(usize, PoolHandle<T>) -> io::Result<JoinHandle<()>>,
    {
        let shared = Arc::new(Shared {
            template,
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                pending: 0,
                closed: false,
            }),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            submitted: AtomicU64::new(0),
        });

        let requested = workers.max(1);
        let mut handles = Vec::with_capacity(requested);
        let mut last_err = None;
        for i in 0..requested {
            let handle = PoolHandle {
                shared: Arc::clone(&shared),
            };
            match spawn(i, handle) {
                Ok(h) => handles.push(h),
                Err(e) => {
                    tracing::error!("failed to spawn worker thread: {}", e);
                    last_err = Some(e);
                }
            }
        }

        if handles.is_empty() {
            return Err(PoolError::NoWorkers {
                requested,
                source: last_err
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no worker spawned")),
            });
        }
        if handles.len() < requested {
            tracing::warn!(
                running = handles.len(),
                requested,
                "worker pool started with fewer threads"
            );
        }

        Ok(Self {
            shared,
            workers: handles,
        })
    }

    pub fn handle(&self) -> PoolHandle<T> {
        PoolHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Enqueue one task (used for the initial batch).
    pub fn submit_one(&self) {
        self.shared.submit();
    }

    /// Total tasks ever submitted, initial batch included.
    pub fn submitted(&self) -> u64 {
        self.shared.submitted.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Blocks until no task is queued or running.
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock();
        while state.pending > 0 {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Drops queued tasks, lets running ones finish, and joins the workers.
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        {
            let mut state = self.shared.lock();
            state.closed = true;
            let dropped = state.queue.len();
            state.queue.clear();
            state.pending = state.pending.saturating_sub(dropped);
            if state.pending == 0 {
                self.shared.idle.notify_all();
            }
        }
        self.shared.work_ready.notify_all();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread panicked outside a task");
            }
        }
    }
}

impl<T: PoolTask> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.close_and_join();
    }
}

fn worker_loop<T: PoolTask>(handle: PoolHandle<T>) {
    while let Some(task) = handle.shared.next_task() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| task.run(&handle)));
        if result.is_err() {
            tracing::error!("fetch task panicked; worker continues");
        }
        handle.shared.finish_one();
    }
}
