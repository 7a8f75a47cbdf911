//! Fixed-size worker pool over a [`BlockingQueue`] of opaque tasks.

mod queue;

pub use queue::BlockingQueue;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::error::{Result, ShoalError};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle resolving to a submitted task's return value.
pub struct TaskHandle<R> {
    rx: Receiver<R>,
}

impl<R> TaskHandle<R> {
    /// Block until the task finishes. Errors if the task panicked before
    /// producing a value.
    pub fn join(self) -> Result<R> {
        self.rx
            .recv()
            .map_err(|_| ShoalError::TaskFailed("task panicked before completing".to_string()))
    }
}

/// `N >= 1` OS threads consuming from a shared FIFO queue.
///
/// A panicking task is swallowed by the worker loop; tasks report failures
/// through shared state (or their [`TaskHandle`]), never by taking a worker
/// down with them.
pub struct WorkerPool {
    queue: Arc<BlockingQueue<Job>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    accepting: AtomicBool,
    size: usize,
}

impl WorkerPool {
    /// Spawn a pool of `threads` workers; 0 is coerced to 1.
    pub fn new(threads: usize) -> Self {
        let size = threads.max(1);
        let queue: Arc<BlockingQueue<Job>> = Arc::new(BlockingQueue::new());

        let workers = (0..size)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || worker_loop(queue))
            })
            .collect();

        Self {
            queue,
            workers: Mutex::new(workers),
            accepting: AtomicBool::new(true),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Enqueue a task and return a handle to its result. Fails once
    /// shutdown has begun.
    pub fn submit<F, R>(&self, task: F) -> Result<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(ShoalError::PoolClosed);
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let job: Job = Box::new(move || {
            let _ = tx.send(task());
        });

        if !self.queue.push(job) {
            return Err(ShoalError::PoolClosed);
        }
        Ok(TaskHandle { rx })
    }

    /// Stop accepting tasks, drain the queue, join every worker.
    /// Idempotent; also invoked from `Drop`.
    pub fn shutdown(&self) {
        if self
            .accepting
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        self.queue.close();
        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(queue: Arc<BlockingQueue<Job>>) {
    while let Some(job) = queue.pop() {
        let _ = catch_unwind(AssertUnwindSafe(job));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_zero_threads_coerced() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_submit_returns_value() {
        let pool = WorkerPool::new(2);
        let handle = pool.submit(|| 21 * 2).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn test_all_tasks_run() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap()
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_panicking_task_does_not_kill_workers() {
        let pool = WorkerPool::new(1);

        let bad = pool.submit(|| panic!("boom")).unwrap();
        assert!(bad.join().is_err());

        // The single worker survived and keeps serving.
        let good = pool.submit(|| "still alive").unwrap();
        assert_eq!(good.join().unwrap(), "still alive");
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new(2);
        pool.shutdown();
        assert!(matches!(pool.submit(|| ()), Err(ShoalError::PoolClosed)));
    }

    #[test]
    fn test_shutdown_waits_for_queued_tasks() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                std::thread::sleep(std::time::Duration::from_millis(1));
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::Relaxed), 20);

        // Idempotent.
        pool.shutdown();
    }
}
