//! Platform Executor
//!
//! Owns the single UI processing thread and its FIFO work queue. All UI-tree
//! mutation, event-listener dispatch, and host-callback invocation runs here,
//! one task at a time, in schedule order. Every entry point is safe to call
//! from any thread; "blocking" always means waiting for the cross-thread
//! hand-off, never I/O.
//!
//! The executor has an explicit lifecycle: created once at UI-runtime
//! startup with [`PlatformExecutor::start`], shared via `Arc`, torn down with
//! [`PlatformExecutor::shutdown`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use tracing::{debug, warn};

use crate::error::SceneError;

type UiWork = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a deferred UI-thread task.
///
/// Returned by [`PlatformExecutor::run_deferred`]; a clone is also passed to
/// the work itself so it can poll [`TaskHandle::is_cancelled`] mid-execution.
/// Cancellation is advisory only; it never interrupts running work.
pub struct TaskHandle<T> {
    cancelled: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    result_rx: Receiver<Result<T, SceneError>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cancelled: self.cancelled.clone(),
            done: self.done.clone(),
            result_rx: self.result_rx.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    /// Whether the work has fully executed (successfully or not).
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Request cooperative cancellation. The work must poll
    /// [`TaskHandle::is_cancelled`] for this to have any effect on execution;
    /// a subsequent [`TaskHandle::wait`] fails with [`SceneError::Cancelled`]
    /// regardless.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Block until the work has executed and return its result.
    ///
    /// # Errors
    /// [`SceneError::Cancelled`] when the task was cancelled,
    /// [`SceneError::ExecutionFailed`] wrapping the work's own error,
    /// [`SceneError::Interrupted`] when the executor shut down first.
    pub fn wait(self) -> Result<T, SceneError> {
        if self.is_cancelled() {
            return Err(SceneError::Cancelled);
        }
        match self.result_rx.recv() {
            Ok(Ok(value)) => {
                if self.is_cancelled() {
                    Err(SceneError::Cancelled)
                } else {
                    Ok(value)
                }
            }
            Ok(Err(err)) => Err(SceneError::ExecutionFailed(Box::new(err))),
            Err(_) => Err(SceneError::Interrupted),
        }
    }
}

/// The process-wide UI-thread executor.
pub struct PlatformExecutor {
    work_tx: Mutex<Option<Sender<UiWork>>>,
    ui_thread_id: ThreadId,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PlatformExecutor {
    /// Spawn the UI processing thread and return the executor driving it.
    pub fn start() -> Self {
        let (work_tx, work_rx) = unbounded::<UiWork>();

        let join_handle = thread::spawn(move || {
            debug!("UI processing thread started");
            // One cooperative queue: each task runs to completion before the
            // next begins. A panicking task is isolated so it cannot abort
            // the processing loop.
            for work in work_rx {
                if catch_unwind(AssertUnwindSafe(work)).is_err() {
                    warn!("UI task panicked; continuing with the next task");
                }
            }
            debug!("UI processing thread stopped");
        });

        let ui_thread_id = join_handle.thread().id();

        Self {
            work_tx: Mutex::new(Some(work_tx)),
            ui_thread_id,
            join_handle: Mutex::new(Some(join_handle)),
        }
    }

    /// Whether the calling thread is the UI processing thread.
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread_id
    }

    fn sender(&self) -> Result<Sender<UiWork>, SceneError> {
        self.work_tx
            .lock()
            .unwrap()
            .clone()
            .ok_or(SceneError::ExecutorStopped)
    }

    fn enqueue(&self, work: UiWork) -> Result<(), SceneError> {
        self.sender()?
            .send(work)
            .map_err(|_| SceneError::ExecutorStopped)
    }

    /// Fire-and-forget: schedule `work` for later execution on the UI thread.
    ///
    /// Returns as soon as the work is queued. There is no way to observe
    /// completion; failures inside the work are the work's own concern,
    /// matching the UI thread's error-isolation policy.
    ///
    /// # Errors
    /// [`SceneError::ExecutorStopped`] when the executor has shut down.
    pub fn run(&self, work: impl FnOnce() + Send + 'static) -> Result<(), SceneError> {
        self.enqueue(Box::new(work))
    }

    /// Blocking round-trip: run `work` on the UI thread and wait for its
    /// result.
    ///
    /// Must not be called from the UI thread itself; that case is detected
    /// and fails fast instead of self-deadlocking.
    ///
    /// # Errors
    /// [`SceneError::SelfWaitDeadlock`] when called on the UI thread,
    /// [`SceneError::ExecutionFailed`] wrapping the work's own error,
    /// [`SceneError::Interrupted`] when the hand-off is torn down while
    /// waiting (executor shutdown, or the work panicked),
    /// [`SceneError::ExecutorStopped`] when the executor has shut down.
    pub fn run_wait<T: Send + 'static>(
        &self,
        work: impl FnOnce() -> Result<T, SceneError> + Send + 'static,
    ) -> Result<T, SceneError> {
        if self.is_ui_thread() {
            return Err(SceneError::SelfWaitDeadlock);
        }

        let (result_tx, result_rx) = bounded(1);
        self.enqueue(Box::new(move || {
            let _ = result_tx.send(work());
        }))?;

        match result_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(SceneError::ExecutionFailed(Box::new(err))),
            Err(_) => Err(SceneError::Interrupted),
        }
    }

    /// Deferred round-trip: schedule `work` and return a [`TaskHandle`]
    /// immediately.
    ///
    /// The work receives a clone of the handle so it can observe cancellation
    /// mid-execution.
    ///
    /// # Errors
    /// [`SceneError::ExecutorStopped`] when the executor has shut down.
    pub fn run_deferred<T: Send + 'static>(
        &self,
        work: impl FnOnce(&TaskHandle<T>) -> Result<T, SceneError> + Send + 'static,
    ) -> Result<TaskHandle<T>, SceneError> {
        let (result_tx, result_rx) = bounded(1);
        let handle = TaskHandle {
            cancelled: Arc::new(AtomicBool::new(false)),
            done: Arc::new(AtomicBool::new(false)),
            result_rx,
        };

        let task_view = handle.clone();
        self.enqueue(Box::new(move || {
            let outcome = work(&task_view);
            task_view.done.store(true, Ordering::SeqCst);
            let _ = result_tx.send(outcome);
        }))?;

        Ok(handle)
    }

    /// Stop accepting work, drain the queue, and join the UI thread.
    ///
    /// Idempotent; callers blocked in `run_wait`/`wait` when the thread exits
    /// observe [`SceneError::Interrupted`].
    pub fn shutdown(&self) {
        let tx = self.work_tx.lock().unwrap().take();
        drop(tx);

        if let Some(handle) = self.join_handle.lock().unwrap().take() {
            if self.is_ui_thread() {
                // Shutdown requested from the UI thread itself; the loop
                // drains and exits once the current task returns.
                return;
            }
            if handle.join().is_err() {
                warn!("UI processing thread terminated abnormally");
            }
        }
    }
}

impl Drop for PlatformExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn trace_init() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn test_run_wait_returns_work_result() {
        trace_init();
        let executor = PlatformExecutor::start();
        let value = executor.run_wait(|| Ok(21 * 2)).unwrap();
        assert_eq!(value, 42);
        executor.shutdown();
    }

    #[test]
    fn test_tasks_execute_in_schedule_order() {
        let executor = PlatformExecutor::start();
        let seen: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        for n in 0..16 {
            let seen = seen.clone();
            executor
                .run(move || seen.lock().unwrap().push(n))
                .unwrap();
        }
        // run_wait queues behind everything above, so returning means the
        // fire-and-forget tasks have all executed.
        executor.run_wait(|| Ok(())).unwrap();

        assert_eq!(*seen.lock().unwrap(), (0..16).collect::<Vec<u32>>());
        executor.shutdown();
    }

    #[test]
    fn test_run_wait_from_ui_thread_fails_fast() {
        let executor = Arc::new(PlatformExecutor::start());
        let inner = executor.clone();

        let nested = executor
            .run_wait(move || {
                assert!(inner.is_ui_thread());
                match inner.run_wait(|| Ok(())) {
                    Err(SceneError::SelfWaitDeadlock) => Ok(true),
                    _ => Ok(false),
                }
            })
            .unwrap();

        assert!(nested, "nested blocking wait must fail with SelfWaitDeadlock");
        executor.shutdown();
    }

    #[test]
    fn test_run_wait_wraps_work_failure() {
        let executor = PlatformExecutor::start();
        let err = executor
            .run_wait(|| -> Result<(), SceneError> { Err(SceneError::Parse("bad".into())) })
            .unwrap_err();
        assert!(matches!(err, SceneError::ExecutionFailed(_)));
        executor.shutdown();
    }

    #[test]
    fn test_panicking_task_does_not_kill_the_loop() {
        trace_init();
        let executor = PlatformExecutor::start();
        executor.run(|| panic!("task blew up")).unwrap();
        // The loop must survive and keep processing.
        assert_eq!(executor.run_wait(|| Ok(7)).unwrap(), 7);
        executor.shutdown();
    }

    #[test]
    fn test_deferred_completion_status() {
        let executor = PlatformExecutor::start();
        let (gate_tx, gate_rx) = bounded::<()>(0);

        // Hold the UI thread so the deferred task cannot start yet.
        executor
            .run(move || {
                let _ = gate_rx.recv();
            })
            .unwrap();

        let handle = executor.run_deferred(|_task| Ok("done")).unwrap();
        assert!(!handle.is_done());

        gate_tx.send(()).unwrap();
        assert_eq!(handle.clone().wait().unwrap(), "done");
        assert!(handle.is_done());
        executor.shutdown();
    }

    #[test]
    fn test_cancel_before_completion_fails_wait() {
        let executor = PlatformExecutor::start();
        let (gate_tx, gate_rx) = bounded::<()>(0);

        executor
            .run(move || {
                let _ = gate_rx.recv();
            })
            .unwrap();

        let handle = executor
            .run_deferred(|task: &TaskHandle<u32>| {
                // Cooperative cancellation: bail out early when flagged.
                if task.is_cancelled() { Ok(0) } else { Ok(1) }
            })
            .unwrap();

        handle.cancel();
        gate_tx.send(()).unwrap();

        assert!(matches!(handle.wait(), Err(SceneError::Cancelled)));
        executor.shutdown();
    }

    #[test]
    fn test_stopped_executor_rejects_work() {
        let executor = PlatformExecutor::start();
        executor.shutdown();
        assert!(matches!(
            executor.run(|| {}),
            Err(SceneError::ExecutorStopped)
        ));
        assert!(matches!(
            executor.run_wait(|| Ok(())),
            Err(SceneError::ExecutorStopped)
        ));
    }

    #[test]
    fn test_shutdown_drains_pending_work() {
        let executor = PlatformExecutor::start();
        let seen = Arc::new(Mutex::new(0u32));

        for _ in 0..8 {
            let seen = seen.clone();
            executor
                .run(move || {
                    thread::sleep(Duration::from_millis(1));
                    *seen.lock().unwrap() += 1;
                })
                .unwrap();
        }
        executor.shutdown();

        assert_eq!(*seen.lock().unwrap(), 8);
    }
}
