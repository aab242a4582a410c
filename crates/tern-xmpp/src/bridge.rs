use std::future::Future;

use crate::error::BridgeError;

/// Runs asynchronous operations to completion on behalf of blocking callers.
///
/// The bridge owns a dedicated multi-thread runtime, so the operation never
/// executes on the calling thread and never depends on a single-threaded
/// cooperative loop the caller might be part of. `run` blocks only its own
/// caller; nested bridged calls are serviced by the remaining workers, which
/// is what makes reentrancy safe.
pub struct SyncBridge {
    runtime: tokio::runtime::Runtime,
}

impl SyncBridge {
    pub fn new() -> Result<Self, BridgeError> {
        // At least two workers so a bridged call issued from inside another
        // bridged call still makes progress.
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2)
            .max(2);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("tern-bridge")
            .enable_all()
            .build()?;

        Ok(Self { runtime })
    }

    /// Execute `operation` on the bridge runtime and block until it
    /// completes, returning its output.
    ///
    /// The operation's own failure type travels inside the output;
    /// [`BridgeError::Aborted`] covers only a panicked or aborted task.
    /// Cancellation is never implicit: an operation that should be
    /// cancellable must observe its own token, and its cancellation error
    /// comes back like any other output.
    pub fn run<F>(&self, operation: F) -> Result<F::Output, BridgeError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = std::sync::mpsc::channel();
        self.runtime.spawn(async move {
            let _ = tx.send(operation.await);
        });
        rx.recv().map_err(|_| BridgeError::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn returns_the_operation_output() {
        let bridge = SyncBridge::new().unwrap();
        let result = bridge.run(async { 21 * 2 }).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn propagates_the_operation_failure() {
        let bridge = SyncBridge::new().unwrap();
        let result: Result<(), &str> = bridge.run(async { Err("send failed") }).unwrap();
        assert_eq!(result, Err("send failed"));
    }

    #[test]
    fn panicked_operation_reports_aborted() {
        let bridge = SyncBridge::new().unwrap();
        let result = bridge.run(async { panic!("boom") });
        assert!(matches!(result, Err(BridgeError::Aborted)));
    }

    #[test]
    fn operation_can_sleep_without_blocking_the_runtime() {
        let bridge = SyncBridge::new().unwrap();
        let result = bridge
            .run(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                "done"
            })
            .unwrap();
        assert_eq!(result, "done");
    }

    #[test]
    fn concurrent_callers_complete_without_cross_contamination() {
        let bridge = Arc::new(SyncBridge::new().unwrap());

        let threads: Vec<_> = (0..8u64)
            .map(|i| {
                let bridge = bridge.clone();
                std::thread::spawn(move || {
                    bridge
                        .run(async move {
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            i * 10
                        })
                        .unwrap()
                })
            })
            .collect();

        for (i, thread) in threads.into_iter().enumerate() {
            assert_eq!(thread.join().unwrap(), i as u64 * 10);
        }
    }

    #[test]
    fn nested_bridged_calls_do_not_deadlock() {
        let bridge = Arc::new(SyncBridge::new().unwrap());

        let inner_bridge = bridge.clone();
        let result = bridge
            .run(async move {
                // A bridged operation that itself performs a blocking
                // bridged call from a helper thread.
                std::thread::spawn(move || inner_bridge.run(async { 7 }).unwrap())
                    .join()
                    .unwrap()
            })
            .unwrap();

        assert_eq!(result, 7);
    }
}
