use std::collections::HashMap;
use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use pullload_core::Completion;

/// Result of a background load, delivered on the UI thread
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub key: u64,
    pub label: String,
    pub result: Result<T>,
}

struct Finished<T> {
    key: u64,
    result: Result<T>,
}

struct Pending {
    label: String,
    completion: Completion,
}

/// Runs load work off the UI thread and ends loading back on it
///
/// Futures run on the tokio runtime and report through an unbounded
/// channel. Completions never leave the UI thread: they are held here and
/// invoked from [`LoadRunner::drain`] after the caller has applied the
/// result.
pub struct LoadRunner<T> {
    tx: mpsc::UnboundedSender<Finished<T>>,
    rx: mpsc::UnboundedReceiver<Finished<T>>,
    pending: HashMap<u64, Pending>,
    next_key: u64,
}

impl<T: Send + 'static> Default for LoadRunner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> LoadRunner<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: HashMap::new(),
            next_key: 0,
        }
    }

    /// Start `task` in the background; `completion` fires once it reports
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, label: impl Into<String>, completion: Completion, task: F) -> u64
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let key = self.next_key;
        self.next_key += 1;
        let label = label.into();
        debug!("Starting load {} ({})", key, label);

        self.pending.insert(key, Pending { label, completion });
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            let _ = tx.send(Finished { key, result });
        });
        key
    }

    /// Loads started but not yet drained
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Process every finished load without blocking
    ///
    /// `apply` sees each outcome before its completion fires, so new
    /// content is already in place when loading ends.
    pub fn drain<F>(&mut self, mut apply: F) -> usize
    where
        F: FnMut(LoadOutcome<T>),
    {
        let mut count = 0;
        while let Ok(finished) = self.rx.try_recv() {
            self.finish(finished, &mut apply);
            count += 1;
        }
        count
    }

    /// Wait for the next load to finish and process it
    ///
    /// Returns `false` straight away when nothing is in flight.
    pub async fn next<F>(&mut self, mut apply: F) -> bool
    where
        F: FnMut(LoadOutcome<T>),
    {
        if self.pending.is_empty() {
            return false;
        }
        match self.rx.recv().await {
            Some(finished) => {
                self.finish(finished, &mut apply);
                true
            }
            None => false,
        }
    }

    fn finish<F>(&mut self, finished: Finished<T>, apply: &mut F)
    where
        F: FnMut(LoadOutcome<T>),
    {
        let Some(pending) = self.pending.remove(&finished.key) else {
            return;
        };
        match &finished.result {
            Ok(_) => debug!("Load {} ({}) finished", finished.key, pending.label),
            Err(e) => warn!("Load {} ({}) failed: {:#}", finished.key, pending.label, e),
        }

        apply(LoadOutcome {
            key: finished.key,
            label: pending.label,
            result: finished.result,
        });
        // Failed loads still end the loading state.
        pending.completion.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    fn tracked() -> (Completion, Rc<Cell<bool>>) {
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        (Completion::new(move || flag.set(true)), done)
    }

    #[tokio::test]
    async fn test_completion_fires_after_apply() {
        let mut runner = LoadRunner::new();
        let (completion, done) = tracked();
        runner.spawn("refresh", completion, async { Ok(vec![1, 2, 3]) });
        assert_eq!(runner.in_flight(), 1);

        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = rows.clone();
        let observed = done.clone();
        let processed = runner
            .next(move |outcome| {
                assert_eq!(outcome.label, "refresh");
                // Not completed until the result has been applied.
                assert!(!observed.get());
                sink.borrow_mut().extend(outcome.result.expect("load ok"));
            })
            .await;

        assert!(processed);
        assert!(done.get());
        assert_eq!(*rows.borrow(), vec![1, 2, 3]);
        assert!(runner.is_idle());
    }

    #[tokio::test]
    async fn test_failure_still_completes() {
        let mut runner: LoadRunner<()> = LoadRunner::new();
        let (completion, done) = tracked();
        runner.spawn("more", completion, async { Err(anyhow::anyhow!("offline")) });

        let mut failed = false;
        runner
            .next(|outcome| failed = outcome.result.is_err())
            .await;
        assert!(failed);
        assert!(done.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_is_non_blocking() {
        let mut runner = LoadRunner::new();
        let (completion, done) = tracked();
        runner.spawn("slow", completion, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        });

        tokio::task::yield_now().await;
        assert_eq!(runner.drain(|_| {}), 0);
        assert!(!done.get());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(runner.drain(|_| {}), 1);
        assert!(done.get());
        assert_eq!(runner.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_next_without_work_returns() {
        let mut runner: LoadRunner<u8> = LoadRunner::new();
        assert!(!runner.next(|_| {}).await);
    }
}
