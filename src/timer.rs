//! Cancellable timers and value debouncing.
//!
//! Both types spawn onto the ambient tokio runtime and must be driven from
//! inside one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A single-shot timer that can be restarted or cancelled.
///
/// At most one action is pending at a time. Dropping the handle cancels it.
#[derive(Debug, Default)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` after `delay`, cancelling whatever was pending
    pub fn start<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Cancel the pending action. Returns true if one was actually pending.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let pending = !task.is_finished();
                task.abort();
                pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Publishes the latest value only after it has been stable for `delay`.
///
/// Every update restarts the timer; only the last value of a burst survives.
/// Settled values are broadcast on a watch channel, and `take_changed` lets a
/// polling owner pick them up without awaiting.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    latest: T,
    tx: Arc<watch::Sender<T>>,
    rx: watch::Receiver<T>,
    timer: TimerHandle,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (tx, rx) = watch::channel(initial.clone());
        Self {
            delay,
            latest: initial,
            tx: Arc::new(tx),
            rx,
            timer: TimerHandle::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Feed a new raw value
    pub fn update(&mut self, value: T) {
        self.latest = value.clone();

        if self.delay.is_zero() {
            self.timer.cancel();
            publish(&self.tx, value);
            return;
        }

        let tx = Arc::clone(&self.tx);
        self.timer.start(self.delay, move || publish(&tx, value));
    }

    /// Publish the pending value now instead of waiting for the timer
    pub fn flush(&mut self) {
        self.timer.cancel();
        publish(&self.tx, self.latest.clone());
    }

    /// Replace both the raw and the settled value, dropping anything pending
    pub fn reset(&mut self, value: T) {
        self.timer.cancel();
        self.latest = value.clone();
        publish(&self.tx, value);
    }

    /// The most recent raw value, settled or not
    pub fn latest(&self) -> &T {
        &self.latest
    }

    /// The most recently published value
    pub fn settled(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Return a newly settled value once, without blocking
    pub fn take_changed(&mut self) -> Option<T> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(self.rx.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Wait for the next settled value.
    ///
    /// Never resolves if nothing is pending and no further update arrives.
    pub async fn changed(&mut self) -> T {
        // The sender lives in self, so the channel cannot close underneath us.
        let _ = self.rx.changed().await;
        self.rx.borrow_and_update().clone()
    }
}

fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}
