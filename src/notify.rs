//! Toast registry.
//!
//! A [`Notifier`] is built once at startup and handed to whatever needs to
//! raise or display toasts. Listeners subscribe to a broadcast channel instead
//! of registering callbacks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Toasts kept at once; the oldest is dropped beyond this
pub const MAX_TOASTS: usize = 5;

const CHANNEL_CAPACITY: usize = 32;

pub type ToastId = u64;

/// Severity level for toast notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl ToastLevel {
    /// How long a toast of this level stays visible
    pub fn ttl(&self) -> Duration {
        match self {
            ToastLevel::Info | ToastLevel::Success => Duration::from_secs(3),
            ToastLevel::Warning => Duration::from_secs(5),
            ToastLevel::Error => Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub level: ToastLevel,
    pub created: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= self.level.ttl()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    Shown(Toast),
    Dismissed(ToastId),
}

#[derive(Debug, Default)]
struct Registry {
    toasts: Vec<Toast>,
    next_id: ToastId,
    closed: bool,
}

#[derive(Debug)]
pub struct Notifier {
    registry: Mutex<Registry>,
    events: broadcast::Sender<ToastEvent>,
}

impl Notifier {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Arc::new(Self {
            registry: Mutex::new(Registry::default()),
            events,
        })
    }

    /// Show a toast. Returns `None` once the notifier has been shut down.
    pub fn push(&self, message: impl Into<String>, level: ToastLevel) -> Option<ToastId> {
        let toast = {
            let mut registry = self.registry.lock();
            if registry.closed {
                return None;
            }
            registry.next_id += 1;
            let toast = Toast {
                id: registry.next_id,
                message: message.into(),
                level,
                created: Instant::now(),
            };
            registry.toasts.push(toast.clone());
            if registry.toasts.len() > MAX_TOASTS {
                registry.toasts.remove(0);
            }
            toast
        };

        let id = toast.id;
        // No subscribers is fine
        let _ = self.events.send(ToastEvent::Shown(toast));
        Some(id)
    }

    pub fn info(&self, message: impl Into<String>) -> Option<ToastId> {
        self.push(message, ToastLevel::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> Option<ToastId> {
        self.push(message, ToastLevel::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> Option<ToastId> {
        self.push(message, ToastLevel::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> Option<ToastId> {
        self.push(message, ToastLevel::Error)
    }

    /// Most recent toast still showing
    pub fn latest(&self) -> Option<Toast> {
        self.registry.lock().toasts.last().cloned()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.registry.lock().toasts.clone()
    }

    pub fn dismiss(&self, id: ToastId) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            let before = registry.toasts.len();
            registry.toasts.retain(|t| t.id != id);
            registry.toasts.len() != before
        };
        if removed {
            let _ = self.events.send(ToastEvent::Dismissed(id));
        }
        removed
    }

    /// Drop toasts whose level TTL has passed. Returns how many were dropped.
    pub fn expire(&self, now: Instant) -> usize {
        let expired: Vec<ToastId> = {
            let mut registry = self.registry.lock();
            let (gone, kept): (Vec<Toast>, Vec<Toast>) = registry
                .toasts
                .drain(..)
                .partition(|t| t.is_expired(now));
            registry.toasts = kept;
            gone.into_iter().map(|t| t.id).collect()
        };
        for id in &expired {
            let _ = self.events.send(ToastEvent::Dismissed(*id));
        }
        expired.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.events.subscribe()
    }

    /// Clear every toast and refuse new ones
    pub fn shutdown(&self) {
        let mut registry = self.registry.lock();
        registry.closed = true;
        registry.toasts.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.registry.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_push_and_expire_by_level() {
        let notifier = Notifier::new();
        let info = notifier.info("saved").unwrap();
        let error = notifier.error("failed").unwrap();
        assert_eq!(notifier.latest().unwrap().id, error);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(notifier.expire(Instant::now()), 1);
        let active: Vec<ToastId> = notifier.active().iter().map(|t| t.id).collect();
        assert_eq!(active, vec![error]);
        assert!(!notifier.dismiss(info));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(notifier.expire(Instant::now()), 1);
        assert!(notifier.latest().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_events() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let id = notifier.warning("slow backend").unwrap();
        assert!(notifier.dismiss(id));

        match rx.recv().await.unwrap() {
            ToastEvent::Shown(toast) => {
                assert_eq!(toast.message, "slow backend");
                assert_eq!(toast.level, ToastLevel::Warning);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(rx.recv().await.unwrap(), ToastEvent::Dismissed(id));
    }

    #[tokio::test]
    async fn test_capacity_and_shutdown() {
        let notifier = Notifier::new();
        for i in 0..MAX_TOASTS + 2 {
            notifier.info(format!("toast {i}"));
        }
        let active = notifier.active();
        assert_eq!(active.len(), MAX_TOASTS);
        assert_eq!(active[0].message, "toast 2");

        notifier.shutdown();
        assert!(notifier.is_closed());
        assert!(notifier.latest().is_none());
        assert!(notifier.success("too late").is_none());
    }
}
