/// Transient user notifications ("toasts")
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Fire-and-forget sink for user-visible error messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: DateTime<Utc>,
}

/// Shared toast queue
///
/// Clones share the same queue, so async tasks can push while the UI reads.
#[derive(Debug, Clone)]
pub struct Toasts {
    queue: Arc<Mutex<VecDeque<Toast>>>,
    lifetime: Duration,
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            lifetime,
        }
    }

    pub fn info(&self, message: &str) {
        self.push(message, ToastLevel::Info);
    }

    pub fn error(&self, message: &str) {
        self.push(message, ToastLevel::Error);
    }

    fn push(&self, message: &str, level: ToastLevel) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(Toast {
                message: message.to_string(),
                level,
                created_at: Utc::now(),
            });
        }
    }

    /// Drop every toast older than the lifetime, returns how many were removed
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut queue) = self.queue.lock() else {
            return 0;
        };
        let before = queue.len();
        queue.retain(|toast| now - toast.created_at < self.lifetime);
        before - queue.len()
    }

    /// Toasts currently on screen, oldest first
    pub fn snapshot(&self) -> Vec<Toast> {
        self.queue
            .lock()
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().map(|queue| queue.is_empty()).unwrap_or(true)
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::seconds(3))
    }
}

impl Notifier for Toasts {
    fn notify(&self, message: &str) {
        log::warn!("⚠️  {}", message);
        self.error(message);
    }
}
