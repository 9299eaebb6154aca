use std::collections::VecDeque;
use std::time::{Duration, Instant};

use opsbell_bridge::toast::ToastMessage;

#[derive(Debug, Clone)]
struct ActiveToast {
    toast: ToastMessage,
    expires_at: Instant,
}

/// Keeps toasts visible for a fixed duration, oldest first.
#[derive(Debug, Clone)]
pub struct Toaster {
    duration: Duration,
    active: VecDeque<ActiveToast>,
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            active: VecDeque::new(),
        }
    }

    /// Applies to toasts shown from now on.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn show(&mut self, toast: ToastMessage, now: Instant) {
        self.active.push_back(ActiveToast {
            toast,
            expires_at: now + self.duration,
        });
    }

    /// Drops expired toasts and returns how many were dropped.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|active| active.expires_at > now);
        before - self.active.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &ToastMessage> {
        self.active.iter().map(|active| &active.toast)
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
