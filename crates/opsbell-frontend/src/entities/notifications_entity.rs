use opsbell_bridge::notification::Notification;

/// Latest notification list received from the backend, most recent first.
#[derive(Debug, Clone, Default)]
pub struct NotificationsEntity {
    pub notifications: Vec<Notification>,
}

impl NotificationsEntity {
    pub fn update(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
    }

    /// Looks up an entry by its 1-based position in the panel.
    pub fn at_position(&self, position: usize) -> Option<&Notification> {
        position
            .checked_sub(1)
            .and_then(|index| self.notifications.get(index))
    }
}
