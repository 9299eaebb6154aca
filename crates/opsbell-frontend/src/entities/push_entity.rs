use opsbell_bridge::push::{PushHistoryItem, PushStats};

#[derive(Debug, Clone, Default)]
pub struct PushEntity {
    pub history: Vec<PushHistoryItem>,
    /// `None` until the first stats response arrives.
    pub stats: Option<PushStats>,
}

impl PushEntity {
    pub fn find(&self, id: &str) -> Option<&PushHistoryItem> {
        self.history.iter().find(|item| item.id == id)
    }
}
