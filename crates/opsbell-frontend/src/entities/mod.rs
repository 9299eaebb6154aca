pub mod notifications_entity;
pub mod push_entity;
pub mod settings_entity;

/// Everything the views render, kept current by backend messages.
#[derive(Debug, Clone, Default)]
pub struct DataEntities {
    pub settings: settings_entity::SettingsEntity,
    pub notifications: notifications_entity::NotificationsEntity,
    pub push: push_entity::PushEntity,
}
