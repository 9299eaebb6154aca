use opsbell_bridge::config::Config;

#[derive(Debug, Clone, Default)]
pub struct SettingsEntity {
    pub config: Config,
    /// Set once the backend answered the configuration request.
    pub loaded: bool,
}

impl SettingsEntity {
    pub fn update(&mut self, config: Config) {
        self.config = config;
        self.loaded = true;
    }
}
