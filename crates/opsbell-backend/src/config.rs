use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use opsbell_bridge::config::Config;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
};

/// Environment variable that relocates both the config file and the data
/// directory under a single root.
pub const HOME_OVERRIDE_VAR: &str = "OPSBELL_HOME";

/// Errors that can occur while loading or resolving application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to determine the user's configuration or data directories. This
    /// usually occurs when required environment variables are missing (e.g.,
    /// `$HOME` on Unix or `%APPDATA%` on Windows).
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    /// An I/O error occurred while reading or writing the configuration file.
    #[error("failed to access config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or does not match the expected structure.
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where the configuration file and persisted notifications live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolves the platform directories, honoring [`HOME_OVERRIDE_VAR`].
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Some(home) = std::env::var_os(HOME_OVERRIDE_VAR) {
            return Ok(Self::under(Path::new(&home)));
        }

        let dirs =
            ProjectDirs::from("dev", "opsbell", "opsbell").ok_or(ConfigError::DirectoriesNotFound)?;
        Ok(Self {
            config_file: dirs.config_dir().join("config.toml"),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Keeps everything below `root`: `root/config.toml` and `root/data`.
    pub fn under(root: &Path) -> Self {
        Self {
            config_file: root.join("config.toml"),
            data_dir: root.join("data"),
        }
    }
}

/// Loads the configuration, writing the defaults on first run.
pub async fn load_config(paths: &ConfigPaths) -> Result<Config, ConfigError> {
    log::info!("Loading configuration from {:?}", paths.config_file);
    if paths.config_file.exists() {
        let contents = read_to_string(&paths.config_file).await?;
        return Ok(toml::from_str(&contents)?);
    }

    let config = Config::default();
    write_config(&paths.config_file, &config, false).await?;
    Ok(config)
}

/// Saves `config`, replacing the existing file.
pub async fn save_config(paths: &ConfigPaths, config: &Config) -> Result<(), ConfigError> {
    write_config(&paths.config_file, config, true).await
}

async fn write_config(path: &Path, config: &Config, replace: bool) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(config)?;
    let mut options = OpenOptions::new();
    options.write(true);
    if replace {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use opsbell_bridge::role::Role;

    use super::*;

    #[tokio::test]
    async fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ConfigPaths::under(dir.path());

        let config = load_config(&paths).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(paths.config_file.exists());
    }

    #[tokio::test]
    async fn saved_changes_are_loaded_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ConfigPaths::under(dir.path());
        load_config(&paths).await.unwrap();

        let mut config = Config::default();
        config.channel.role = Role::Pilot;
        config.channel.user_id = Some("u1".into());
        save_config(&paths, &config).await.unwrap();

        assert_eq!(load_config(&paths).await.unwrap(), config);
    }

    #[tokio::test]
    async fn malformed_files_are_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ConfigPaths::under(dir.path());
        std::fs::write(&paths.config_file, "channel = 3").unwrap();

        assert!(matches!(
            load_config(&paths).await,
            Err(ConfigError::Deserialize(_))
        ));
    }
}
