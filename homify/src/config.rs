use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application configuration, persisted as config.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reminders: ReminderScheduleConfig,
    #[serde(default)]
    pub notifications: NotificationChannelConfig,
}

impl AppConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage.database_path.trim().is_empty() {
            errors.push("storage.database_path must not be empty".to_string());
        }

        if self.reminders.interval_hours == 0 {
            errors.push("reminders.interval_hours must be at least 1".to_string());
        }

        if self.notifications.channel_id.trim().is_empty() {
            errors.push("notifications.channel_id must not be empty".to_string());
        }

        errors
    }
}

/// Where the grocery database lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Periodic reminder job settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReminderScheduleConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u32,
    /// Unique name of the periodic job; re-scheduling under the same name keeps
    /// the existing job.
    #[serde(default = "default_job_name")]
    pub job_name: String,
}

impl ReminderScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_hours.max(1)) * 60 * 60)
    }
}

impl Default for ReminderScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            job_name: default_job_name(),
        }
    }
}

/// Platform notification channel the reminders are posted to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationChannelConfig {
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
    #[serde(default = "default_channel_description")]
    pub channel_description: String,
}

impl Default for NotificationChannelConfig {
    fn default() -> Self {
        Self {
            channel_id: default_channel_id(),
            channel_name: default_channel_name(),
            channel_description: default_channel_description(),
        }
    }
}

impl NotificationChannelConfig {
    /// A notification as posted on this channel: channel name, title, then
    /// the indented body
    pub fn render(&self, title: &str, body: &str) -> String {
        format!("[{}] {}\n    {}", self.channel_name, title, body)
    }
}

fn default_database_path() -> String {
    "homify.sqlite".to_string()
}

fn default_interval_hours() -> u32 {
    24
}

fn default_job_name() -> String {
    "daily_reminder_work".to_string()
}

fn default_channel_id() -> String {
    "homify_reminders".to_string()
}

fn default_channel_name() -> String {
    "Expiry Reminders".to_string()
}

fn default_channel_description() -> String {
    "Notifies before items expire".to_string()
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.database_path, "homify.sqlite");
        assert_eq!(config.reminders.interval_hours, 24);
        assert_eq!(config.reminders.job_name, "daily_reminder_work");
        assert_eq!(config.notifications.channel_id, "homify_reminders");
        assert_eq!(config.notifications.channel_name, "Expiry Reminders");
        assert_eq!(config.notifications.channel_description, "Notifies before items expire");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&AppConfig::path(dir.path())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = AppConfig::path(dir.path());

        let mut config = AppConfig::default();
        config.storage.database_path = "/data/groceries.sqlite".to_string();
        config.reminders.interval_hours = 12;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str("[reminders]\ninterval_hours = 6\n").unwrap();
        assert_eq!(config.reminders.interval_hours, 6);
        assert_eq!(config.reminders.job_name, "daily_reminder_work");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let mut config = AppConfig::default();
        config.storage.database_path = " ".to_string();
        config.reminders.interval_hours = 0;
        config.notifications.channel_id = String::new();
        assert_eq!(config.validate().len(), 3);
    }

    #[test]
    fn test_render_uses_channel_name() {
        let mut channel = NotificationChannelConfig::default();
        assert_eq!(
            channel.render("⚠️ Milk expiring today", "Milk expires today. Use or replace it soon!"),
            "[Expiry Reminders] ⚠️ Milk expiring today\n    Milk expires today. Use or replace it soon!"
        );

        let config: AppConfig =
            toml::from_str("[notifications]\nchannel_name = \"Pantry\"\n").unwrap();
        channel = config.notifications;
        assert_eq!(channel.render("t", "b"), "[Pantry] t\n    b");
        assert_eq!(channel.channel_id, "homify_reminders");
    }

    #[test]
    fn test_interval() {
        let schedule = ReminderScheduleConfig::default();
        assert_eq!(schedule.interval(), Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = AppConfig::path(dir.path());
        std::fs::write(&path, "reminders = [").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
