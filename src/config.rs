use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CINotifyError;

/// Configuration file structure for cinotify.
///
/// Loaded once at startup and read-only afterwards. Environment variables
/// override values read from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Chat delivery settings
    #[serde(default)]
    pub slack: SlackConfig,

    /// Commit metadata lookups
    #[serde(default)]
    pub github: GitHubConfig,

    /// Pipeline execution API
    #[serde(default)]
    pub codepipeline: CodePipelineConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    /// Incoming webhook URL
    pub webhook_url: Option<String>,

    /// Channel every notification goes to
    pub channel: Option<String>,

    /// Extra channel for status changes to success or failure
    pub channel_important: Option<String>,

    pub username: Option<String>,

    pub icon_emoji: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub personal access token
    pub token: Option<String>,

    /// GitHub API base URL
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CodePipelineConfig {
    /// Endpoint accepting execution API requests
    #[serde(default = "default_codepipeline_base_url")]
    pub base_url: String,

    /// Region used for console links
    #[serde(default = "default_region")]
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeoutConfig {
    /// Deadline for each upstream call, in seconds
    #[serde(default = "default_provider_secs")]
    pub provider_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_github_base_url(),
        }
    }
}

impl Default for CodePipelineConfig {
    fn default() -> Self {
        Self {
            base_url: default_codepipeline_base_url(),
            region: default_region(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_secs: default_provider_secs(),
        }
    }
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_codepipeline_base_url() -> String {
    format!("https://codepipeline.{}.amazonaws.com", default_region())
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_provider_secs() -> u64 {
    10
}

impl TimeoutConfig {
    pub fn provider(&self) -> Duration {
        Duration::from_secs(self.provider_secs.max(1))
    }
}

impl Config {
    /// Load configuration from a file, then apply environment overrides.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cinotify.toml
    /// 3. ./cinotify.json
    /// 4. ./cinotify.yaml
    /// 5. ./cinotify.yml
    /// 6. `<config dir>/cinotify/config.toml`
    ///
    /// Falls back to defaults if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::find(path) {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn find(path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(path.to_path_buf());
        }

        let candidates = ["cinotify.toml", "cinotify.json", "cinotify.yaml", "cinotify.yml"];
        candidates
            .iter()
            .map(PathBuf::from)
            .chain(dirs::config_dir().map(|dir| dir.join("cinotify").join("config.toml")))
            .find(|path| path.exists())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Overrides file values with whatever `lookup` returns for the known
    /// environment variable names. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("SLACK_WEBHOOK_URI") {
            self.slack.webhook_url = Some(v);
        }
        if let Some(v) = get("SLACK_CHANNEL") {
            self.slack.channel = Some(v);
        }
        if let Some(v) = get("SLACK_CHANNEL_IMPORTANT") {
            self.slack.channel_important = Some(v);
        }
        if let Some(v) = get("SLACK_USERNAME") {
            self.slack.username = Some(v);
        }
        if let Some(v) = get("SLACK_EMOJI") {
            self.slack.icon_emoji = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("CODEPIPELINE_BASE_URL") {
            self.codepipeline.base_url = v;
        }
        if let Some(v) = get("AWS_REGION") {
            self.codepipeline.region = v;
        }
    }

    /// Checks the settings needed to deliver to chat.
    pub fn validate_for_delivery(&self) -> std::result::Result<(), CINotifyError> {
        let missing = |key: &str| CINotifyError::Config(format!("missing required setting '{key}'"));

        if self.slack.webhook_url.as_deref().unwrap_or("").is_empty() {
            return Err(missing("slack.webhook-url (SLACK_WEBHOOK_URI)"));
        }
        if self.slack.channel.as_deref().unwrap_or("").is_empty() {
            return Err(missing("slack.channel (SLACK_CHANNEL)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.base_url, "https://api.github.com");
        assert_eq!(config.codepipeline.region, "us-east-1");
        assert_eq!(
            config.codepipeline.base_url,
            "https://codepipeline.us-east-1.amazonaws.com"
        );
        assert_eq!(config.timeouts.provider(), Duration::from_secs(10));
        assert!(config.slack.channel_important.is_none());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r##"
[slack]
webhook-url = "https://hooks.slack.com/services/T/B/X"
channel = "#builds"
channel-important = "#alerts"
username = "pipeline-bot"

[codepipeline]
region = "eu-west-1"

[timeouts]
provider-secs = 3
"##;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.slack.channel.as_deref(), Some("#builds"));
        assert_eq!(config.slack.channel_important.as_deref(), Some("#alerts"));
        assert_eq!(config.slack.username.as_deref(), Some("pipeline-bot"));
        assert_eq!(config.codepipeline.region, "eu-west-1");
        assert_eq!(config.timeouts.provider_secs, 3);
        assert_eq!(config.github.base_url, "https://api.github.com");
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r##"{
  "slack": { "channel": "#ci" },
  "github": { "token": "ghp_json", "base-url": "https://ghe.example.com/api/v3" }
}"##;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.slack.channel.as_deref(), Some("#ci"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_json"));
        assert_eq!(config.github.base_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(
            temp_file,
            "slack:\n  channel: \"#yaml\"\ntimeouts:\n  provider-secs: 7\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.slack.channel.as_deref(), Some("#yaml"));
        assert_eq!(config.timeouts.provider_secs, 7);
    }

    #[test]
    fn test_load_invalid_config_fails() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[slack\nchannel = ").unwrap();
        assert!(Config::load_from_path(temp_file.path()).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.slack.channel = Some("#from-file".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            ("SLACK_CHANNEL", "#from-env"),
            ("SLACK_CHANNEL_IMPORTANT", "#alerts"),
            ("SLACK_WEBHOOK_URI", "https://hooks.slack.com/services/T/B/X"),
            ("GITHUB_TOKEN", "ghp_env"),
            ("AWS_REGION", "ap-southeast-2"),
            ("SLACK_USERNAME", ""),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.slack.channel.as_deref(), Some("#from-env"));
        assert_eq!(config.slack.channel_important.as_deref(), Some("#alerts"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(config.codepipeline.region, "ap-southeast-2");
        assert!(config.slack.username.is_none());
    }

    #[test]
    fn test_validate_for_delivery() {
        let mut config = Config::default();
        let err = config.validate_for_delivery().unwrap_err();
        assert!(err.to_string().contains("slack.webhook-url"));

        config.slack.webhook_url = Some("https://hooks.slack.com/services/T/B/X".to_string());
        let err = config.validate_for_delivery().unwrap_err();
        assert!(err.to_string().contains("slack.channel"));

        config.slack.channel = Some("#builds".to_string());
        assert!(config.validate_for_delivery().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let timeouts = TimeoutConfig { provider_secs: 0 };
        assert_eq!(timeouts.provider(), Duration::from_secs(1));
    }
}
