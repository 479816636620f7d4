use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::tui::Theme;

pub const DEFAULT_CALCULATING_DELAY: &str = "3500ms";
pub const DEFAULT_MESSAGE_INTERVAL: &str = "700ms";
pub const DEFAULT_SITE_URL: &str = "https://dafuqbro.com";

/// User configuration, read from `~/.config/dafuqbro/config.yaml`.
///
/// Example YAML:
/// ```yaml
/// calculating_delay: 2s
/// message_interval: 500ms
/// data_dir: ~/quizzes
/// site_url: https://dafuqbro.com
/// theme: dark
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How long the "calculating" screen shows before the result
    #[serde(default = "default_calculating_delay")]
    pub calculating_delay: String,

    /// Rotation period of the calculating status messages
    #[serde(default = "default_message_interval")]
    pub message_interval: String,

    /// Directory whose quiz YAML files replace the built-in ones
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub blog_path: Option<PathBuf>,

    #[serde(default)]
    pub sessions_path: Option<PathBuf>,

    /// Base URL used in share links
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub theme: Theme,
}

fn default_calculating_delay() -> String {
    DEFAULT_CALCULATING_DELAY.to_string()
}

fn default_message_interval() -> String {
    DEFAULT_MESSAGE_INTERVAL.to_string()
}

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calculating_delay: default_calculating_delay(),
            message_interval: default_message_interval(),
            data_dir: None,
            blog_path: None,
            sessions_path: None,
            site_url: default_site_url(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn calculating_delay(&self) -> Result<Duration> {
        humantime::parse_duration(self.calculating_delay.trim())
            .with_context(|| format!("Invalid calculating_delay '{}'", self.calculating_delay))
    }

    pub fn message_interval(&self) -> Result<Duration> {
        humantime::parse_duration(self.message_interval.trim())
            .with_context(|| format!("Invalid message_interval '{}'", self.message_interval))
    }

    pub fn blog_path(&self) -> PathBuf {
        self.blog_path
            .clone()
            .unwrap_or_else(crate::blog::get_blog_path)
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.sessions_path
            .clone()
            .unwrap_or_else(crate::admin::get_sessions_path)
    }
}
