mod schema;

pub use schema::{Config, DEFAULT_CALCULATING_DELAY, DEFAULT_MESSAGE_INTERVAL, DEFAULT_SITE_URL};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Get the config directory path (~/.config/dafuqbro/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("dafuqbro")
}

/// Get the default config file path (~/.config/dafuqbro/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// With no explicit path, a missing `~/.config/dafuqbro/config.yaml` means
/// defaults. An explicit path that does not exist is an error.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Validate a loaded config.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = humantime::parse_duration(config.calculating_delay.trim()) {
        errors.push(format!(
            "calculating_delay: invalid duration '{}': {}",
            config.calculating_delay, e
        ));
    }

    match humantime::parse_duration(config.message_interval.trim()) {
        Ok(d) if d == Duration::ZERO => {
            errors.push("message_interval: must be greater than zero".to_string())
        }
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "message_interval: invalid duration '{}': {}",
            config.message_interval, e
        )),
    }

    if !(config.site_url.starts_with("http://") || config.site_url.starts_with("https://")) {
        errors.push(format!(
            "site_url: '{}' must start with http:// or https://",
            config.site_url
        ));
    }

    if let Some(dir) = &config.data_dir {
        if !dir.is_dir() {
            errors.push(format!("data_dir: {} is not a directory", dir.display()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::Theme;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.calculating_delay().unwrap(), Duration::from_millis(3500));
        assert_eq!(config.message_interval().unwrap(), Duration::from_millis(700));
        assert_eq!(config.site_url, "https://dafuqbro.com");
        assert_eq!(config.theme, Theme::Auto);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_config(Some(path)).unwrap(), Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "calculating_delay: 1s\ntheme: light\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.calculating_delay().unwrap(), Duration::from_secs(1));
        assert_eq!(config.message_interval, DEFAULT_MESSAGE_INTERVAL);
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "queries: []\n").unwrap();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = Config {
            calculating_delay: "soon".to_string(),
            message_interval: "0ms".to_string(),
            site_url: "dafuqbro.com".to_string(),
            data_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("calculating_delay: invalid duration 'soon'"));
        assert_eq!(errors[1], "message_interval: must be greater than zero");
        assert_eq!(errors[2], "site_url: 'dafuqbro.com' must start with http:// or https://");
        assert_eq!(errors[3], "data_dir: /definitely/not/here is not a directory");
    }

    #[test]
    fn test_paths_fall_back_to_config_dir() {
        let config = Config::default();
        assert!(config.blog_path().ends_with("dafuqbro/posts.json"));
        assert!(config.sessions_path().ends_with("dafuqbro/sessions.json"));

        let custom = Config {
            blog_path: Some(PathBuf::from("/tmp/blog.json")),
            ..Config::default()
        };
        assert_eq!(custom.blog_path(), PathBuf::from("/tmp/blog.json"));
    }
}
