use crate::data::DEFAULT_BASE_URL;
use crate::ui::{ChartWindow, StylePreset};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const MAX_TOP_N: u32 = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub top_n: u32,
    pub chart_window: ChartWindow,
    pub chart_style: StylePreset,
    pub request_timeout_secs: Option<u64>,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            top_n: 10,
            chart_window: ChartWindow::SevenDays,
            chart_style: StylePreset::Plain,
            request_timeout_secs: None,
            log_file: PathBuf::from("coinscope.log"),
        }
    }
}

impl AppConfig {
    pub fn sanitized(mut self) -> Self {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };

        self.top_n = self.top_n.clamp(1, MAX_TOP_N);

        if self.request_timeout_secs == Some(0) {
            self.request_timeout_secs = None;
        }

        if self.log_file.as_os_str().is_empty() {
            self.log_file = AppConfig::default().log_file;
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".coinscope.json")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(#[from] io::Error),
    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// `Ok(None)` when there is no file yet. A file that exists but does not
/// parse is an error so callers know not to write over it.
pub fn load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&contents)?;
    Ok(Some(config.sanitized()))
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let payload = serde_json::to_string_pretty(config)?;
    std::fs::write(path, payload)?;
    Ok(())
}

/// Stores the chart window, keeping whatever else the file holds.
/// An unparseable file is left as it is.
pub fn save_window(path: &Path, window: ChartWindow) -> Result<(), ConfigError> {
    let mut config = load_config(path)?.unwrap_or_default();
    config.chart_window = window;
    save_config(path, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coinscope-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load_config(Path::new("/definitely/not/here/.coinscope.json")).unwrap();
        assert_eq!(cfg, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{"chart_style":"dark","top_n":0,"base_url":"http://x/api/"}"#).unwrap();

        let cfg = load_config(&path).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.chart_style, StylePreset::Dark);
        assert_eq!(cfg.top_n, 1);
        assert_eq!(cfg.base_url, "http://x/api");
        assert_eq!(cfg.chart_window, ChartWindow::SevenDays);
    }

    #[test]
    fn invalid_json_is_reported() {
        let path = temp_path("invalid");
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_config(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn saving_window_leaves_invalid_file_alone() {
        let path = temp_path("invalid-save");
        std::fs::write(&path, "{ not json").unwrap();

        let result = save_window(&path, ChartWindow::OneDay);
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        assert_eq!(contents, "{ not json");
    }

    #[test]
    fn saving_window_keeps_other_settings() {
        let path = temp_path("keep");
        std::fs::write(&path, r#"{"chart_style":"dark","top_n":25,"base_url":"http://x/api"}"#).unwrap();

        save_window(&path, ChartWindow::OneDay).unwrap();
        let cfg = load_config(&path).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.chart_window, ChartWindow::OneDay);
        assert_eq!(cfg.chart_style, StylePreset::Dark);
        assert_eq!(cfg.top_n, 25);
        assert_eq!(cfg.base_url, "http://x/api");
    }

    #[test]
    fn saving_window_creates_missing_file() {
        let path = temp_path("fresh");
        std::fs::remove_file(&path).ok();

        save_window(&path, ChartWindow::OneDay).unwrap();
        let cfg = load_config(&path).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg, AppConfig { chart_window: ChartWindow::OneDay, ..AppConfig::default() });
    }

    #[test]
    fn save_then_load_keeps_window() {
        let path = temp_path("roundtrip");
        let cfg = AppConfig {
            chart_window: ChartWindow::OneDay,
            request_timeout_secs: Some(15),
            ..AppConfig::default()
        };

        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path).unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn sanitize_clamps_values() {
        let cfg = AppConfig {
            base_url: "   ".into(),
            top_n: 10_000,
            request_timeout_secs: Some(0),
            log_file: PathBuf::new(),
            ..AppConfig::default()
        }
        .sanitized();

        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.top_n, MAX_TOP_N);
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.log_file, PathBuf::from("coinscope.log"));
    }
}
