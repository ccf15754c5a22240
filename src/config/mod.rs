use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::{ExportFormat, Quality};
use crate::export::DEFAULT_FILE_STEM;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

const APP_DIR: &str = "pixtune";
const APP_CONFIG_FILE: &str = "config.json";

fn default_file_stem() -> String {
    DEFAULT_FILE_STEM.to_string()
}

/// Viewer settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub default_format: ExportFormat,
    pub jpeg_quality: Quality,
    pub webp_quality: Quality,
    pub export_file_stem: String,
    pub show_edit_panel: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::default(),
            jpeg_quality: Quality::DEFAULT,
            webp_quality: Quality::DEFAULT,
            export_file_stem: default_file_stem(),
            show_edit_panel: true,
        }
    }
}

/// Location of `config.json` for the current environment.
pub fn viewer_config_path() -> ConfigResult<PathBuf> {
    let (xdg_config_home, home) = config_env_dirs();
    app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home.as_deref(), home.as_deref())
}

pub fn load_viewer_config() -> ViewerConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_viewer_config_with(xdg_config_home.as_deref(), home.as_deref())
}

pub fn load_viewer_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ViewerConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(err) => {
            tracing::debug!(%err, "no config location; using defaults");
            return ViewerConfig::default();
        }
    };
    if !path.exists() {
        return ViewerConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            ViewerConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            ViewerConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn fresh_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "pixtune-config-{label}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(dir.join(APP_DIR)).expect("create config dir");
        dir
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "pixtune",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/pixtune/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "pixtune",
            "config.json",
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/pixtune/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("pixtune", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigError::MissingHomeDirectory);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = fresh_dir("missing");
        let config = load_viewer_config_with(Some(&dir), None);
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.export_file_stem, "processed-image");
        assert!(config.show_edit_panel);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn partial_file_overrides_and_snaps_quality() {
        let dir = fresh_dir("partial");
        fs::write(
            dir.join(APP_DIR).join(APP_CONFIG_FILE),
            r#"{ "default_format": "jpeg", "jpeg_quality": 77, "show_edit_panel": false }"#,
        )
        .expect("write config");

        let config = load_viewer_config_with(Some(&dir), None);
        assert_eq!(config.default_format, ExportFormat::Jpeg);
        assert_eq!(config.jpeg_quality.value(), 75);
        assert_eq!(config.webp_quality, Quality::DEFAULT);
        assert!(!config.show_edit_panel);
        assert_eq!(config.export_file_stem, "processed-image");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = fresh_dir("malformed");
        fs::write(dir.join(APP_DIR).join(APP_CONFIG_FILE), "{ not json").expect("write config");

        assert_eq!(load_viewer_config_with(Some(&dir), None), ViewerConfig::default());
        fs::remove_dir_all(dir).ok();
    }
}
