//! Configuration management.
//!
//! Loads an optional TOML file; every missing key falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_QUIET_PERIOD;
use crate::error::{Error, Result};
use crate::export::{default_export_root, DEFAULT_CAPTION};
use crate::notify::DEFAULT_DISPLAY;

/// Default rendered image side, in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period after the last keystroke before encoding, in milliseconds.
    pub quiet_period_ms: u64,
    /// Rendered image width in pixels.
    pub image_width: u32,
    /// Rendered image height in pixels.
    pub image_height: u32,
    /// How long a status message stays up, in milliseconds.
    pub notice_duration_ms: u64,
    /// Export root. `None` means the per-user cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    /// Caption attached to shared images.
    pub caption: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            notice_duration_ms: DEFAULT_DISPLAY.as_millis() as u64,
            export_dir: None,
            caption: DEFAULT_CAPTION.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read, is not valid TOML, or holds
    /// values rejected by [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::parse(&contents).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.message().to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.quiet_period_ms == 0 {
            return Err("quiet_period_ms must be greater than zero".into());
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err("image_width and image_height must be greater than zero".into());
        }
        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// The export root: the configured directory, else `<user cache>/qrshare`, else a temp
    /// directory when the platform has no cache directory.
    pub fn export_root(&self) -> PathBuf {
        match &self.export_dir {
            Some(dir) => dir.clone(),
            None => default_export_root(&dirs::cache_dir().unwrap_or_else(std::env::temp_dir)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quiet_period(), Duration::from_millis(500));
        assert_eq!((config.image_width, config.image_height), (512, 512));
        assert_eq!(config.notice_duration(), Duration::from_secs(4));
        assert_eq!(config.caption, "check out this qr code I generated");
        assert!(config.export_root().ends_with("qrshare"));
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse("quiet_period_ms = 250\nexport_dir = \"/tmp/qr\"\n").unwrap();
        assert_eq!(config.quiet_period_ms, 250);
        assert_eq!(config.image_width, 512);
        assert_eq!(config.export_root(), PathBuf::from("/tmp/qr"));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Config::parse("quiet_period_ms = 0").is_err());
        assert!(Config::parse("image_width = 0").is_err());
        assert!(Config::parse("quiet_period_ms = \"fast\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "image_height = -3").unwrap();
        match Config::load(&path) {
            Err(Error::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
