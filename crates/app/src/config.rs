//! Configuration file support for PageSnap.
//!
//! Settings live in `~/.config/pagesnap/config.toml` (the platform config
//! directory on Windows). A missing file means defaults; command line flags
//! override whatever the file says.
//!
//! ```toml
//! [capture]
//! monitor = 0
//! pages = 120
//! delay_secs = 0.8
//! advance_key = "page-down"
//!
//! [output]
//! dir = "D:/scans"
//! keep_frames = true
//! ```

use crate::cli::Cli;
use anyhow::{Context, Result};
use capture::AdvanceKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_PAGES: u32 = 9999;
pub const MAX_DELAY_SECS: f64 = 5.0;
pub const MAX_START_DELAY_SECS: f64 = 60.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Monitor index, counting from 0
    pub monitor: usize,
    pub pages: u32,
    /// Wait after each page turn
    pub delay_secs: f64,
    pub advance_key: AdvanceKey,
    /// Wait before the first page
    pub start_delay_secs: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            monitor: 0,
            pages: 1,
            delay_secs: 0.5,
            advance_key: AdvanceKey::default(),
            start_delay_secs: 0.0,
        }
    }
}

impl CaptureConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs_f64(self.start_delay_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Parent of each run's page folder; the temp dir when unset
    pub dir: Option<PathBuf>,
    /// Exact page folder, overriding `dir`
    pub frames_dir: Option<PathBuf>,
    /// Keep page files after the run
    pub keep_frames: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            frames_dir: None,
            keep_frames: true,
        }
    }
}

impl OutputConfig {
    /// Page folder for a new run
    pub fn frames_dir(&self) -> PathBuf {
        if let Some(dir) = &self.frames_dir {
            return dir.clone();
        }
        self.dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
            .join(format!("pagesnap_{}", uuid::Uuid::new_v4()))
    }
}

impl Config {
    /// Path of the default config file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pagesnap");

        Ok(config_dir.join("config.toml"))
    }

    /// Load `path`, or the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            log::info!("Config file not found, using defaults");
            log::debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        log::info!("Loaded config from {}", config_path.display());
        log::debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Parse TOML text and clamp the values
    pub fn parse(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Command line flags win over the file
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(monitor) = cli.monitor {
            self.capture.monitor = monitor;
        }
        if let Some(pages) = cli.pages {
            self.capture.pages = pages;
        }
        if let Some(delay) = cli.delay {
            self.capture.delay_secs = delay;
        }
        if let Some(key) = cli.key {
            self.capture.advance_key = key;
        }
        if let Some(dir) = &cli.output {
            self.output.dir = Some(dir.clone());
        }
        self.validate_and_clamp();
    }

    fn validate_and_clamp(&mut self) {
        let capture = &mut self.capture;

        if !(1..=MAX_PAGES).contains(&capture.pages) {
            log::warn!(
                "Invalid pages {}, clamping to 1-{} range",
                capture.pages,
                MAX_PAGES
            );
            capture.pages = capture.pages.clamp(1, MAX_PAGES);
        }

        if !(0.0..=MAX_DELAY_SECS).contains(&capture.delay_secs) {
            log::warn!(
                "Invalid delay_secs {:.2}, clamping to 0.0-{:.1} range",
                capture.delay_secs,
                MAX_DELAY_SECS
            );
            capture.delay_secs = clamp_secs(capture.delay_secs, MAX_DELAY_SECS);
        }

        if !(0.0..=MAX_START_DELAY_SECS).contains(&capture.start_delay_secs) {
            log::warn!(
                "Invalid start_delay_secs {:.2}, clamping to 0.0-{:.1} range",
                capture.start_delay_secs,
                MAX_START_DELAY_SECS
            );
            capture.start_delay_secs = clamp_secs(capture.start_delay_secs, MAX_START_DELAY_SECS);
        }
    }
}

/// NaN falls to zero
fn clamp_secs(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}
