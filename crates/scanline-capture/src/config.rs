//! # Capture Configuration
//!
//! Configuration for the capture pipeline.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SCANLINE_FACING_MODE=environment                                   │
//! │     SCANLINE_JPEG_QUALITY=95                                           │
//! │                                                                         │
//! │  2. TOML Config File (capture.toml, path supplied by the host app)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     environment-facing camera, 1920x1080 capture, 1280x720 scan        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # capture.toml
//! [camera]
//! facing = "environment"
//! capture_width = 1920
//! capture_height = 1080
//! scan_width = 1280
//! scan_height = 720
//! frame_rate = 30
//!
//! [scan]
//! debounce_window_ms = 2000
//! cycle_interval_ms = 33
//! batch_size = 3
//! batch_spacing_ms = 150
//! jpeg_quality = 95
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use scanline_core::DEBOUNCE_WINDOW_MS;

use crate::error::{CaptureError, CaptureResult};

// =============================================================================
// Facing Mode
// =============================================================================

/// Which camera to prefer when several are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear-facing camera. The default for hand-held barcode scanning.
    #[default]
    Environment,

    /// Front-facing camera.
    User,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            other => Err(CaptureError::InvalidConfig(format!(
                "Unknown facing mode: '{}'. Valid options: environment, user",
                other
            ))),
        }
    }
}

// =============================================================================
// Camera Settings
// =============================================================================

/// Camera acquisition settings.
///
/// Two resolution profiles exist because the two capture strategies want
/// different things: the explicit-capture dialog maximizes detail for a
/// one-shot remote submission, while the continuous scanner favors a
/// lighter stream it can segment every cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Preferred camera facing mode.
    #[serde(default)]
    pub facing: FacingMode,

    /// Ideal width for explicit single/multi-frame capture.
    #[serde(default = "default_capture_width")]
    pub capture_width: u32,

    /// Ideal height for explicit single/multi-frame capture.
    #[serde(default = "default_capture_height")]
    pub capture_height: u32,

    /// Ideal width for the continuous scan loop.
    #[serde(default = "default_scan_width")]
    pub scan_width: u32,

    /// Ideal height for the continuous scan loop.
    #[serde(default = "default_scan_height")]
    pub scan_height: u32,

    /// Requested frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_capture_width() -> u32 {
    1920
}
fn default_capture_height() -> u32 {
    1080
}
fn default_scan_width() -> u32 {
    1280
}
fn default_scan_height() -> u32 {
    720
}
fn default_frame_rate() -> u32 {
    30
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            facing: FacingMode::default(),
            capture_width: default_capture_width(),
            capture_height: default_capture_height(),
            scan_width: default_scan_width(),
            scan_height: default_scan_height(),
            frame_rate: default_frame_rate(),
        }
    }
}

// =============================================================================
// Scan Settings
// =============================================================================

/// Scan behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Suppression window after an accepted detection (milliseconds).
    #[serde(default = "default_debounce_window")]
    pub debounce_window_ms: u64,

    /// Interval between continuous scan cycles (milliseconds).
    /// 33ms tracks a 30fps display refresh cadence.
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_ms: u64,

    /// Number of frames sampled per explicit multi-frame capture.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Spacing between sampled frames in a burst (milliseconds).
    #[serde(default = "default_batch_spacing")]
    pub batch_spacing_ms: u64,

    /// JPEG quality (1-100) for frames submitted to the detection service.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_debounce_window() -> u64 {
    DEBOUNCE_WINDOW_MS
}
fn default_cycle_interval() -> u64 {
    33
}
fn default_batch_size() -> usize {
    3
}
fn default_batch_spacing() -> u64 {
    150
}
fn default_jpeg_quality() -> u8 {
    95
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            debounce_window_ms: default_debounce_window(),
            cycle_interval_ms: default_cycle_interval(),
            batch_size: default_batch_size(),
            batch_spacing_ms: default_batch_spacing(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

// =============================================================================
// Main Capture Configuration
// =============================================================================

/// Complete capture pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera acquisition settings.
    #[serde(default)]
    pub camera: CameraSettings,

    /// Scan behavior settings.
    #[serde(default)]
    pub scan: ScanSettings,
}

impl CaptureConfig {
    /// Loads configuration from an optional file plus environment overrides.
    pub fn load(config_path: Option<PathBuf>) -> CaptureResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading capture config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if the load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load capture config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.camera.capture_width == 0
            || self.camera.capture_height == 0
            || self.camera.scan_width == 0
            || self.camera.scan_height == 0
        {
            return Err(CaptureError::InvalidConfig(
                "resolution dimensions must be greater than 0".into(),
            ));
        }

        if self.scan.batch_size == 0 {
            return Err(CaptureError::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if self.scan.jpeg_quality == 0 || self.scan.jpeg_quality > 100 {
            return Err(CaptureError::InvalidConfig(
                "jpeg_quality must be in 1..=100".into(),
            ));
        }

        if self.scan.debounce_window_ms == 0 {
            return Err(CaptureError::InvalidConfig(
                "debounce_window_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(facing) = std::env::var("SCANLINE_FACING_MODE") {
            match facing.parse() {
                Ok(parsed) => {
                    debug!(facing = %facing, "Overriding facing mode from environment");
                    self.camera.facing = parsed;
                }
                Err(_) => warn!(facing = %facing, "Unknown facing mode in environment"),
            }
        }

        if let Ok(quality) = std::env::var("SCANLINE_JPEG_QUALITY") {
            if let Ok(q) = quality.parse::<u8>() {
                self.scan.jpeg_quality = q;
            }
        }
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The debounce suppression window as a `Duration`.
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.scan.debounce_window_ms)
    }

    /// The continuous scan cycle interval as a `Duration`.
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.scan.cycle_interval_ms)
    }

    /// Spacing between frames in a capture burst as a `Duration`.
    pub fn batch_spacing(&self) -> Duration {
        Duration::from_millis(self.scan.batch_spacing_ms)
    }
}
