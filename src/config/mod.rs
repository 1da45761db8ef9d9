//! Application Configuration
//!
//! User settings stored in TOML format. Canvas geometry, enhancement
//! parameters and recognition settings are all explicit here rather
//! than scattered as constants; interactive and service deployments
//! use different canvas profiles.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Canvas profile for the interactive whiteboard (one gesture per
    /// recognition unit)
    pub interactive: CanvasProfile,
    /// Canvas profile for the HTTP service (full submitted batch per
    /// recognition unit)
    pub service: ServiceCanvas,
    /// Enhancement pipeline parameters
    pub enhance: EnhanceConfig,
    /// Recognition engine and gateway settings
    pub recognition: RecognitionConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// Geometry of a rasterization target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasProfile {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Margin kept clear of ink on every side, in pixels
    pub margin: f64,
    /// Number of drawing passes per segment (1 = single pass, 3 draws
    /// at vertical offsets -1/0/+1 to approximate a thicker stroke)
    pub line_passes: u32,
    /// Internal supersampling factor; >1 renders at a multiple of the
    /// target size and downsamples before handoff
    pub supersample: u32,
}

impl Default for CanvasProfile {
    fn default() -> Self {
        // Single-gesture canvas: small, with multi-pass smoothing
        Self {
            width: 200,
            height: 200,
            margin: 10.0,
            line_passes: 3,
            supersample: 1,
        }
    }
}

/// Service-mode canvas: rendered large, then supersampled down for
/// the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCanvas {
    /// Final raster size handed to the enhancement pipeline
    pub width: u32,
    pub height: u32,
    pub margin: f64,
    pub line_passes: u32,
    pub supersample: u32,
}

impl Default for ServiceCanvas {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            margin: 20.0,
            line_passes: 3,
            supersample: 2,
        }
    }
}

impl From<&ServiceCanvas> for CanvasProfile {
    fn from(c: &ServiceCanvas) -> Self {
        Self {
            width: c.width,
            height: c.height,
            margin: c.margin,
            line_passes: c.line_passes,
            supersample: c.supersample,
        }
    }
}

/// Enhancement pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Bilateral filter window size in pixels
    pub bilateral_window: u32,
    /// Bilateral filter intensity sigma
    pub bilateral_sigma_color: f32,
    /// Bilateral filter spatial sigma
    pub bilateral_sigma_spatial: f32,
    /// Median filter radius (impulse noise removal)
    pub median_radius: u32,
    /// CLAHE tile size in pixels
    pub clahe_tile_size: u32,
    /// CLAHE clip limit (bounds per-tile histogram stretch)
    pub clahe_clip_limit: f32,
    /// Adaptive threshold neighborhood radius
    pub threshold_block_radius: u32,
    /// Constant subtracted from the local mean before thresholding
    pub threshold_offset: i32,
    /// Detected skew below this magnitude (degrees) is treated as zero
    pub skew_deadband: f64,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            bilateral_window: 7,
            bilateral_sigma_color: 25.0,
            bilateral_sigma_spatial: 5.0,
            median_radius: 1,
            clahe_tile_size: 32,
            clahe_clip_limit: 2.0,
            threshold_block_radius: 5,
            threshold_offset: 2,
            skew_deadband: 0.5,
        }
    }
}

/// Recognition engine and gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Engine language set (Tesseract language code)
    pub language: String,
    /// Character allowlist handed to the engine
    pub allowlist: String,
    /// Tessdata directory; `None` uses the engine's default search path
    pub datapath: Option<String>,
    /// Minimum interval between recognition dispatches in interactive
    /// mode, in seconds
    pub cooldown_seconds: f64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            allowlist:
                "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,!?-() "
                    .to_string(),
            datapath: None,
            cooldown_seconds: 1.0,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Get the configuration directory
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "cashea", "Inkboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.interactive.width, 200);
        assert_eq!(config.interactive.height, 200);
        assert_eq!(config.interactive.line_passes, 3);

        assert_eq!(config.service.width, 400);
        assert_eq!(config.service.height, 300);
        assert_eq!(config.service.supersample, 2);

        assert_eq!(config.recognition.language, "eng");
        assert!((config.recognition.cooldown_seconds - 1.0).abs() < 1e-9);
        assert!(config.recognition.allowlist.contains("0123456789"));

        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.interactive.width, config.interactive.width);
        assert_eq!(parsed.enhance.clahe_tile_size, config.enhance.clahe_tile_size);
        assert_eq!(parsed.recognition.allowlist, config.recognition.allowlist);
        assert_eq!(parsed.server.port, config.server.port);
    }

    #[test]
    fn test_service_canvas_to_profile() {
        let config = AppConfig::default();
        let profile = CanvasProfile::from(&config.service);
        assert_eq!(profile.width, 400);
        assert_eq!(profile.supersample, 2);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.server.port = 8099;
        config.recognition.cooldown_seconds = 2.5;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.server.port, 8099);
        assert!((loaded.recognition.cooldown_seconds - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
