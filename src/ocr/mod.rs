//! OCR engine boundary
//!
//! The engine is a black-box capability: given a raster image it
//! returns zero or more recognized fragments. It is loaded once at
//! startup as a process-wide read-only resource and injected into the
//! recognition gateway, so tests can substitute a double.

pub mod gateway;
pub mod tesseract;

pub use gateway::{RecognitionGateway, RecognitionOutcome, NO_TEXT_SENTINEL};
pub use tesseract::TesseractEngine;

use image::GrayImage;

use crate::config::RecognitionConfig;
use crate::error::Result;

/// Fixed parameter profile an engine is constructed with; every
/// invocation uses the same settings
#[derive(Debug, Clone)]
pub struct EngineProfile {
    /// Engine language set
    pub language: String,
    /// Supported alphabet/digits/basic punctuation
    pub allowlist: String,
    /// Engine data directory override
    pub datapath: Option<String>,
}

impl From<&RecognitionConfig> for EngineProfile {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            language: config.language.clone(),
            allowlist: config.allowlist.clone(),
            datapath: config.datapath.clone(),
        }
    }
}

/// One recognized fragment in engine reading order
#[derive(Debug, Clone)]
pub struct TextFragment {
    /// Recognized text content
    pub text: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Bounding box (x, y, width, height) in raster coordinates
    pub region: (u32, u32, u32, u32),
}

/// Black-box recognition capability.
///
/// Implementations must tolerate concurrent read-only use; service
/// mode shares one engine across requests.
pub trait RecognitionEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<TextFragment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_config() {
        let config = RecognitionConfig::default();
        let profile = EngineProfile::from(&config);

        assert_eq!(profile.language, "eng");
        assert!(profile.allowlist.contains(".,!?-()"));
        assert!(profile.datapath.is_none());
    }
}
