//! Error taxonomy for the recognition pipeline
//!
//! Input errors are rejected before rasterization, engine failures are
//! surfaced as recognition errors, and enhancement stage failures never
//! reach here (the pipeline driver falls back stage-by-stage instead).

use thiserror::Error;

/// Errors surfaced by the recognition pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Input geometry cannot produce an image (empty stroke set,
    /// degenerate bounding box)
    #[error("no image: {0}")]
    NoImage(String),

    /// The OCR engine failed while recognizing an image
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// The OCR engine could not be initialized at startup
    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    /// A raster buffer could not be encoded for the engine
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl Error {
    /// Machine-readable error category for the wire contract
    pub fn category(&self) -> &'static str {
        match self {
            Error::NoImage(_) => "no_image",
            Error::Recognition(_) => "recognition",
            Error::EngineInit(_) => "engine_init",
            Error::Encode(_) => "encode",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::NoImage("empty".into()).category(), "no_image");
        assert_eq!(Error::Recognition("timeout".into()).category(), "recognition");
        assert_eq!(Error::EngineInit("missing tessdata".into()).category(), "engine_init");
    }

    #[test]
    fn test_error_display() {
        let err = Error::NoImage("stroke set is empty".into());
        assert_eq!(err.to_string(), "no image: stroke set is empty");
    }
}
