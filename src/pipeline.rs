//! End-to-end recognition pipeline
//!
//! Wires the stages together: normalize stroke geometry, rasterize,
//! estimate skew, enhance, then hand the image to the recognition
//! gateway. One instance is shared process-wide; the engine behind it
//! is read-only after initialization, so concurrent use needs no
//! locking beyond the gateway's cooldown cell.

use std::sync::Arc;
use std::time::Instant;

use image::GrayImage;
use tracing::debug;

use crate::config::{AppConfig, CanvasProfile, EnhanceConfig};
use crate::enhance;
use crate::error::{Error, Result};
use crate::ink::StrokeSet;
use crate::ocr::{RecognitionEngine, RecognitionGateway, RecognitionOutcome};
use crate::raster;

pub struct RecognitionPipeline {
    gateway: RecognitionGateway,
    enhance_config: EnhanceConfig,
}

impl RecognitionPipeline {
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: &AppConfig) -> Self {
        Self {
            gateway: RecognitionGateway::new(engine, config.recognition.cooldown_seconds),
            enhance_config: config.enhance.clone(),
        }
    }

    /// Run the full pipeline over a stroke batch (service mode; never
    /// throttled). Returns the cleaned text, possibly the no-text
    /// sentinel.
    pub fn recognize(&self, strokes: &StrokeSet, profile: &CanvasProfile) -> Result<String> {
        let image = self.prepare(strokes, profile)?;
        self.gateway.recognize(&image)
    }

    /// Run the full pipeline subject to the gateway cooldown
    /// (interactive mode, once per completed gesture).
    pub fn recognize_throttled(
        &self,
        strokes: &StrokeSet,
        profile: &CanvasProfile,
    ) -> Result<RecognitionOutcome> {
        let image = self.prepare(strokes, profile)?;
        self.gateway.recognize_throttled(&image)
    }

    /// Normalize, rasterize, estimate skew and enhance.
    fn prepare(&self, strokes: &StrokeSet, profile: &CanvasProfile) -> Result<GrayImage> {
        let start = Instant::now();

        let normalized = strokes
            .normalize(profile)
            .ok_or_else(|| Error::NoImage("stroke set has no drawable geometry".to_string()))?;

        let rastered = raster::rasterize(&normalized, profile);
        let angle = enhance::estimate_skew(&rastered, self.enhance_config.skew_deadband);
        let image = enhance::enhance(rastered, angle, &self.enhance_config);

        debug!(
            strokes = strokes.strokes().len(),
            skew = angle,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline image prepared"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::{Point, Stroke};
    use crate::ocr::{TextFragment, NO_TEXT_SENTINEL};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEngine {
        text: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedEngine {
        fn saying(text: &'static str) -> Self {
            Self {
                text: Some(text),
                calls: AtomicUsize::new(0),
            }
        }

        fn silent() -> Self {
            Self {
                text: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RecognitionEngine for FixedEngine {
        fn recognize(&self, _image: &GrayImage) -> Result<Vec<TextFragment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .text
                .map(|t| {
                    vec![TextFragment {
                        text: t.to_string(),
                        confidence: 0.8,
                        region: (0, 0, 5, 5),
                    }]
                })
                .unwrap_or_default())
        }
    }

    fn triangle() -> StrokeSet {
        StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 0.0),
        ])])
    }

    fn pipeline(engine: Arc<dyn RecognitionEngine>) -> RecognitionPipeline {
        RecognitionPipeline::new(engine, &AppConfig::default())
    }

    #[test]
    fn test_recognize_returns_engine_text() {
        let p = pipeline(Arc::new(FixedEngine::saying("abc")));
        let profile = CanvasProfile::default();

        assert_eq!(p.recognize(&triangle(), &profile).unwrap(), "abc");
    }

    #[test]
    fn test_recognize_silent_engine_yields_sentinel() {
        let p = pipeline(Arc::new(FixedEngine::silent()));
        let profile = CanvasProfile::default();

        assert_eq!(
            p.recognize(&triangle(), &profile).unwrap(),
            NO_TEXT_SENTINEL
        );
    }

    #[test]
    fn test_empty_strokes_is_no_image() {
        let p = pipeline(Arc::new(FixedEngine::saying("abc")));
        let err = p
            .recognize(&StrokeSet::default(), &CanvasProfile::default())
            .unwrap_err();
        assert_eq!(err.category(), "no_image");
    }

    #[test]
    fn test_single_point_is_no_image() {
        let p = pipeline(Arc::new(FixedEngine::saying("abc")));
        let set = StrokeSet::new(vec![Stroke::new(vec![Point::new(3.0, 3.0)])]);
        let err = p.recognize(&set, &CanvasProfile::default()).unwrap_err();
        assert_eq!(err.category(), "no_image");
    }

    #[test]
    fn test_throttled_second_gesture_suppressed() {
        let engine = Arc::new(FixedEngine::saying("hi"));
        let p = pipeline(engine.clone());
        let profile = CanvasProfile::default();

        let first = p.recognize_throttled(&triangle(), &profile).unwrap();
        assert_eq!(first, RecognitionOutcome::Text("hi".to_string()));

        let second = p.recognize_throttled(&triangle(), &profile).unwrap();
        assert_eq!(second, RecognitionOutcome::CoolingDown);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_service_profile_runs_end_to_end() {
        let p = pipeline(Arc::new(FixedEngine::saying("batch")));
        let profile = CanvasProfile::from(&AppConfig::default().service);

        assert_eq!(p.recognize(&triangle(), &profile).unwrap(), "batch");
    }
}
