//! Tesseract-backed recognition engine
//!
//! Each invocation builds a fresh `LepTess` handle from the fixed
//! profile, so the engine value itself stays read-only and safe to
//! share across concurrent requests.

use std::io::Cursor;

use image::{GrayImage, ImageFormat};
use leptess::{LepTess, Variable};
use tracing::debug;

use super::{EngineProfile, RecognitionEngine, TextFragment};
use crate::error::{Error, Result};

pub struct TesseractEngine {
    profile: EngineProfile,
}

impl TesseractEngine {
    /// Create the engine, probing Tesseract initialization up front so
    /// a missing language pack fails at startup rather than on the
    /// first request.
    pub fn new(profile: EngineProfile) -> Result<Self> {
        Self::handle(&profile)?;
        debug!(language = %profile.language, "Tesseract engine initialized");
        Ok(Self { profile })
    }

    fn handle(profile: &EngineProfile) -> Result<LepTess> {
        let mut lt = LepTess::new(profile.datapath.as_deref(), &profile.language)
            .map_err(|e| Error::EngineInit(e.to_string()))?;
        lt.set_variable(Variable::TesseditCharWhitelist, &profile.allowlist)
            .map_err(|e| Error::EngineInit(e.to_string()))?;
        Ok(lt)
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<TextFragment>> {
        let mut lt =
            Self::handle(&self.profile).map_err(|e| Error::Recognition(e.to_string()))?;

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        lt.set_image_from_mem(&png)
            .map_err(|e| Error::Recognition(e.to_string()))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| Error::Recognition(e.to_string()))?;
        let confidence = (lt.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);

        let words: Vec<&str> = text.split_ascii_whitespace().collect();
        let Some(boxes) =
            lt.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true)
        else {
            return Ok(vec![]);
        };

        let fragments: Vec<TextFragment> = std::iter::zip((&boxes).into_iter(), words)
            .map(|(bx, word)| {
                let geom = bx.get_geometry();
                TextFragment {
                    text: word.to_string(),
                    confidence,
                    region: (
                        geom.x.max(0) as u32,
                        geom.y.max(0) as u32,
                        geom.w.max(0) as u32,
                        geom.h.max(0) as u32,
                    ),
                }
            })
            .collect();

        debug!(fragments = fragments.len(), confidence, "Tesseract pass complete");
        Ok(fragments)
    }
}
