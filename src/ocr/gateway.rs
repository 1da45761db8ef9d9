//! Recognition gateway
//!
//! Owns the engine invocation and everything around it: assembling
//! fragment texts into one cleaned string, surfacing "no text" as a
//! result rather than an error, and the cooldown policy that throttles
//! interactive recognition frequency.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::GrayImage;
use parking_lot::Mutex;
use tracing::debug;

use super::{RecognitionEngine, TextFragment};
use crate::error::Result;

/// Result sentinel when the engine finds nothing; a result, not an
/// error
pub const NO_TEXT_SENTINEL: &str = "No text detected";

/// Outcome of a throttled recognition trigger
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// The engine ran; cleaned text (possibly the sentinel)
    Text(String),
    /// Suppressed by the cooldown policy; dropped silently
    CoolingDown,
}

pub struct RecognitionGateway {
    engine: Arc<dyn RecognitionEngine>,
    cooldown: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RecognitionGateway {
    pub fn new(engine: Arc<dyn RecognitionEngine>, cooldown_seconds: f64) -> Self {
        Self {
            engine,
            cooldown: Duration::from_secs_f64(cooldown_seconds.max(0.0)),
            last_dispatch: Mutex::new(None),
        }
    }

    /// Recognize unconditionally (service mode: every request is an
    /// explicit batch, never throttled).
    pub fn recognize(&self, image: &GrayImage) -> Result<String> {
        let fragments = self.engine.recognize(image)?;
        debug!(fragments = fragments.len(), "Recognition complete");
        Ok(assemble_text(&fragments))
    }

    /// Recognize subject to the cooldown policy (interactive mode).
    ///
    /// A trigger arriving less than the cooldown interval after the
    /// last successful dispatch is dropped; the caller keeps the stroke
    /// for display, it is simply not sent to the engine.
    pub fn recognize_throttled(&self, image: &GrayImage) -> Result<RecognitionOutcome> {
        {
            let last = self.last_dispatch.lock();
            if let Some(at) = *last {
                if at.elapsed() < self.cooldown {
                    debug!("Recognition suppressed by cooldown");
                    return Ok(RecognitionOutcome::CoolingDown);
                }
            }
        }

        let text = self.recognize(image)?;
        *self.last_dispatch.lock() = Some(Instant::now());
        Ok(RecognitionOutcome::Text(text))
    }
}

/// Join fragment strings in engine order with single spaces, collapse
/// whitespace runs, trim; empty becomes the sentinel.
fn assemble_text(fragments: &[TextFragment]) -> String {
    let joined = fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned = joined.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() {
        NO_TEXT_SENTINEL.to_string()
    } else {
        cleaned
    }
}
