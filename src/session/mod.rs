//! Interactive whiteboard session
//!
//! Single-writer cooperative state machine driven by a drawing-surface
//! collaborator: pointer-down begins a stroke, pointer-move appends
//! points, pointer-up finalizes the stroke and synchronously runs the
//! recognition pipeline before the loop resumes. The cooldown policy
//! in the gateway throttles recognition frequency, not concurrency.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::annotations::AnnotationStore;
use crate::config::CanvasProfile;
use crate::error::Error;
use crate::ink::{Point, Stroke, StrokeSet};
use crate::ocr::{RecognitionOutcome, NO_TEXT_SENTINEL};
use crate::pipeline::RecognitionPipeline;

/// What happened to a completed gesture
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeOutcome {
    /// Text recognized and an annotation appended
    Recognized(String),
    /// The engine ran but found no text
    NothingDetected,
    /// Dropped silently by the cooldown policy; the stroke is kept for
    /// display
    Suppressed,
    /// Degenerate geometry; nothing to rasterize
    NoImage,
    /// Engine invocation failed; the stroke is kept, no annotation
    RecognitionFailed(String),
}

pub struct Whiteboard {
    pipeline: Arc<RecognitionPipeline>,
    annotations: AnnotationStore,
    profile: CanvasProfile,
    /// Completed strokes, kept for the rendering collaborator
    strokes: Vec<Stroke>,
    /// In-flight stroke buffer between pointer-down and pointer-up
    current: Option<Stroke>,
}

impl Whiteboard {
    pub fn new(pipeline: Arc<RecognitionPipeline>, profile: CanvasProfile) -> Self {
        Self {
            pipeline,
            annotations: AnnotationStore::new(),
            profile,
            strokes: Vec::new(),
            current: None,
        }
    }

    /// Begin a new stroke at the pointer position.
    pub fn pen_down(&mut self, point: Point) {
        let mut stroke = Stroke::default();
        stroke.push(point);
        self.current = Some(stroke);
    }

    /// Append a pointer sample to the in-flight stroke.
    pub fn pen_move(&mut self, point: Point) {
        if let Some(stroke) = self.current.as_mut() {
            stroke.push(point);
        }
    }

    /// Finalize the in-flight stroke and run the pipeline on it.
    ///
    /// The completed stroke is always kept for display, whatever the
    /// recognition outcome. Errors never escape: engine failures are
    /// reported in the outcome.
    pub fn pen_up(&mut self) -> StrokeOutcome {
        let Some(stroke) = self.current.take() else {
            return StrokeOutcome::NoImage;
        };

        let set = StrokeSet::new(vec![stroke.clone()]);
        self.strokes.push(stroke);

        let outcome = match self.pipeline.recognize_throttled(&set, &self.profile) {
            Ok(RecognitionOutcome::Text(text)) => {
                if text == NO_TEXT_SENTINEL {
                    StrokeOutcome::NothingDetected
                } else {
                    // Anchor at the gesture centroid in input space
                    if let Some(anchor) = set.centroid() {
                        self.annotations.append(&text, anchor);
                    }
                    StrokeOutcome::Recognized(text)
                }
            }
            Ok(RecognitionOutcome::CoolingDown) => StrokeOutcome::Suppressed,
            Err(Error::NoImage(reason)) => {
                debug!(%reason, "Gesture produced no image");
                StrokeOutcome::NoImage
            }
            Err(e) => {
                warn!(error = %e, "Recognition failed for gesture");
                StrokeOutcome::RecognitionFailed(e.to_string())
            }
        };

        debug!(?outcome, strokes = self.strokes.len(), "Gesture finalized");
        outcome
    }

    /// Drop every annotation, all completed strokes and the in-flight
    /// stroke buffer. No partial-clear state is observable afterwards.
    pub fn clear(&mut self) {
        self.current = None;
        self.strokes.clear();
        self.annotations.clear();
        info!("Whiteboard cleared");
    }

    /// Completed strokes for display
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The stroke currently being drawn, if any
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }
}
