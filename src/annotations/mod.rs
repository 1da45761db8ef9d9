//! Annotation store
//!
//! Recognized-text labels with the anchor position they should be
//! rendered at, in original input coordinates. Append-only: an
//! annotation is never edited after creation, and the only removal is
//! a wholesale clear.

use parking_lot::RwLock;
use serde::Serialize;

use crate::ink::Point;

const DEFAULT_COLOR: [u8; 3] = [0, 0, 0];

/// A recognized-text label anchored near the ink that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    /// StrokeSet centroid in the original input coordinate space
    pub anchor: Point,
    pub color: [u8; 3],
}

/// Append-only annotation collection shared with the rendering
/// collaborator
#[derive(Debug, Default)]
pub struct AnnotationStore {
    inner: RwLock<Vec<Annotation>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label. Blank text is rejected; nothing is stored and
    /// `false` is returned.
    pub fn append(&self, text: &str, anchor: Point) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.inner.write().push(Annotation {
            text: text.to_string(),
            anchor,
            color: DEFAULT_COLOR,
        });
        true
    }

    /// Snapshot of all annotations in append order
    pub fn annotations(&self) -> Vec<Annotation> {
        self.inner.read().clone()
    }

    /// Remove every annotation. Readers observe either the full list
    /// or an empty one, never a partial clear.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
