//! Inkboard - handwriting whiteboard recognition
//!
//! Converts freehand pen strokes into a raster image, runs a
//! multi-stage enhancement pipeline over it and hands the result to an
//! OCR engine. Ships two deployment shapes: an embeddable interactive
//! whiteboard session and a JSON HTTP service.

pub mod annotations;
pub mod config;
pub mod enhance;
pub mod error;
pub mod ink;
pub mod ocr;
pub mod pipeline;
pub mod raster;
pub mod server;
pub mod session;
