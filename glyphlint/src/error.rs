//! Error types.

use std::fmt;

use thiserror::Error;

/// A failure reported by the font engine.
///
/// These are never fatal for a run: the affected glyph, face or archive is
/// reported and skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineError {
    /// Numeric error code, using FreeType's error table.
    pub code: i32,
    /// Human readable description of the code.
    pub description: String,
}

impl EngineError {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error = 0x{:04x}, {}", self.code, self.description)
    }
}

impl std::error::Error for EngineError {}

/// Errors constructing a [`RasterBuffer`](crate::RasterBuffer).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("pitch {pitch} is smaller than width {width}")]
    PitchTooSmall { width: usize, pitch: usize },

    #[error("{rows} rows with pitch {pitch} exceed the address space")]
    TooLarge { rows: usize, pitch: usize },

    #[error("{rows} rows with pitch {pitch} need {needed} bytes, buffer has {len}")]
    BufferTooShort {
        rows: usize,
        pitch: usize,
        needed: usize,
        len: usize,
    },
}

/// Errors constructing an [`Outline`](crate::Outline).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("contour end {end} does not follow previous end {previous}")]
    UnorderedContour { previous: usize, end: usize },

    #[error("contours end at point {last:?} but the outline has {points} points")]
    PartialCover { last: Option<usize>, points: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("invalid raster: {0}")]
    Raster(#[from] RasterError),

    #[error("invalid outline: {0}")]
    Outline(#[from] OutlineError),

    #[error("error writing report: {0}")]
    Io(#[from] std::io::Error),
}
