//! Grayscale raster buffers.

use crate::error::RasterError;

/// A borrowed 8-bit grayscale raster with top-to-bottom rows.
///
/// Rows are `pitch` bytes apart. The pitch may exceed the width, in which
/// case the trailing bytes of each row are padding.
#[derive(Copy, Clone, Debug)]
pub struct RasterBuffer<'a> {
    data: &'a [u8],
    width: usize,
    rows: usize,
    pitch: usize,
}

impl<'a> RasterBuffer<'a> {
    pub fn new(
        data: &'a [u8],
        width: usize,
        rows: usize,
        pitch: usize,
    ) -> Result<Self, RasterError> {
        if pitch < width {
            return Err(RasterError::PitchTooSmall { width, pitch });
        }
        let needed = rows
            .checked_mul(pitch)
            .ok_or(RasterError::TooLarge { rows, pitch })?;
        if data.len() < needed {
            return Err(RasterError::BufferTooShort {
                rows,
                pitch,
                needed,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            rows,
            pitch,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// The `rows * pitch` bytes covered by the raster, padding included.
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[..self.rows * self.pitch]
    }

    /// Returns the samples of row `y`, without padding.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.pitch;
        &self.data[start..start + self.width]
    }

    /// Returns an iterator over the samples of column `x`, top to bottom.
    pub fn column(&self, x: usize) -> impl Iterator<Item = u8> + 'a {
        let data = self.data;
        let pitch = self.pitch;
        (0..self.rows).map(move |y| data[x + y * pitch])
    }
}

/// An owned raster, as produced by engines that rasterize into memory they
/// allocate themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnedRaster {
    pub data: Vec<u8>,
    pub width: usize,
    pub rows: usize,
    pub pitch: usize,
}

impl OwnedRaster {
    /// Creates a raster whose pitch equals its width.
    pub fn packed(data: Vec<u8>, width: usize, rows: usize) -> Self {
        Self {
            data,
            width,
            rows,
            pitch: width,
        }
    }

    pub fn as_buffer(&self) -> Result<RasterBuffer<'_>, RasterError> {
        RasterBuffer::new(&self.data, self.width, self.rows, self.pitch)
    }
}
