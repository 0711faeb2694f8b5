//! Edge sharpness of a rasterized glyph.
//!
//! Acutance along an axis is the ratio of the summed magnitude of the second
//! derivative of pixel intensity to that of the first derivative. Crisp edges
//! concentrate the intensity change in few pixels and score high; blurry ones
//! spread it out and score low.

use std::fmt;

use crate::raster::RasterBuffer;

/// Horizontal and vertical acutance of a raster.
///
/// An axis is `None` when its total slope is zero, i.e. the raster is flat
/// or empty.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Acutance {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Acutance {
    pub fn analyze(raster: &RasterBuffer) -> Self {
        let mut x = Sums::default();
        for row in 0..raster.rows() {
            x.scanline(raster.row(row).iter().copied());
        }
        let mut y = Sums::default();
        for column in 0..raster.width() {
            y.scanline(raster.column(column));
        }
        Self {
            x: x.ratio(),
            y: y.ratio(),
        }
    }
}

impl fmt::Display for Acutance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in [self.x, self.y] {
            match axis {
                Some(value) => write!(f, "{value:.4} ")?,
                None => f.write_str("  void ")?,
            }
        }
        Ok(())
    }
}

/// Running sums for one axis.
#[derive(Default)]
struct Sums {
    /// first derivative
    s1: u64,
    /// second derivative
    s2: u64,
}

impl Sums {
    // `d1` first absorbs the negated sample and is then reset to the raw
    // sample; each line is closed by one extra step that flushes the final
    // pixel. Existing reports depend on this exact order.
    fn scanline(&mut self, samples: impl Iterator<Item = u8>) {
        let mut d0: i64 = 0;
        let mut d1: i64 = 0;
        for b in samples {
            let b = b as i64;
            d1 -= b;
            self.s2 += d1.abs_diff(d0);
            self.s1 += d1.unsigned_abs();
            d0 = d1;
            d1 = b;
        }
        self.s2 += d1.abs_diff(d0);
        self.s2 += d1 as u64;
        self.s1 += d1 as u64;
    }

    fn ratio(&self) -> Option<f64> {
        (self.s1 != 0).then(|| self.s2 as f64 / self.s1 as f64)
    }
}
