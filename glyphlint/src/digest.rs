//! Content checksum of a rasterized glyph.

use std::fmt;

use md5::{Digest, Md5};

use crate::raster::RasterBuffer;

/// MD5 of the raw bytes of a raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentDigest(pub [u8; 16]);

impl ContentDigest {
    /// Hashes `rows * pitch` bytes, row padding included, so the digest also
    /// reflects the engine's stride layout.
    pub fn compute(raster: &RasterBuffer) -> Self {
        Self::of_bytes(raster.bytes())
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
