use freetype::{freetype_sys as ffi, Library};

use std::{
    ffi::{c_char, c_uint, CStr},
    path::Path,
    ptr, slice,
};

use super::{codes, Bitmap, Engine, FontFace, LoadFlags, RenderMode, SharedFontData};
use crate::{
    error::{EngineError, OutlineError, RasterError},
    raster::RasterBuffer,
    shape::{GlyphFormat, Outline, Point},
};

// Not bound by freetype-sys. `FT_Render_Glyph` is declared here as well so
// the render mode can be passed as its plain integer value.
extern "C" {
    fn FT_Bitmap_Convert(
        library: ffi::FT_Library,
        source: *const ffi::FT_Bitmap,
        target: *mut ffi::FT_Bitmap,
        alignment: ffi::FT_Int,
    ) -> ffi::FT_Error;

    fn FT_Bitmap_Done(library: ffi::FT_Library, bitmap: *mut ffi::FT_Bitmap) -> ffi::FT_Error;

    fn FT_Render_Glyph(slot: ffi::FT_GlyphSlot, render_mode: c_uint) -> ffi::FT_Error;
}

/// The FreeType library.
///
/// Faces are driven through the C API directly so that error codes and load
/// flags pass through unchanged.
pub struct FreeTypeEngine {
    library: Library,
}

impl FreeTypeEngine {
    pub fn new() -> Result<Self, EngineError> {
        let library = Library::init().map_err(|e| {
            log::error!("FreeType: {e}");
            EngineError::from_code(e as i32)
        })?;
        Ok(Self { library })
    }
}

impl Engine for FreeTypeEngine {
    type Face<'a>
        = FreeTypeFace<'a>
    where
        Self: 'a;

    fn open_face<'a>(
        &'a self,
        path: &Path,
        index: usize,
    ) -> Result<FreeTypeFace<'a>, EngineError> {
        let data = SharedFontData::open(path)?;
        let bytes: &[u8] = data.as_ref();
        let face_index = ffi::FT_Long::try_from(index)
            .map_err(|_| EngineError::from_code(codes::INVALID_ARGUMENT))?;
        let size = ffi::FT_Long::try_from(bytes.len())
            .map_err(|_| EngineError::from_code(codes::INVALID_FILE_FORMAT))?;
        let mut face: ffi::FT_Face = ptr::null_mut();
        // SAFETY: the font bytes are kept alive by `data`, which the face
        // owns and outlives the FreeType face object (see `Drop`)
        check(unsafe {
            ffi::FT_New_Memory_Face(
                self.library.raw(),
                bytes.as_ptr(),
                size,
                face_index,
                &mut face,
            )
        })?;
        Ok(FreeTypeFace {
            library: &self.library,
            face,
            _data: data,
        })
    }
}

pub struct FreeTypeFace<'a> {
    library: &'a Library,
    face: ffi::FT_Face,
    _data: SharedFontData,
}

impl FreeTypeFace<'_> {
    fn raw(&self) -> &ffi::FT_FaceRec {
        // SAFETY: `face` is a valid face from FT_New_Memory_Face until drop
        unsafe { &*self.face }
    }

    fn slot(&self) -> &ffi::FT_GlyphSlotRec {
        // SAFETY: every face owns a glyph slot for its whole lifetime
        unsafe { &*self.raw().glyph }
    }
}

impl FontFace for FreeTypeFace<'_> {
    type Bitmap<'b>
        = ConvertedBitmap<'b>
    where
        Self: 'b;

    fn family_name(&self) -> Option<String> {
        c_string(self.raw().family_name)
    }

    fn style_name(&self) -> Option<String> {
        c_string(self.raw().style_name)
    }

    fn face_count(&self) -> usize {
        usize::try_from(self.raw().num_faces).unwrap_or(0)
    }

    fn glyph_count(&self) -> u32 {
        u32::try_from(self.raw().num_glyphs).unwrap_or(0)
    }

    fn set_char_size(&mut self, ppem: u32) -> Result<(), EngineError> {
        // 26.6 fixed point
        let size = ppem
            .checked_mul(64)
            .and_then(|size| ffi::FT_F26Dot6::try_from(size).ok())
            .ok_or_else(|| EngineError::from_code(codes::INVALID_PIXEL_SIZE))?;
        // SAFETY: `face` is valid and exclusively borrowed
        check(unsafe { ffi::FT_Set_Char_Size(self.face, size, size, 72, 72) })
    }

    fn load_glyph(&mut self, index: u32, flags: LoadFlags) -> Result<(), EngineError> {
        // SAFETY: as above; unknown flag bits are FreeType's to reject
        check(unsafe { ffi::FT_Load_Glyph(self.face, index, flags.bits()) })
    }

    fn glyph_format(&self) -> GlyphFormat {
        GlyphFormat(self.slot().format as u32)
    }

    fn outline(&self) -> Result<Outline, OutlineError> {
        let outline = &self.slot().outline;
        let n_points = usize::try_from(outline.n_points).unwrap_or(0);
        let n_contours = usize::try_from(outline.n_contours).unwrap_or(0);
        let points = if n_points == 0 || outline.points.is_null() {
            &[][..]
        } else {
            // SAFETY: FreeType guarantees `points` holds `n_points` entries
            // while the glyph stays loaded, and the slot is borrowed here
            unsafe { slice::from_raw_parts(outline.points, n_points) }
        };
        let contours = if n_contours == 0 || outline.contours.is_null() {
            &[][..]
        } else {
            // SAFETY: as above, with `n_contours` entries
            unsafe { slice::from_raw_parts(outline.contours, n_contours) }
        };
        Outline::new(
            points
                .iter()
                .map(|p| Point::new(p.x as i64, p.y as i64))
                .collect(),
            contours.iter().map(|&end| end as usize).collect(),
        )
    }

    fn render_glyph(&mut self, mode: RenderMode) -> Result<(), EngineError> {
        // FT_RENDER_MODE_XXX
        let mode: c_uint = match mode {
            RenderMode::Normal => 0,
            RenderMode::Light => 1,
            RenderMode::Mono => 2,
            RenderMode::Lcd => 3,
            RenderMode::LcdV => 4,
        };
        // SAFETY: the slot belongs to the exclusively borrowed face
        check(unsafe { FT_Render_Glyph(self.raw().glyph, mode) })
    }

    fn convert_bitmap(&self) -> Result<ConvertedBitmap<'_>, EngineError> {
        let mut converted = ConvertedBitmap {
            library: self.library,
            // SAFETY: an all zero FT_Bitmap is the documented initial state
            // (this is all FT_Bitmap_Init does)
            bitmap: unsafe { std::mem::zeroed() },
        };
        let source: *const ffi::FT_Bitmap = &self.slot().bitmap;
        // SAFETY: both bitmaps are valid for the duration of the call and
        // the target is released with the same library in `Drop`
        check(unsafe {
            FT_Bitmap_Convert(self.library.raw(), source, &mut converted.bitmap, 1)
        })?;
        Ok(converted)
    }
}

impl Drop for FreeTypeFace<'_> {
    fn drop(&mut self) {
        // SAFETY: the face was created by FT_New_Memory_Face and is released
        // exactly once, before the font data it points into
        unsafe {
            ffi::FT_Done_Face(self.face);
        }
    }
}

/// A bitmap converted to one byte per pixel, owned by FreeType.
pub struct ConvertedBitmap<'a> {
    library: &'a Library,
    bitmap: ffi::FT_Bitmap,
}

impl Bitmap for ConvertedBitmap<'_> {
    fn raster(&self) -> Result<RasterBuffer<'_>, RasterError> {
        let width = self.bitmap.width as usize;
        let rows = self.bitmap.rows as usize;
        // conversion always yields a positive pitch; anything else is
        // rejected by the pitch check
        let pitch = usize::try_from(self.bitmap.pitch).unwrap_or(0);
        let len = rows
            .checked_mul(pitch)
            .ok_or(RasterError::TooLarge { rows, pitch })?;
        let data = if len == 0 || self.bitmap.buffer.is_null() {
            &[][..]
        } else {
            // SAFETY: a converted bitmap owns `rows * pitch` bytes
            unsafe { slice::from_raw_parts(self.bitmap.buffer, len) }
        };
        RasterBuffer::new(data, width, rows, pitch)
    }
}

impl Drop for ConvertedBitmap<'_> {
    fn drop(&mut self) {
        // SAFETY: the bitmap was initialized by FT_Bitmap_Convert with this
        // library, or is still all zero which FT_Bitmap_Done accepts
        unsafe {
            FT_Bitmap_Done(self.library.raw(), &mut self.bitmap);
        }
    }
}

/// Maps a raw FreeType error code, keeping FreeType's own message.
fn check(error: ffi::FT_Error) -> Result<(), EngineError> {
    if error == 0 {
        Ok(())
    } else {
        Err(EngineError::from_code(error))
    }
}

fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: FreeType names are NUL terminated and live as long as the face
    let name = unsafe { CStr::from_ptr(ptr) };
    Some(name.to_string_lossy().into_owned())
}
