use ::skrifa::{
    instance::{LocationRef, Size},
    outline::DrawSettings,
    raw::{FileRef, FontRef, TableProvider},
    string::StringId,
    GlyphId, MetadataProvider,
};
use std::path::Path;
use zeno::{Command, Mask};

use super::{codes, Engine, FontFace, LoadFlags, RenderMode, SharedFontData};
use crate::{
    error::{EngineError, OutlineError},
    pen::OutlineRecorder,
    raster::OwnedRaster,
    shape::{GlyphFormat, Outline},
};

/// Pure Rust engine: outlines from skrifa, scan conversion by zeno.
///
/// Only unhinted outlines are supported, and rendering is limited to the
/// anti-aliased and monochrome modes.
#[derive(Copy, Clone, Debug, Default)]
pub struct SkrifaEngine;

impl Engine for SkrifaEngine {
    type Face<'a>
        = SkrifaFace
    where
        Self: 'a;

    fn open_face<'a>(&'a self, path: &Path, index: usize) -> Result<SkrifaFace, EngineError> {
        let data = SharedFontData::open(path)?;
        let face_count = match FileRef::new(data.as_ref()) {
            Ok(FileRef::Font(_)) => 1,
            Ok(FileRef::Collection(collection)) => collection.len() as usize,
            Err(e) => {
                log::warn!("{}: {e}", path.display());
                return Err(EngineError::from_code(codes::UNKNOWN_FILE_FORMAT));
            }
        };
        if index >= face_count {
            return Err(EngineError::from_code(codes::INVALID_ARGUMENT));
        }
        let font = font_ref(&data, index)?;
        let glyph_count = font
            .maxp()
            .map(|maxp| maxp.num_glyphs() as u32)
            .unwrap_or_default();
        let name = |id| {
            font.localized_strings(id)
                .english_or_first()
                .map(|name| name.to_string())
        };
        let family_name = name(StringId::FAMILY_NAME);
        let style_name = name(StringId::SUBFAMILY_NAME);
        Ok(SkrifaFace {
            data,
            index,
            face_count,
            glyph_count,
            family_name,
            style_name,
            size: None,
            slot: GlyphSlot::default(),
        })
    }
}

pub struct SkrifaFace {
    data: SharedFontData,
    index: usize,
    face_count: usize,
    glyph_count: u32,
    family_name: Option<String>,
    style_name: Option<String>,
    /// Pixels per em, once set.
    size: Option<f32>,
    slot: GlyphSlot,
}

/// The most recently loaded glyph.
#[derive(Default)]
struct GlyphSlot {
    format: GlyphFormat,
    outline: Outline,
    path: Vec<Command>,
    bitmap: Option<OwnedRaster>,
}

impl FontFace for SkrifaFace {
    type Bitmap<'b>
        = &'b OwnedRaster
    where
        Self: 'b;

    fn family_name(&self) -> Option<String> {
        self.family_name.clone()
    }

    fn style_name(&self) -> Option<String> {
        self.style_name.clone()
    }

    fn face_count(&self) -> usize {
        self.face_count
    }

    fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    fn set_char_size(&mut self, ppem: u32) -> Result<(), EngineError> {
        if ppem == 0 {
            return Err(EngineError::from_code(codes::INVALID_PIXEL_SIZE));
        }
        self.size = Some(ppem as f32);
        Ok(())
    }

    fn load_glyph(&mut self, index: u32, flags: LoadFlags) -> Result<(), EngineError> {
        self.slot = GlyphSlot::default();
        // FreeType rejects indices past the last glyph as an invalid argument
        if index >= self.glyph_count {
            return Err(EngineError::from_code(codes::INVALID_ARGUMENT));
        }
        let font = font_ref(&self.data, self.index)?;
        let outlines = font.outline_glyphs();
        let glyph = outlines
            .get(GlyphId::new(index))
            .ok_or_else(|| EngineError::from_code(codes::INVALID_GLYPH_INDEX))?;
        let ppem = self.size.filter(|_| !flags.contains(LoadFlags::NO_SCALE));
        let (size, is_scaled) = match ppem {
            Some(ppem) => (Size::new(ppem), true),
            None => (Size::unscaled(), false),
        };
        let mut pen = OutlineRecorder::new(is_scaled);
        glyph
            .draw(DrawSettings::unhinted(size, LocationRef::default()), &mut pen)
            .map_err(|e| {
                log::warn!("glyph {index}: {e}");
                EngineError::from_code(codes::INVALID_OUTLINE)
            })?;
        let (outline, path) = pen.finish().map_err(|e| {
            log::warn!("glyph {index}: {e}");
            EngineError::from_code(codes::INVALID_OUTLINE)
        })?;
        self.slot = GlyphSlot {
            format: GlyphFormat::OUTLINE,
            outline,
            path,
            bitmap: None,
        };
        Ok(())
    }

    fn glyph_format(&self) -> GlyphFormat {
        self.slot.format
    }

    fn outline(&self) -> Result<Outline, OutlineError> {
        Ok(self.slot.outline.clone())
    }

    fn render_glyph(&mut self, mode: RenderMode) -> Result<(), EngineError> {
        if self.slot.format == GlyphFormat::BITMAP {
            return Ok(());
        }
        if self.slot.format != GlyphFormat::OUTLINE {
            return Err(EngineError::from_code(codes::INVALID_GLYPH_FORMAT));
        }
        let threshold = match mode {
            RenderMode::Normal | RenderMode::Light => false,
            RenderMode::Mono => true,
            RenderMode::Lcd | RenderMode::LcdV => {
                return Err(EngineError::from_code(codes::UNIMPLEMENTED_FEATURE))
            }
        };
        let mut bitmap = if self.slot.path.is_empty() {
            OwnedRaster::default()
        } else {
            let (data, placement) = Mask::new(self.slot.path.as_slice()).render();
            OwnedRaster::packed(data, placement.width as usize, placement.height as usize)
        };
        if threshold {
            // one bit coverage, expanded to one byte per pixel as 0 or 1
            for sample in &mut bitmap.data {
                *sample = u8::from(*sample >= 0x80);
            }
        }
        self.slot.format = GlyphFormat::BITMAP;
        self.slot.bitmap = Some(bitmap);
        Ok(())
    }

    fn convert_bitmap(&self) -> Result<&OwnedRaster, EngineError> {
        self.slot
            .bitmap
            .as_ref()
            .ok_or_else(|| EngineError::from_code(codes::INVALID_ARGUMENT))
    }
}

fn font_ref(data: &SharedFontData, index: usize) -> Result<FontRef<'_>, EngineError> {
    FontRef::from_index(data.as_ref(), index as u32).map_err(|e| {
        log::warn!("face {index}: {e}");
        EngineError::from_code(codes::INVALID_FILE_FORMAT)
    })
}
