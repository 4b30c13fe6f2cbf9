//! Packed bitmap font atlas index.
//!
//! The atlas is a fixed grid: 100 cells per row, 9x9 pixel cells, 1 pixel
//! margin and gap. A character's position in the ordered charset string is
//! its cell index. Narrow (ASCII) glyphs occupy a 4 pixel wide sub-rect of
//! their cell so they advance compactly; wide glyphs use the full cell.
//! Rect Y is expressed from the texture's bottom edge, the convention of
//! the host's sprite constructor.
//!
//! Misses are never fatal: an unmapped character, an ancient-script
//! request, or an out-of-bounds rect all report `None` and the caller lets
//! the host's own font draw the glyph.

use crate::assets;
use crate::text::width::{ScriptMode, is_wide};
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::error::Error;
use std::path::Path;

pub const CHARS_PER_ROW: usize = 100;
pub const CELL_SIZE: u32 = 9;
pub const CELL_GAP: u32 = 1;
pub const CELL_MARGIN: u32 = 1;
/// Width of the sub-rect a narrow glyph occupies inside its cell.
pub const NARROW_CELL_WIDTH: u32 = 4;
const NARROW_CELL_INSET: u32 = 2;

/// Pixel region of one glyph inside the atlas texture, Y up from the
/// bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub struct FontAtlas {
    index: FxHashMap<char, usize>,
    texture_width: u32,
    texture_height: u32,
    region_cache: FxHashMap<char, GlyphRegion>,
}

impl FontAtlas {
    /// Builds the index from an ordered charset. The first occurrence of a
    /// repeated character wins, matching linear search over the string.
    #[must_use]
    pub fn new(charset: &str, texture_width: u32, texture_height: u32) -> Self {
        let mut index = FxHashMap::default();
        for (i, c) in charset.chars().enumerate() {
            index.entry(c).or_insert(i);
        }
        Self {
            index,
            texture_width,
            texture_height,
            region_cache: FxHashMap::default(),
        }
    }

    /// Loads the charset file and probes the atlas texture dimensions.
    pub fn load(charset_path: &Path, texture_path: &Path) -> Result<Self, Box<dyn Error>> {
        let charset = assets::load_charset(charset_path)?;
        let (texture_width, texture_height) = assets::texture_dimensions(texture_path)?;
        let atlas = Self::new(&charset, texture_width, texture_height);
        info!(
            "font atlas ready: {} glyphs over a {}x{} texture",
            atlas.index.len(),
            texture_width,
            texture_height
        );
        Ok(atlas)
    }

    #[inline(always)]
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    #[must_use]
    pub fn char_index(&self, c: char) -> Option<usize> {
        self.index.get(&c).copied()
    }

    /// Resolves the atlas region for `c`, caching the result.
    ///
    /// Ancient script always declines: the host's own glyph set renders it.
    pub fn glyph_region(&mut self, c: char, mode: ScriptMode) -> Option<GlyphRegion> {
        if mode == ScriptMode::Ancient {
            return None;
        }
        if let Some(&region) = self.region_cache.get(&c) {
            return Some(region);
        }
        let Some(index) = self.char_index(c) else {
            warn!("character {c:?} (U+{:04X}) not in the font atlas", c as u32);
            return None;
        };
        let region = self.region_for_index(c, index)?;
        self.region_cache.insert(c, region);
        Some(region)
    }

    fn region_for_index(&self, c: char, index: usize) -> Option<GlyphRegion> {
        let col = (index % CHARS_PER_ROW) as u32;
        let row = (index / CHARS_PER_ROW) as u32;
        let x = CELL_MARGIN + col * (CELL_SIZE + CELL_GAP);
        let y_from_top = CELL_MARGIN + row * (CELL_SIZE + CELL_GAP);

        let Some(y) = self.texture_height.checked_sub(y_from_top + CELL_SIZE) else {
            warn!(
                "glyph {c:?} row {row} falls below the {}px atlas",
                self.texture_height
            );
            return None;
        };
        if x + CELL_SIZE > self.texture_width {
            warn!(
                "glyph {c:?} column {col} falls past the {}px atlas",
                self.texture_width
            );
            return None;
        }

        let region = if is_wide(c) {
            GlyphRegion {
                x: x as f32,
                y: y as f32,
                width: CELL_SIZE as f32,
                height: CELL_SIZE as f32,
            }
        } else {
            GlyphRegion {
                x: (x + NARROW_CELL_INSET) as f32,
                y: y as f32,
                width: NARROW_CELL_WIDTH as f32,
                height: CELL_SIZE as f32,
            }
        };
        Some(region)
    }

    /// Resolved regions held by the cache.
    #[must_use]
    pub fn cached_region_count(&self) -> usize {
        self.region_cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.region_cache.clear();
    }
}
