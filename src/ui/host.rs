//! The narrow view of the host UI that layout operates on.
//!
//! The host owns the real scene objects; it mirrors the fields below into
//! these structs before an event and copies mutated local positions back
//! afterwards. Only local X positions are ever written by layout; Y and Z
//! are read and re-used.

use crate::text::width::ScriptMode;
use glam::Vec3;

/// Identity of the glyph a rendering slot currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundGlyph {
    /// Character the glyph was fetched for.
    pub ch: char,
    /// Whether it came from the custom atlas rather than the host font.
    pub custom: bool,
}

impl BoundGlyph {
    /// Wide spacing applies only to custom atlas glyphs whose character is
    /// itself wide; host-font glyphs always space narrow.
    #[inline(always)]
    #[must_use]
    pub const fn is_wide_custom(&self) -> bool {
        self.custom && self.ch as u32 > crate::text::width::ASCII_LIMIT
    }
}

/// One fixed text-rendering slot: a transform plus whatever glyph the host
/// has bound to it (none while the reveal has not reached it).
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphSlot {
    pub local_position: Vec3,
    pub glyph: Option<BoundGlyph>,
}

impl GlyphSlot {
    #[must_use]
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            local_position: Vec3::new(x, y, z),
            glyph: None,
        }
    }
}

/// One visual dialogue line: its container transform and its glyph slots.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    pub local_position: Vec3,
    pub slots: Vec<GlyphSlot>,
}

/// The dialogue box as layout sees it.
#[derive(Debug, Clone, Default)]
pub struct ChatBox {
    /// Speaker-name slots.
    pub name: Vec<GlyphSlot>,
    /// Text lines, top to bottom. Every line has the same slot count.
    pub lines: Vec<TextLine>,
    pub language: ScriptMode,
    pub background_position: Vec3,
    pub name_plate_position: Vec3,
}

impl ChatBox {
    /// Slots per visual line; zero for an empty box.
    #[must_use]
    pub fn slots_per_line(&self) -> usize {
        self.lines.first().map_or(0, |line| line.slots.len())
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.lines.iter().map(|line| line.slots.len()).sum()
    }

    /// Flat slot access in reveal order (line-major).
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&GlyphSlot> {
        let per_line = self.slots_per_line();
        if per_line == 0 {
            return None;
        }
        self.lines.get(index / per_line)?.slots.get(index % per_line)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut GlyphSlot> {
        let per_line = self.slots_per_line();
        if per_line == 0 {
            return None;
        }
        self.lines
            .get_mut(index / per_line)?
            .slots
            .get_mut(index % per_line)
    }
}

/// The tooltip window as layout sees it: a header row plus a flat grid of
/// body slots, a fixed count per visual line.
#[derive(Debug, Clone, Default)]
pub struct TooltipWindow {
    pub name: Vec<GlyphSlot>,
    pub about: Vec<GlyphSlot>,
}

/// State of one typewriter reveal step, captured after the host applied the
/// newly revealed key.
#[derive(Debug, Clone, Copy)]
pub struct RevealEvent<'a> {
    /// Rendering slots consumed so far; the slot just filled is
    /// `slot_cursor - 1`.
    pub slot_cursor: usize,
    /// Current visual line, 1-based.
    pub current_line: usize,
    /// The full key sequence for this screen, markers included.
    pub keys: &'a [char],
    /// Keys consumed so far; the key just applied is `key_cursor - 1`.
    pub key_cursor: usize,
}
