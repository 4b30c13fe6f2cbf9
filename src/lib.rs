//! Runtime Chinese-localization layer for a 2D adventure game's dialogue
//! and tooltip UI.
//!
//! The host reveals dialogue glyph by glyph into fixed rendering slots and
//! asks an atlas for each glyph's sprite. This crate supplies the pieces a
//! localization shim needs between those calls: ordered translation lookup
//! (exact, generic, signpost, placeholder-template), greedy line breaking
//! against the box budgets, asymmetric half-width glyph placement tracked
//! across the typewriter reveal, and a packed bitmap font atlas index for
//! the CJK glyph set. Hooking the host and creating sprites stay on the
//! host side; see `patch::LocalizationPatch` for the event surface.

pub mod assets;
pub mod config;
pub mod patch;
pub mod text;
pub mod translation;
pub mod ui;

pub use patch::{LocalizationPatch, TranslatedSpeech};
pub use text::width::ScriptMode;
pub use ui::font::{FontAtlas, GlyphRegion};
pub use ui::host::{BoundGlyph, ChatBox, GlyphSlot, RevealEvent, TextLine, TooltipWindow};
