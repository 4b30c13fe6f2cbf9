//! Glyph placement for the dialogue box and tooltip window.
//!
//! The host reveals dialogue one key at a time (or all at once in instant
//! mode) and owns the slot transforms; this module re-pins each revealed
//! glyph's X from a remembered per-line baseline plus a running half-width
//! pen offset. Baselines and the pristine per-slot X positions are captured
//! once, when the box first initializes, and the slot positions are put
//! back when the dialogue closes.
//!
//! All state lives in explicit session objects owned by the patch; one
//! dialogue box and one tooltip exist at a time, so a single session of
//! each suffices.

use crate::text::breaks::LINE_BREAK_CHAR;
use crate::text::markers;
use crate::text::width::{self, ScriptMode};
use crate::ui::host::{ChatBox, RevealEvent, TooltipWindow};
use glam::Vec3;
use log::{debug, info, trace, warn};

/// X where the first speaker-name glyph is pinned.
pub const NAME_BASE_X: f32 = -49.0;
/// Name slots are re-pinned at this offset with a uniform wide pitch.
pub const NAME_SLOT_OFFSET: Vec3 = Vec3::new(-49.0, -2.0, 0.0);

/// Baseline records kept per box, matching the host's line buffer.
pub const MAX_LINE_BUFFER: usize = 4;
/// Slot records kept per box, matching the host's slot pool.
pub const MAX_TEXT_SLOTS: usize = 116;

pub const CHAT_BG_Y_OFFSET: f32 = 1.0;
pub const NAME_PLATE_Y_OFFSET: f32 = 2.0;
/// Per-line Y drop applied at restyle grows by this step.
pub const LINE_Y_STEP: f32 = 3.0;

/// Body slots per tooltip line.
pub const TOOLTIP_LINE_SLOTS: usize = 24;
pub const TOOLTIP_NAME_X_OFFSET: f32 = 4.0;
pub const TOOLTIP_NAME_Y_OFFSET: f32 = -1.0;
pub const TOOLTIP_ABOUT_X_OFFSET: f32 = 3.0;
/// Each tooltip body line drops by this much per line index.
pub const TOOLTIP_ABOUT_LINE_Y_STEP: f32 = 3.0;

/* ======================= DIALOGUE SESSION ======================= */

#[derive(Debug, Default)]
pub struct DialogueLayout {
    line_base_x: Vec<f32>,
    original_slot_x: Vec<f32>,
    line_x_offset: f32,
    last_line_index: usize,
}

impl DialogueLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures each line's first-slot X as its baseline and every slot's
    /// pristine X for the close-time restore. Runs once per box; the
    /// arrays are immutable afterwards.
    pub fn initialize_baselines(&mut self, chat_box: &ChatBox) {
        if !self.line_base_x.is_empty() {
            warn!("baselines already captured; keeping the original capture");
            return;
        }
        for line in &chat_box.lines {
            for slot in &line.slots {
                if self.original_slot_x.len() < MAX_TEXT_SLOTS {
                    self.original_slot_x.push(slot.local_position.x);
                }
            }
            if self.line_base_x.len() < MAX_LINE_BUFFER {
                if let Some(first) = line.slots.first() {
                    self.line_base_x.push(first.local_position.x);
                    debug!(
                        "line {} base X captured: {}",
                        self.line_base_x.len() - 1,
                        first.local_position.x
                    );
                }
            }
        }
        info!(
            "captured {} line baselines and {} slot positions",
            self.line_base_x.len(),
            self.original_slot_x.len()
        );
    }

    /// Drops the capture from a previous box instance and captures the new
    /// box. A fresh box carries fresh slot transforms; keeping the old
    /// arrays would restore slots to another instance's positions.
    pub fn reseed_baselines(&mut self, chat_box: &ChatBox) {
        self.line_base_x.clear();
        self.original_slot_x.clear();
        self.initialize_baselines(chat_box);
    }

    /// Zeroes the pen for a fresh dialogue or a fresh screen of text.
    pub fn reset_tracking(&mut self) {
        self.line_x_offset = 0.0;
        self.last_line_index = 0;
    }

    /// Restarts the pen when the reveal moves to another visual line.
    pub fn check_line_change(&mut self, line_index: usize) {
        if line_index != self.last_line_index {
            self.line_x_offset = 0.0;
            self.last_line_index = line_index;
        }
    }

    #[must_use]
    pub fn current_line_x_offset(&self) -> f32 {
        self.line_x_offset
    }

    /// Advances the pen past `current` toward `next`.
    pub fn advance(&mut self, current: char, next: Option<char>, mode: ScriptMode) {
        self.line_x_offset += width::advance_between(current, next, mode);
    }

    /// Baseline X of a line, or the live position of its first slot when
    /// no capture covers the index.
    #[must_use]
    pub fn line_base_x(&self, line_index: usize, chat_box: &ChatBox, line_start: usize) -> f32 {
        if let Some(&x) = self.line_base_x.get(line_index) {
            return x;
        }
        chat_box
            .slot(line_start)
            .map_or(0.0, |slot| slot.local_position.x)
    }

    /// Pristine X of a slot, captured at initialization.
    #[must_use]
    pub fn original_slot_x(&self, slot_index: usize) -> f32 {
        self.original_slot_x.get(slot_index).copied().unwrap_or(0.0)
    }

    /// Typewriter step: places the slot just filled and advances the pen
    /// toward the next visible key.
    pub fn on_letter_applied(&mut self, chat_box: &mut ChatBox, event: &RevealEvent) {
        self.check_line_change(event.current_line);

        let Some(key_index) = event.key_cursor.checked_sub(1) else {
            return;
        };
        let Some(&current) = event.keys.get(key_index) else {
            return;
        };
        // Marker characters consume a key but no slot; the pen stays put.
        if markers::is_ignored(event.keys, key_index) {
            return;
        }
        if event.slot_cursor == 0 || event.slot_cursor > chat_box.slot_count() {
            return;
        }
        let filled_slot = event.slot_cursor - 1;
        if chat_box.slot(filled_slot).is_none_or(|s| s.glyph.is_none()) {
            return;
        }

        let per_line = chat_box.slots_per_line();
        let line_index = event.current_line.saturating_sub(1);
        let line_start = line_index * per_line;
        if filled_slot < line_start {
            return;
        }

        let base_x = self.line_base_x(line_index, chat_box, line_start);
        let offset = self.line_x_offset;
        if let Some(slot) = chat_box.slot_mut(filled_slot) {
            slot.local_position.x = base_x + offset;
        }

        let next = markers::next_visible(event.keys, key_index + 1);
        self.advance(current, next, chat_box.language);
        trace!(
            "placed {current:?} at line {line_index} offset {offset}; pen now {}",
            self.line_x_offset
        );
    }

    /// Instant-mode pass: lays out every occupied slot, line by line, after
    /// the host bound all glyphs at once.
    ///
    /// Width class comes from the glyph each slot actually shows, not from
    /// the source string; the two can disagree once translation substitutes
    /// characters. That disagreement is deliberate and load-bearing.
    pub fn layout_all_slots(&mut self, chat_box: &mut ChatBox) {
        let per_line = chat_box.slots_per_line();
        if per_line == 0 {
            return;
        }
        let line_count = chat_box.lines.len();
        debug!("instant layout over {line_count} lines of {per_line} slots");

        for line_index in 0..line_count {
            let line_start = line_index * per_line;
            let base_x = self.line_base_x(line_index, chat_box, line_start);
            let mut pen = 0.0f32;

            for slot_in_line in 0..per_line {
                let slot_index = line_start + slot_in_line;
                let Some(bound) = chat_box.slot(slot_index).and_then(|s| s.glyph) else {
                    // First empty slot ends the line.
                    break;
                };

                let current_half = if chat_box.language == ScriptMode::Ancient {
                    width::ANCIENT_SPACING / 2.0
                } else if bound.is_wide_custom() {
                    width::WIDE_SPACING / 2.0
                } else {
                    width::NARROW_SPACING / 2.0
                };
                let mut next_half = width::NARROW_SPACING / 2.0;
                if slot_in_line + 1 < per_line {
                    if let Some(next_bound) =
                        chat_box.slot(slot_index + 1).and_then(|s| s.glyph)
                    {
                        if next_bound.is_wide_custom() {
                            next_half = width::WIDE_SPACING / 2.0;
                        }
                    }
                }

                if let Some(slot) = chat_box.slot_mut(slot_index) {
                    slot.local_position.x = base_x + pen;
                }
                pen += (current_half + next_half).ceil();
            }
        }
    }

    /// Puts every slot's X back to its captured pristine value.
    pub fn restore_slot_positions(&self, chat_box: &mut ChatBox) {
        let count = chat_box.slot_count().min(self.original_slot_x.len());
        for slot_index in 0..count {
            let x = self.original_slot_x[slot_index];
            if let Some(slot) = chat_box.slot_mut(slot_index) {
                slot.local_position.x = x;
            }
        }
    }
}

/* ======================= NAME LABEL ======================= */

/// Lays out the speaker-name label. The whole name is known up front, so
/// this is a single stateless pass.
pub fn layout_name(chat_box: &mut ChatBox, speaker_name: &str) {
    if chat_box.name.is_empty() {
        return;
    }
    if speaker_name.is_empty() {
        warn!("no speaker name to lay out");
        return;
    }
    let base_y = chat_box.name[0].local_position.y;
    let base_z = chat_box.name[0].local_position.z;
    let chars: Vec<char> = speaker_name.chars().collect();

    let mut pen = 0.0f32;
    let count = chat_box.name.len().min(chars.len());
    for i in 0..count {
        chat_box.name[i].local_position = Vec3::new(NAME_BASE_X + pen, base_y, base_z);
        pen += width::advance_between(chars[i], chars.get(i + 1).copied(), ScriptMode::Normal);
    }
}

/// One-time structural restyle when the box initializes: uniform name
/// pitch, panel offsets for the taller glyph cells, and a growing per-line
/// drop. Baselines must be captured before this runs; only Y moves here.
pub fn restyle_chat_box(chat_box: &mut ChatBox) {
    for (i, slot) in chat_box.name.iter_mut().enumerate() {
        slot.local_position = NAME_SLOT_OFFSET + Vec3::new(width::WIDE_SPACING * i as f32, 0.0, 0.0);
    }
    chat_box.background_position.y += CHAT_BG_Y_OFFSET;
    chat_box.name_plate_position.y += NAME_PLATE_Y_OFFSET;

    let mut line_drop = 1.0f32;
    for line in &mut chat_box.lines {
        line.local_position.y -= line_drop;
        line_drop += LINE_Y_STEP;
    }
}

/* ======================= TOOLTIP SESSION ======================= */

#[derive(Debug, Default)]
pub struct TooltipLayout {
    name_base: Option<(f32, f32)>,
    about_base_x: Option<f32>,
    line_original_y: Vec<f32>,
}

impl TooltipLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures header and body base positions the first time a tooltip
    /// opens; later opens reuse the capture.
    pub fn initialize(&mut self, tooltip: &TooltipWindow) {
        if self.name_base.is_none() {
            if let Some(first) = tooltip.name.first() {
                self.name_base = Some((
                    first.local_position.x + TOOLTIP_NAME_X_OFFSET,
                    first.local_position.y + TOOLTIP_NAME_Y_OFFSET,
                ));
            }
        }
        if self.about_base_x.is_none() {
            if let Some(first) = tooltip.about.first() {
                self.about_base_x = Some(first.local_position.x + TOOLTIP_ABOUT_X_OFFSET);
                let total_lines = tooltip.about.len() / TOOLTIP_LINE_SLOTS;
                self.line_original_y = (0..total_lines)
                    .map(|line| tooltip.about[line * TOOLTIP_LINE_SLOTS].local_position.y)
                    .collect();
                debug!("tooltip base captured over {total_lines} body lines");
            }
        }
    }

    /// Lays out the header row, same half-width rule as the name label.
    pub fn layout_header(&self, tooltip: &mut TooltipWindow, header: &str) {
        let Some(first) = tooltip.name.first() else {
            return;
        };
        let (base_x, base_y) = self.name_base.unwrap_or((
            first.local_position.x + TOOLTIP_NAME_X_OFFSET,
            first.local_position.y + TOOLTIP_NAME_Y_OFFSET,
        ));
        let base_z = first.local_position.z;
        let chars: Vec<char> = header.chars().collect();

        let mut pen = 0.0f32;
        let count = tooltip.name.len().min(chars.len());
        for i in 0..count {
            tooltip.name[i].local_position = Vec3::new(base_x + pen, base_y, base_z);
            pen += width::advance_between(chars[i], chars.get(i + 1).copied(), ScriptMode::Normal);
        }
    }

    /// Lays out the broken body string: the break marker moves to the next
    /// line slot row and drops it by a growing Y step; markers pass through
    /// without consuming a slot.
    pub fn layout_about(&self, tooltip: &mut TooltipWindow, about: &str) {
        if tooltip.about.is_empty() {
            return;
        }
        let base_x = self
            .about_base_x
            .unwrap_or(tooltip.about[0].local_position.x + TOOLTIP_ABOUT_X_OFFSET);
        let base_z = tooltip.about[0].local_position.z;
        let chars: Vec<char> = about.chars().collect();

        let mut current_line = 0usize;
        let mut slot_in_line = 0usize;
        let mut pen = 0.0f32;

        for (i, &c) in chars.iter().enumerate() {
            if markers::is_ignored(&chars, i) {
                continue;
            }
            if c == LINE_BREAK_CHAR {
                current_line += 1;
                slot_in_line = 0;
                pen = 0.0;
                continue;
            }

            let slot_index = current_line * TOOLTIP_LINE_SLOTS + slot_in_line;
            if slot_index >= tooltip.about.len() {
                break;
            }

            let line_base_y = self
                .line_original_y
                .get(current_line)
                .or(self.line_original_y.first())
                .copied()
                .unwrap_or(tooltip.about[slot_index].local_position.y);
            let y = line_base_y - (current_line as f32 + 1.0) * TOOLTIP_ABOUT_LINE_Y_STEP;

            tooltip.about[slot_index].local_position = Vec3::new(base_x + pen, y, base_z);
            trace!("tooltip glyph {c:?} on line {current_line} slot {slot_in_line}");

            let next = markers::next_visible(&chars, i + 1);
            pen += width::advance_between(c, next, ScriptMode::Normal);
            slot_in_line += 1;
        }
    }
}
