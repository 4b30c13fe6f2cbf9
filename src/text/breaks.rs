//! Greedy line breaking for the fixed-width chat box and tooltip panel.
//!
//! The budget counter uses flat per-glyph units (narrow/wide), not the
//! half-width pen model; the two agree on totals for uniform runs but serve
//! different purposes. When a line overruns, the output rewinds to the last
//! break candidate (any non-alphanumeric glyph), a break marker is emitted,
//! and scanning resumes from the candidate so the rewound glyphs are
//! re-measured on the new line.

use crate::text::markers;
use crate::text::width;

/// Sentinel emitted for an inserted break. Distinct from literal newlines,
/// which also end a line but pass through untouched.
pub const LINE_BREAK_CHAR: char = '*';

/// Per-line budget for dialogue text, in flat units.
pub const MAX_CHAT_LINE_UNITS: f32 = 170.0;
/// Per-line budget for tooltip body text, in flat units.
pub const MAX_TOOLTIP_LINE_UNITS: f32 = 130.0;

/// Breaks a dialogue line. Ancient-script lines keep the host's own glyph
/// flow and are returned untouched.
#[must_use]
pub fn insert_dialogue_breaks(text: &str, ancient: bool) -> String {
    if ancient {
        return text.to_string();
    }
    insert_breaks(text, MAX_CHAT_LINE_UNITS)
}

/// Breaks a tooltip body line.
#[must_use]
pub fn insert_tooltip_breaks(text: &str) -> String {
    insert_breaks(text, MAX_TOOLTIP_LINE_UNITS)
}

fn insert_breaks(text: &str, max_line_units: f32) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len() + 8);
    let mut line_units = 0.0f32;
    let mut break_at: Option<usize> = None;

    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];

        if c == '\n' || c == '\r' || c == LINE_BREAK_CHAR {
            line_units = 0.0;
            out.push(c);
            i += 1;
            continue;
        }
        if markers::is_ignored(&chars, i) {
            // Markers keep their place in the stream but cost no width.
            out.push(c);
            i += 1;
            continue;
        }

        // Any glyph outside ASCII letters/digits can host a break:
        // spaces, punctuation, and every wide glyph.
        if !c.is_ascii_alphanumeric() {
            break_at = Some(i);
        }

        if line_units > max_line_units {
            line_units = 0.0;
            if let Some(bp) = break_at {
                // Rewind past everything emitted since the candidate and
                // re-scan it on the fresh line, candidate included.
                out.truncate(out.len() - (i - bp));
                out.push(LINE_BREAK_CHAR);
                break_at = None;
                i = bp;
                continue;
            }
            // Unbreakable run: force a break right here.
            out.push(LINE_BREAK_CHAR);
        }

        out.push(c);
        line_units += if width::is_wide(c) {
            width::WIDE_SPACING
        } else {
            width::NARROW_SPACING
        };
        i += 1;
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through_unchanged() {
        assert_eq!(insert_dialogue_breaks("HELLO WORLD", false), "HELLO WORLD");
        assert_eq!(insert_tooltip_breaks("SHORT"), "SHORT");
    }

    #[test]
    fn ancient_lines_are_never_broken() {
        let line = "]".to_string() + &"OLD WORDS ".repeat(20);
        assert_eq!(insert_dialogue_breaks(&line, true), line);
    }

    #[test]
    fn breaks_land_on_the_last_word_boundary() {
        // Budget 30: "HELLO " fills 30 units, 'W' pushes past, rewinds to
        // the space; the space itself moves onto the new line.
        assert_eq!(
            insert_breaks("HELLO WORLD AGAIN", 30.0),
            "HELLO* WORLD* AGAIN"
        );
    }

    #[test]
    fn unbreakable_runs_force_a_break() {
        assert_eq!(insert_breaks("ABCDEFGHIJ", 30.0), "ABCDEFG*HIJ");
    }

    #[test]
    fn wide_glyphs_break_at_any_glyph_boundary() {
        assert_eq!(insert_breaks("你好世界", 25.0), "你好世*界");
    }

    #[test]
    fn literal_newlines_reset_the_budget() {
        assert_eq!(
            insert_breaks("HELLO\nWORLD AGAIN", 30.0),
            "HELLO\nWORLD* AGAIN"
        );
    }

    #[test]
    fn color_markers_cost_no_width() {
        // Nine characters, six of them visible: only a counter that
        // wrongly charged the marker pair would overflow 30 units here.
        assert_eq!(insert_breaks("@CABCDEF@", 30.0), "@CABCDEF@");
    }

    #[test]
    fn dialogue_budget_never_splits_words() {
        let line = "THIS IS A VERY LONG LINE OF DIALOGUE TEXT THAT EXCEEDS THE LINE BUDGET";
        let broken = insert_dialogue_breaks(line, false);
        assert_eq!(broken.replace(LINE_BREAK_CHAR, ""), line);
        for segment in broken.split(LINE_BREAK_CHAR) {
            // Every inserted break sits against a space, so each segment
            // is a whole word sequence.
            assert!(
                segment.is_empty() || !segment.trim().contains("  "),
                "segment mangled: {segment:?}"
            );
            let units: f32 = segment
                .chars()
                .map(|c| {
                    if width::is_wide(c) {
                        width::WIDE_SPACING
                    } else {
                        width::NARROW_SPACING
                    }
                })
                .sum();
            // One glyph of slack: the overrunning glyph is detected after
            // the budget is already full.
            assert!(
                units <= MAX_CHAT_LINE_UNITS + width::WIDE_SPACING,
                "segment too wide ({units}): {segment:?}"
            );
        }
    }
}
