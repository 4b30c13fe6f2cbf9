//! Placeholder-template translation.
//!
//! Some lines embed free-form values (the player's name, counts, item
//! words) at `{0}`/`{1}` holes. A template's literal segments must match
//! the incoming line exactly; each hole captures at least one character,
//! taking the shortest capture that lets the rest of the template match
//! (leftmost-shortest, both ends anchored). Captures are substituted into
//! the stored translation by hole number, in order of appearance.
//!
//! Within a speaker, templates are ranked by how much literal text they
//! carry, most first, so a catch-all like `{0}` never shadows a specific
//! line.

use log::{debug, info};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Speaker bucket that must exist alongside a speaker's own templates
/// before template matching is attempted at all.
pub const NAME_PLACEHOLDER_SPEAKER: &str = "[Name]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Hole,
}

#[derive(Debug, Clone)]
pub struct SpeechTemplate {
    original: String,
    translation: String,
    segments: Vec<Segment>,
    literal_len: usize,
}

/// Returns the byte range of the first `{digits}` hole at or after `from`.
fn find_hole(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b'}' {
                return Some((i, j + 1));
            }
        }
        i += 1;
    }
    None
}

#[inline(always)]
#[must_use]
pub fn has_holes(s: &str) -> bool {
    find_hole(s, 0).is_some()
}

impl SpeechTemplate {
    fn parse(original: &str, translation: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal_len = 0usize;
        let mut pos = 0usize;
        while let Some((start, end)) = find_hole(original, pos) {
            if start > pos {
                let lit = &original[pos..start];
                literal_len += lit.chars().count();
                segments.push(Segment::Literal(lit.to_string()));
            }
            segments.push(Segment::Hole);
            pos = end;
        }
        if pos < original.len() {
            let lit = &original[pos..];
            literal_len += lit.chars().count();
            segments.push(Segment::Literal(lit.to_string()));
        }
        Self {
            original: original.to_string(),
            translation: translation.to_string(),
            segments,
            literal_len,
        }
    }

    /// Matches `text` against this template and, on success, returns the
    /// translation with every `{i}` replaced by the i-th capture.
    fn apply(&self, text: &str) -> Option<String> {
        let mut captures: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        if !match_segments(&self.segments, text, 0, &mut captures) {
            return None;
        }
        let mut translated = self.translation.clone();
        for (i, &(start, end)) in captures.iter().enumerate() {
            translated = translated.replace(&format!("{{{i}}}"), &text[start..end]);
        }
        Some(translated)
    }
}

/// Backtracking matcher. Holes try their shortest viable capture first and
/// grow one character at a time, which reproduces lazy-capture semantics.
fn match_segments(
    segments: &[Segment],
    text: &str,
    pos: usize,
    captures: &mut SmallVec<[(usize, usize); 4]>,
) -> bool {
    let Some(segment) = segments.first() else {
        return pos == text.len();
    };
    let rest = &segments[1..];
    match segment {
        Segment::Literal(lit) => {
            text[pos..].starts_with(lit.as_str())
                && match_segments(rest, text, pos + lit.len(), captures)
        }
        Segment::Hole => {
            let tail = &text[pos..];
            for (offset, _) in tail.char_indices().skip(1) {
                captures.push((pos, pos + offset));
                if match_segments(rest, text, pos + offset, captures) {
                    return true;
                }
                captures.pop();
            }
            if tail.is_empty() {
                return false;
            }
            // Capture everything that is left.
            captures.push((pos, text.len()));
            if match_segments(rest, text, text.len(), captures) {
                return true;
            }
            captures.pop();
            false
        }
    }
}

#[derive(Debug, Default)]
pub struct SpeechTemplates {
    by_speaker: FxHashMap<String, Vec<SpeechTemplate>>,
}

impl SpeechTemplates {
    /// Collects every hole-bearing entry of the speech table into ranked
    /// per-speaker template lists.
    #[must_use]
    pub fn build(speech: &FxHashMap<String, FxHashMap<String, String>>) -> Self {
        let mut by_speaker: FxHashMap<String, Vec<SpeechTemplate>> = FxHashMap::default();
        for (speaker, lines) in speech {
            for (original, translation) in lines {
                if has_holes(original) {
                    let template = SpeechTemplate::parse(original, translation);
                    debug!(
                        "template for {speaker:?}: {:?} => {:?}",
                        template.original, template.translation
                    );
                    by_speaker
                        .entry(speaker.clone())
                        .or_default()
                        .push(template);
                }
            }
        }
        for templates in by_speaker.values_mut() {
            templates.sort_by(|a, b| b.literal_len.cmp(&a.literal_len));
        }
        let total: usize = by_speaker.values().map(Vec::len).sum();
        info!(
            "prepared {total} speech templates across {} speakers",
            by_speaker.len()
        );
        Self { by_speaker }
    }

    /// Tries every template of `speaker` against `actual`, most literal
    /// text first. Declines outright unless both the speaker's bucket and
    /// the name-placeholder bucket exist.
    #[must_use]
    pub fn translate(&self, speaker: &str, actual: &str) -> Option<String> {
        let templates = self.by_speaker.get(speaker)?;
        self.by_speaker.get(NAME_PLACEHOLDER_SPEAKER)?;
        for template in templates {
            if let Some(translated) = template.apply(actual) {
                debug!(
                    "template {:?} matched {actual:?} => {translated:?}",
                    template.original
                );
                return Some(translated);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speech_with(entries: &[(&str, &[(&str, &str)])]) -> FxHashMap<String, FxHashMap<String, String>> {
        let mut speech: FxHashMap<String, FxHashMap<String, String>> = FxHashMap::default();
        for &(speaker, lines) in entries {
            let bucket = speech.entry(speaker.to_string()).or_default();
            for &(k, v) in lines {
                bucket.insert(k.to_string(), v.to_string());
            }
        }
        speech
    }

    #[test]
    fn captures_substitute_into_the_translation() {
        let speech = speech_with(&[
            ("PA", &[("HELLO {0}.", "你好{0}。")]),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}!", "{0}!")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(
            templates.translate("PA", "HELLO WORLD."),
            Some("你好WORLD。".to_string())
        );
    }

    #[test]
    fn literal_segments_must_match_exactly() {
        let speech = speech_with(&[
            ("PA", &[("HELLO {0}.", "你好{0}。")]),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}!", "{0}!")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(templates.translate("PA", "GOODBYE WORLD."), None);
        // The trailing period is part of the template.
        assert_eq!(templates.translate("PA", "HELLO WORLD"), None);
    }

    #[test]
    fn holes_capture_at_least_one_character() {
        let speech = speech_with(&[
            ("PA", &[("A{0}B", "甲{0}乙")]),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}", "{0}")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(templates.translate("PA", "AB"), None);
        assert_eq!(templates.translate("PA", "AXB"), Some("甲X乙".to_string()));
    }

    #[test]
    fn captures_are_lazy() {
        let speech = speech_with(&[
            ("PA", &[("{0}-{1}", "{1}/{0}")]),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}", "{0}")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        // The first hole stops at the first dash, not the last.
        assert_eq!(
            templates.translate("PA", "ONE-TWO-THREE"),
            Some("TWO-THREE/ONE".to_string())
        );
    }

    #[test]
    fn more_literal_templates_win_over_catch_alls() {
        let speech = speech_with(&[
            (
                "ZAEGUL",
                &[("{0}", "兜底{0}"), ("WELCOME, {0}!", "欢迎，{0}！")],
            ),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}", "{0}")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(
            templates.translate("ZAEGUL", "WELCOME, TRAVELER!"),
            Some("欢迎，TRAVELER！".to_string())
        );
    }

    #[test]
    fn matching_requires_the_name_placeholder_bucket() {
        let speech = speech_with(&[("PA", &[("HELLO {0}.", "你好{0}。")])]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(templates.translate("PA", "HELLO WORLD."), None);
    }

    #[test]
    fn plain_lines_produce_no_templates() {
        let speech = speech_with(&[
            ("PA", &[("HELLO.", "你好。")]),
            (NAME_PLACEHOLDER_SPEAKER, &[("{0}", "{0}")]),
        ]);
        let templates = SpeechTemplates::build(&speech);
        assert_eq!(templates.translate("PA", "HELLO."), None);
    }
}
