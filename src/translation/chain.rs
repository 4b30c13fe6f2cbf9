//! Ordered lookup strategies.
//!
//! A line is tried against each strategy in a fixed priority order and the
//! first hit wins. Dialogue and the two tooltip surfaces each have their
//! own chain. The winning strategy is reported back because dialogue
//! post-processing depends on it.

use crate::translation::tables::TranslationTables;
use crate::translation::template::{NAME_PLACEHOLDER_SPEAKER, SpeechTemplates};
use log::{debug, warn};

/// Speaker whose template lines take the wrong-name substitution pass.
pub const WRONG_NAME_SPEAKER: &str = "ZAEGUL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechStrategy {
    /// Per-speaker exact line.
    ExactLine,
    /// Generic NPC info keyed by display name.
    GenericInfo,
    /// Guest NPC info keyed by display name.
    GuestInfo,
    /// Signposts; the line alone is the key.
    SignpostInfo,
    /// The speaker-agnostic name-placeholder bucket.
    NamePlaceholder,
    /// Placeholder-template match with captures.
    PlaceholderTemplate,
}

impl SpeechStrategy {
    pub const ORDER: [Self; 6] = [
        Self::ExactLine,
        Self::GenericInfo,
        Self::GuestInfo,
        Self::SignpostInfo,
        Self::NamePlaceholder,
        Self::PlaceholderTemplate,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExactLine => "exact line",
            Self::GenericInfo => "generic info",
            Self::GuestInfo => "guest info",
            Self::SignpostInfo => "signpost info",
            Self::NamePlaceholder => "name placeholder",
            Self::PlaceholderTemplate => "placeholder template",
        }
    }

    fn apply(
        self,
        tables: &TranslationTables,
        templates: &SpeechTemplates,
        speaker: &str,
        line: &str,
    ) -> Option<String> {
        match self {
            Self::ExactLine => tables.speech.get(speaker)?.get(line).cloned(),
            Self::GenericInfo => tables.generic_info.get(speaker)?.get(line).cloned(),
            Self::GuestInfo => tables.guest_info.get(speaker)?.get(line).cloned(),
            Self::SignpostInfo => tables.signpost_info.get(line).cloned(),
            Self::NamePlaceholder => tables
                .speech
                .get(NAME_PLACEHOLDER_SPEAKER)?
                .get(line)
                .cloned(),
            Self::PlaceholderTemplate => templates.translate(speaker, line),
        }
    }
}

/// Runs the dialogue chain. Logs a miss; the caller renders the original.
#[must_use]
pub fn translate_speech_line(
    tables: &TranslationTables,
    templates: &SpeechTemplates,
    speaker: &str,
    line: &str,
) -> Option<(String, SpeechStrategy)> {
    for strategy in SpeechStrategy::ORDER {
        if let Some(translated) = strategy.apply(tables, templates, speaker, line) {
            debug!("speech matched via {}: {line:?}", strategy.label());
            return Some((translated, strategy));
        }
    }
    warn!("no speech translation for speaker {speaker:?}: {line:?}");
    None
}

/// Replaces the first wrong-name key found in `line` with its mapped
/// rendition. Only the wrong-name speaker's template lines take this pass.
pub fn apply_wrong_name_fix(tables: &TranslationTables, speaker: &str, line: &mut String) -> bool {
    if speaker != WRONG_NAME_SPEAKER {
        return false;
    }
    for (wrong, rendered) in &tables.wrong_names {
        if line.contains(wrong.as_str()) {
            *line = line.replace(wrong.as_str(), rendered);
            debug!("wrong-name fix applied: {wrong:?} -> {rendered:?}");
            return true;
        }
    }
    false
}

/// Speaker display names: the speaker table first, then the generic one.
#[must_use]
pub fn translate_speaker_name(tables: &TranslationTables, name: &str) -> Option<String> {
    tables
        .speaker_names
        .get(name)
        .or_else(|| tables.generic_names.get(name))
        .cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipBodyStrategy {
    /// Tool descriptions, keyed by the tooltip header.
    ToolAbout,
    /// Item tooltips, keyed by the body text.
    ItemTooltip,
    /// Achievement descriptions, keyed by the body text.
    AchievementAbout,
    /// Achievement hints, keyed by the body text.
    AchievementHint,
}

impl TooltipBodyStrategy {
    pub const ORDER: [Self; 4] = [
        Self::ToolAbout,
        Self::ItemTooltip,
        Self::AchievementAbout,
        Self::AchievementHint,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ToolAbout => "tool about",
            Self::ItemTooltip => "item tooltip",
            Self::AchievementAbout => "achievement about",
            Self::AchievementHint => "achievement hint",
        }
    }

    fn apply(self, tables: &TranslationTables, header: &str, about: &str) -> Option<String> {
        match self {
            Self::ToolAbout => tables.tool_about.get(header).cloned(),
            Self::ItemTooltip => tables.item_tooltips.get(about).cloned(),
            Self::AchievementAbout => tables.achievement_about.get(about).cloned(),
            Self::AchievementHint => tables.achievement_hints.get(about).cloned(),
        }
    }
}

#[must_use]
pub fn translate_tooltip_body(
    tables: &TranslationTables,
    header: &str,
    about: &str,
) -> Option<(String, TooltipBodyStrategy)> {
    for strategy in TooltipBodyStrategy::ORDER {
        if let Some(translated) = strategy.apply(tables, header, about) {
            debug!("tooltip body matched via {}", strategy.label());
            return Some((translated, strategy));
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipHeaderStrategy {
    Tool,
    Item,
    Achievement,
}

impl TooltipHeaderStrategy {
    pub const ORDER: [Self; 3] = [Self::Tool, Self::Item, Self::Achievement];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Item => "item",
            Self::Achievement => "achievement",
        }
    }

    fn apply(self, tables: &TranslationTables, header: &str) -> Option<String> {
        match self {
            Self::Tool => tables.tools.get(header).cloned(),
            Self::Item => tables.items.get(header).cloned(),
            Self::Achievement => tables.achievements.get(header).cloned(),
        }
    }
}

#[must_use]
pub fn translate_tooltip_header(
    tables: &TranslationTables,
    header: &str,
) -> Option<(String, TooltipHeaderStrategy)> {
    for strategy in TooltipHeaderStrategy::ORDER {
        if let Some(translated) = strategy.apply(tables, header) {
            debug!("tooltip header matched via {}", strategy.label());
            return Some((translated, strategy));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn tables_with_speech(entries: &[(&str, &str, &str)]) -> TranslationTables {
        let mut tables = TranslationTables::default();
        for &(speaker, line, value) in entries {
            tables
                .speech
                .entry(speaker.to_string())
                .or_default()
                .insert(line.to_string(), value.to_string());
        }
        tables
    }

    fn templates_of(tables: &TranslationTables) -> SpeechTemplates {
        SpeechTemplates::build(&tables.speech)
    }

    #[test]
    fn exact_line_beats_every_later_strategy() {
        let mut tables = tables_with_speech(&[("PA", "HELLO.", "你好。")]);
        tables
            .signpost_info
            .insert("HELLO.".to_string(), "路牌版本".to_string());
        let templates = templates_of(&tables);
        let (translated, strategy) =
            translate_speech_line(&tables, &templates, "PA", "HELLO.").expect("hit");
        assert_eq!(translated, "你好。");
        assert_eq!(strategy, SpeechStrategy::ExactLine);
    }

    #[test]
    fn signposts_match_regardless_of_speaker() {
        let mut tables = TranslationTables::default();
        tables
            .signpost_info
            .insert("EAST: CROCASINO".to_string(), "东：鳄鱼赌场".to_string());
        let templates = templates_of(&tables);
        let (translated, strategy) =
            translate_speech_line(&tables, &templates, "NOBODY", "EAST: CROCASINO").expect("hit");
        assert_eq!(translated, "东：鳄鱼赌场");
        assert_eq!(strategy, SpeechStrategy::SignpostInfo);
    }

    #[test]
    fn template_strategy_is_the_last_resort() {
        let mut tables = tables_with_speech(&[
            ("PA", "HELLO {0}.", "你好{0}。"),
            (NAME_PLACEHOLDER_SPEAKER, "{0}", "{0}"),
        ]);
        let templates = templates_of(&tables);
        let (translated, strategy) =
            translate_speech_line(&tables, &templates, "PA", "HELLO WORLD.").expect("hit");
        assert_eq!(translated, "你好WORLD。");
        assert_eq!(strategy, SpeechStrategy::PlaceholderTemplate);
    }

    #[test]
    fn misses_return_none() {
        let tables = TranslationTables::default();
        let templates = SpeechTemplates::build(&FxHashMap::default());
        assert!(translate_speech_line(&tables, &templates, "PA", "UNKNOWN").is_none());
    }

    #[test]
    fn wrong_name_fix_only_touches_its_speaker() {
        let mut tables = TranslationTables::default();
        tables
            .wrong_names
            .insert("TRAVELER".to_string(), "特拉维勒".to_string());
        let mut line = "WELCOME, TRAVELER!".to_string();
        assert!(!apply_wrong_name_fix(&tables, "PA", &mut line));
        assert_eq!(line, "WELCOME, TRAVELER!");
        assert!(apply_wrong_name_fix(&tables, WRONG_NAME_SPEAKER, &mut line));
        assert_eq!(line, "WELCOME, 特拉维勒!");
    }

    #[test]
    fn speaker_names_fall_back_to_the_generic_table() {
        let mut tables = TranslationTables::default();
        tables
            .generic_names
            .insert("BUNNY".to_string(), "兔子".to_string());
        assert_eq!(
            translate_speaker_name(&tables, "BUNNY"),
            Some("兔子".to_string())
        );
        assert_eq!(translate_speaker_name(&tables, "NOBODY"), None);
    }

    #[test]
    fn tooltip_body_prefers_tool_descriptions() {
        let mut tables = TranslationTables::default();
        tables
            .tool_about
            .insert("BLESSED PICK".to_string(), "以圣光敲击。".to_string());
        tables
            .item_tooltips
            .insert("STRIKES TWICE".to_string(), "物品版本".to_string());
        let (translated, strategy) =
            translate_tooltip_body(&tables, "BLESSED PICK", "STRIKES TWICE").expect("hit");
        assert_eq!(translated, "以圣光敲击。");
        assert_eq!(strategy, TooltipBodyStrategy::ToolAbout);
    }

    #[test]
    fn tooltip_headers_try_tools_items_then_achievements() {
        let mut tables = TranslationTables::default();
        tables
            .achievements
            .insert("SPELUNKER".to_string(), "洞穴探险家".to_string());
        let (translated, strategy) =
            translate_tooltip_header(&tables, "SPELUNKER").expect("hit");
        assert_eq!(translated, "洞穴探险家");
        assert_eq!(strategy, TooltipHeaderStrategy::Achievement);
    }
}
