//! Patch orchestration: owns the loaded tables, templates, atlas, and the
//! live layout sessions, and exposes one handler per host event. A thin
//! host shim forwards its dialogue/tooltip callbacks here and mirrors the
//! mutated slot positions back into the scene.

use crate::text::breaks;
use crate::text::width::ScriptMode;
use crate::translation::chain::{self, SpeechStrategy};
use crate::translation::tables::TranslationTables;
use crate::translation::template::SpeechTemplates;
use crate::ui::font::{FontAtlas, GlyphRegion};
use crate::ui::host::{ChatBox, RevealEvent, TooltipWindow};
use crate::ui::layout::{self, DialogueLayout, TooltipLayout};
use crate::{assets, config};
use log::{debug, info, warn};
use std::error::Error;
use std::path::Path;

/// Visual line count of a dialogue screen.
pub const CHAT_SCREEN_LINES: usize = 3;

/// A dialogue line after translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedSpeech {
    /// Translated (or original) line, break markers inserted.
    pub line: String,
    /// Translated (or original) speaker display name.
    pub speaker: String,
    /// Whether the line is ancient script.
    pub ancient: bool,
}

pub struct LocalizationPatch {
    tables: TranslationTables,
    templates: SpeechTemplates,
    atlas: FontAtlas,
    pub dialogue: DialogueLayout,
    pub tooltip: TooltipLayout,
}

/// Installs the logger, then tightens the runtime level from config once it
/// is loaded. Call before `config::load()`.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default until the config file is read.
    log::set_max_level(log::LevelFilter::Warn);
}

impl LocalizationPatch {
    /// Loads every resource under the configured pack root inside
    /// `patch_dir`. Table files may be missing (their lookups just miss);
    /// the atlas is required.
    pub fn init(patch_dir: &Path) -> Result<Self, Box<dyn Error>> {
        let config = config::get();
        log::set_max_level(config.log_level.as_level_filter());
        let root = patch_dir.join(config.resource_dir());
        info!("loading localization resources from {}", root.display());

        let tables = TranslationTables::load(&root);
        let templates = SpeechTemplates::build(&tables.speech);
        let atlas = FontAtlas::load(
            &root.join(assets::CHARSET_FILE),
            &root.join(assets::ATLAS_FILE),
        )?;

        Ok(Self::assemble(tables, templates, atlas))
    }

    /// Builds a patch from already loaded parts. Tests and tooling use
    /// this to avoid the filesystem.
    #[must_use]
    pub fn assemble(
        tables: TranslationTables,
        templates: SpeechTemplates,
        atlas: FontAtlas,
    ) -> Self {
        Self {
            tables,
            templates,
            atlas,
            dialogue: DialogueLayout::new(),
            tooltip: TooltipLayout::new(),
        }
    }

    /* ---------------- dialogue ---------------- */

    /// Structural initialization of a fresh dialogue box: capture the
    /// baselines first (restyle only moves Y, but the order keeps the
    /// captured X untouched by construction), then restyle. Awake fires
    /// once per box instance, so the capture re-seeds here and nowhere
    /// else.
    pub fn on_chat_box_awake(&mut self, chat_box: &mut ChatBox) {
        self.dialogue.reseed_baselines(chat_box);
        layout::restyle_chat_box(chat_box);
    }

    /// Translates one dialogue line and its speaker name. The host calls
    /// this before it starts typing the line.
    #[must_use]
    pub fn on_speech_created(&self, speaker: &str, line: &str) -> TranslatedSpeech {
        debug!("speech from {speaker:?}: {line:?}");
        let ancient = ScriptMode::detect(line) == ScriptMode::Ancient;

        let mut out_line = line.to_string();
        if self.tables.should_skip(line) {
            debug!("line skipped by filter");
        } else if let Some((translated, strategy)) =
            chain::translate_speech_line(&self.tables, &self.templates, speaker, line)
        {
            out_line = breaks::insert_dialogue_breaks(&translated, ancient);
            if strategy == SpeechStrategy::PlaceholderTemplate {
                chain::apply_wrong_name_fix(&self.tables, speaker, &mut out_line);
            }
            info!("line translated ({}): {out_line:?}", strategy.label());
        }

        let out_speaker = match chain::translate_speaker_name(&self.tables, speaker) {
            Some(translated) => {
                info!("speaker renamed to {translated:?}");
                translated
            }
            None => speaker.to_string(),
        };

        TranslatedSpeech {
            line: out_line,
            speaker: out_speaker,
            ancient,
        }
    }

    /// A dialogue opened: fresh pen, and the (already translated) speaker
    /// name gets its label layout.
    pub fn on_chat_started(&mut self, chat_box: &mut ChatBox, speaker_name: &str) {
        self.dialogue.reset_tracking();
        layout::layout_name(chat_box, speaker_name);
    }

    /// The dialogue advanced to its next line.
    pub fn on_chat_advanced(&mut self, chat_box: &mut ChatBox, speaker_name: &str, instant: bool) {
        self.dialogue.reset_tracking();
        layout::layout_name(chat_box, speaker_name);
        if instant {
            self.dialogue.layout_all_slots(chat_box);
        }
    }

    /// One typewriter reveal step. Instant mode skips per-glyph work; the
    /// batch pass after typing covers it.
    pub fn on_letter_applied(&mut self, chat_box: &mut ChatBox, event: &RevealEvent, instant: bool) {
        if instant {
            return;
        }
        self.dialogue.on_letter_applied(chat_box, event);
    }

    /// The host finished binding a whole screen of glyphs.
    pub fn on_typing_finished(&mut self, chat_box: &mut ChatBox, instant: bool) {
        if instant {
            self.dialogue.layout_all_slots(chat_box);
        }
    }

    /// The dialogue closed, possibly mid-reveal: drop tracking state and
    /// hand the slots back in their pristine positions.
    pub fn on_chat_closed(&mut self, chat_box: &mut ChatBox) {
        self.dialogue.reset_tracking();
        self.dialogue.restore_slot_positions(chat_box);
    }

    /* ---------------- tooltip ---------------- */

    /// Translates a tooltip's header and body. The body is re-broken
    /// unconditionally at the end so untranslated text wraps too; the pass
    /// is idempotent over markers it already inserted.
    #[must_use]
    pub fn translate_tooltip(&self, header: &str, about: &str) -> (String, String) {
        let mut out_about = about.to_string();
        if let Some((translated, strategy)) =
            chain::translate_tooltip_body(&self.tables, header, about)
        {
            out_about = breaks::insert_tooltip_breaks(&translated);
            info!("tooltip body translated ({})", strategy.label());
        }

        let out_header = match chain::translate_tooltip_header(&self.tables, header) {
            Some((translated, strategy)) => {
                info!("tooltip header translated ({})", strategy.label());
                translated
            }
            None => header.to_string(),
        };

        out_about = breaks::insert_tooltip_breaks(&out_about);
        (out_header, out_about)
    }

    /// The tooltip opened with its final strings bound: capture bases on
    /// first use, then lay out header and body.
    pub fn on_tooltip_opened(&mut self, tooltip: &mut TooltipWindow, header: &str, about: &str) {
        self.tooltip.initialize(tooltip);
        self.tooltip.layout_header(tooltip, header);
        self.tooltip.layout_about(tooltip, about);
    }

    /* ---------------- glyph fetch ---------------- */

    /// The host asks for a glyph. `None` sends it back to its own font,
    /// which also serves every ancient-script request.
    pub fn pull_glyph(&mut self, letter: char, mode: ScriptMode) -> Option<GlyphRegion> {
        let region = self.atlas.glyph_region(letter, mode);
        if region.is_none() && mode == ScriptMode::Normal {
            warn!("glyph {letter:?} falls back to the host font");
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::breaks::LINE_BREAK_CHAR;
    use crate::translation::template::NAME_PLACEHOLDER_SPEAKER;

    fn patch_with_tables(tables: TranslationTables) -> LocalizationPatch {
        let templates = SpeechTemplates::build(&tables.speech);
        LocalizationPatch::assemble(tables, templates, FontAtlas::new("你好", 1001, 101))
    }

    fn speech_entry(tables: &mut TranslationTables, speaker: &str, line: &str, value: &str) {
        tables
            .speech
            .entry(speaker.to_string())
            .or_default()
            .insert(line.to_string(), value.to_string());
    }

    #[test]
    fn translated_lines_come_back_broken_and_named() {
        let mut tables = TranslationTables::default();
        speech_entry(&mut tables, "PA", "HELLO.", "你好。");
        tables
            .speaker_names
            .insert("PA".to_string(), "老爹".to_string());
        let patch = patch_with_tables(tables);

        let speech = patch.on_speech_created("PA", "HELLO.");
        assert_eq!(speech.line, "你好。");
        assert_eq!(speech.speaker, "老爹");
        assert!(!speech.ancient);
    }

    #[test]
    fn long_translations_gain_break_markers() {
        let mut tables = TranslationTables::default();
        let long = "这是一段非常长的对话文本它必须在某个边界处被折行才能放进对话框里".repeat(2);
        speech_entry(&mut tables, "PA", "LONG.", &long);
        let patch = patch_with_tables(tables);

        let speech = patch.on_speech_created("PA", "LONG.");
        assert!(speech.line.contains(LINE_BREAK_CHAR));
    }

    #[test]
    fn misses_pass_the_original_through() {
        let patch = patch_with_tables(TranslationTables::default());
        let speech = patch.on_speech_created("PA", "NEVER SEEN.");
        assert_eq!(speech.line, "NEVER SEEN.");
        assert_eq!(speech.speaker, "PA");
    }

    #[test]
    fn ancient_lines_are_flagged_and_left_unbroken() {
        let mut tables = TranslationTables::default();
        let long_ancient = format!("]{}", "OLD WORDS ".repeat(10));
        speech_entry(&mut tables, "PA", &long_ancient, &long_ancient[1..]);
        let patch = patch_with_tables(tables);

        let speech = patch.on_speech_created("PA", &long_ancient);
        assert!(speech.ancient);
        assert!(!speech.line.contains(LINE_BREAK_CHAR));
    }

    #[test]
    fn template_matches_take_the_wrong_name_pass() {
        let mut tables = TranslationTables::default();
        speech_entry(
            &mut tables,
            chain::WRONG_NAME_SPEAKER,
            "WELCOME, {0}!",
            "欢迎，{0}！",
        );
        speech_entry(&mut tables, NAME_PLACEHOLDER_SPEAKER, "{0}", "{0}");
        tables
            .wrong_names
            .insert("TRAVELER".to_string(), "特拉维勒".to_string());
        let patch = patch_with_tables(tables);

        let speech = patch.on_speech_created(chain::WRONG_NAME_SPEAKER, "WELCOME, TRAVELER!");
        assert_eq!(speech.line, "欢迎，特拉维勒！");
    }

    #[test]
    fn script_blobs_skip_translation_entirely() {
        let mut tables = TranslationTables::default();
        let script = "run:iplay idle:break:run@";
        speech_entry(&mut tables, "PA", script, "不应出现");
        let patch = patch_with_tables(tables);

        let speech = patch.on_speech_created("PA", script);
        assert_eq!(speech.line, script);
    }

    #[test]
    fn tooltip_translation_wraps_even_without_a_match() {
        let patch = patch_with_tables(TranslationTables::default());
        let long_about = "AN UNTRANSLATED TOOLTIP BODY THAT RUNS WELL PAST THE PANEL BUDGET \
                          AND THEN KEEPS GOING FOR A WHILE LONGER";
        let (header, about) = patch.translate_tooltip("WIDGET", long_about);
        assert_eq!(header, "WIDGET");
        assert!(about.contains(LINE_BREAK_CHAR));
    }

    #[test]
    fn matched_tooltip_bodies_survive_the_double_break_pass() {
        let mut tables = TranslationTables::default();
        // Long enough that the first break pass inserts markers; the
        // unconditional second pass then sees an already broken body.
        let body = "用来挖掘的工具据说蕴含着圣光的力量每一次挥动都会敲碎最坚硬的岩石".repeat(2);
        tables.tool_about.insert("PICK".to_string(), body);
        tables.tools.insert("PICK".to_string(), "鹤嘴锄".to_string());
        let patch = patch_with_tables(tables);

        let (header, about) = patch.translate_tooltip("PICK", "A DIGGING TOOL.");
        assert_eq!(header, "鹤嘴锄");
        assert!(about.contains(LINE_BREAK_CHAR));
        // Markers already placed must neither move nor double.
        assert_eq!(breaks::insert_tooltip_breaks(&about), about);
    }

    #[test]
    fn glyph_requests_hit_the_atlas_or_decline() {
        let mut patch = patch_with_tables(TranslationTables::default());
        assert!(patch.pull_glyph('你', ScriptMode::Normal).is_some());
        assert!(patch.pull_glyph('Z', ScriptMode::Normal).is_none());
        assert!(patch.pull_glyph('你', ScriptMode::Ancient).is_none());
    }
}
