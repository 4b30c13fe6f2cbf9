//! The translation dictionaries and their record-file loaders.
//!
//! Each table is a delimited-record file in the resource pack. The common
//! shape is 3 fields: a context column, the original text (the lookup key),
//! and the translation. Dialogue and tooltip translations are uppercased at
//! load time to match the host font; tool descriptions keep their case.
//!
//! Context-column keys come in two encodings:
//! - speech rows pack `scene-event-SPEAKER-line`; the speaker key sits
//!   between the second and third dash;
//! - generic rows pack `NAME-line`; the key is everything before the first
//!   dash.

use crate::assets;
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::path::Path;

pub type Table = FxHashMap<String, String>;
pub type SpeakerTable = FxHashMap<String, Table>;

const SPEECH_FILE: &str = "speech.csv";
const SPEAKER_NAME_FILE: &str = "speecher.csv";
const GENERIC_INFO_FILE: &str = "generic-info.csv";
const GENERIC_NAME_FILE: &str = "generic-name.csv";
const SIGNPOST_INFO_FILE: &str = "signpost-info-bundle.csv";
const TOOL_FILE: &str = "tool.csv";
const TOOL_ABOUT_FILE: &str = "tool-about.csv";
const ITEM_FILE: &str = "item.csv";
const ITEM_TOOLTIP_FILE: &str = "item-tooltip.csv";
const ACHIEVEMENT_NAME_FILE: &str = "achievement-name.csv";
const ACHIEVEMENT_HINT_FILE: &str = "achievement-hint.csv";
const ACHIEVEMENT_ABOUT_FILE: &str = "achievement-about.csv";
const GUEST_INFO_FILE: &str = "guest-info.csv";
const GUEST_NAME_FILE: &str = "guest-name.csv";
const WRONG_NAME_FILE: &str = "zaegul-wrong-name.csv";

/// Lines carrying this prefix are leftover development-tool paths, not
/// prose, and must pass through untranslated.
const DEV_TOOL_PATH_PREFIX: &str = "D:/Archive/Code/Tools/TELEPLAY 2 For Unity";

/// Colon-delimited opcode fragments that only occur inside embedded
/// behavior scripts.
const SCRIPT_OPCODE_MARKERS: [&str; 3] = [":break:", ":iplay ", ":goto "];

#[derive(Debug, Default)]
pub struct TranslationTables {
    pub speech: SpeakerTable,
    pub speaker_names: Table,
    pub generic_info: SpeakerTable,
    pub generic_names: Table,
    pub signpost_info: Table,
    pub tools: Table,
    pub tool_about: Table,
    pub items: Table,
    pub item_tooltips: Table,
    pub achievements: Table,
    pub achievement_hints: Table,
    pub achievement_about: Table,
    pub guest_info: SpeakerTable,
    pub guest_names: Table,
    pub wrong_names: Table,
}

impl TranslationTables {
    /// Loads every table from `root`. Missing files log and leave their
    /// table empty; nothing here is fatal.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let tables = Self {
            speech: speaker_table(&assets::read_records(&root.join(SPEECH_FILE))),
            speaker_names: plain_table(&assets::read_records(&root.join(SPEAKER_NAME_FILE)), true),
            generic_info: generic_table(&assets::read_records(&root.join(GENERIC_INFO_FILE))),
            generic_names: plain_table(&assets::read_records(&root.join(GENERIC_NAME_FILE)), true),
            signpost_info: plain_table(&assets::read_records(&root.join(SIGNPOST_INFO_FILE)), true),
            tools: plain_table(&assets::read_records(&root.join(TOOL_FILE)), true),
            tool_about: header_table(&assets::read_records(&root.join(TOOL_ABOUT_FILE))),
            items: plain_table(&assets::read_records(&root.join(ITEM_FILE)), true),
            item_tooltips: plain_table(&assets::read_records(&root.join(ITEM_TOOLTIP_FILE)), true),
            achievements: plain_table(&assets::read_records(&root.join(ACHIEVEMENT_NAME_FILE)), true),
            achievement_hints: plain_table(
                &assets::read_records(&root.join(ACHIEVEMENT_HINT_FILE)),
                true,
            ),
            achievement_about: plain_table(
                &assets::read_records(&root.join(ACHIEVEMENT_ABOUT_FILE)),
                true,
            ),
            guest_info: generic_table(&assets::read_records(&root.join(GUEST_INFO_FILE))),
            guest_names: plain_table(&assets::read_records(&root.join(GUEST_NAME_FILE)), true),
            wrong_names: plain_table(&assets::read_records(&root.join(WRONG_NAME_FILE)), true),
        };
        info!(
            "translation tables loaded from {}: {} speakers, {} generic, {} signposts, {} items",
            root.display(),
            tables.speech.len(),
            tables.generic_info.len(),
            tables.signpost_info.len(),
            tables.items.len()
        );
        tables
    }

    /// True for lines that must bypass lookup entirely: empty strings,
    /// leftover tool paths, and embedded behavior scripts.
    #[must_use]
    pub fn should_skip(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        if text.starts_with(DEV_TOOL_PATH_PREFIX) {
            return true;
        }
        SCRIPT_OPCODE_MARKERS.iter().any(|m| text.contains(m))
    }
}

/// Key = field 1, value = field 2 (uppercased on request). A 2-field row
/// maps the key to itself, marking the line as "known, render as-is".
fn plain_table(records: &[Vec<String>], uppercase: bool) -> Table {
    let mut table = Table::default();
    for record in records {
        if record.len() >= 3 {
            let key = &record[1];
            if key.is_empty() || table.contains_key(key) {
                continue;
            }
            let value = if uppercase {
                record[2].to_uppercase()
            } else {
                record[2].clone()
            };
            table.insert(key.clone(), value);
        } else if record.len() == 2 {
            let key = &record[1];
            if !key.is_empty() && !table.contains_key(key) {
                table.insert(key.clone(), key.clone());
            }
        } else {
            warn!("translation row with {} fields skipped", record.len());
        }
    }
    table
}

/// Speech rows: outer key extracted from the context column, inner key =
/// field 1, value uppercased. First entry wins on duplicates.
fn speaker_table(records: &[Vec<String>]) -> SpeakerTable {
    let mut table = SpeakerTable::default();
    for record in records {
        if record.len() < 3 {
            warn!("speech row with {} fields skipped", record.len());
            continue;
        }
        // An empty speaker key is legal; narrator lines carry one.
        let Some(speaker) = extract_speaker_key(&record[0]) else {
            continue;
        };
        let line = &record[1];
        if line.is_empty() {
            continue;
        }
        table
            .entry(speaker.to_string())
            .or_default()
            .entry(line.clone())
            .or_insert_with(|| record[2].to_uppercase());
    }
    table
}

/// Generic/guest rows: outer key = context column up to the first dash.
fn generic_table(records: &[Vec<String>]) -> SpeakerTable {
    let mut table = SpeakerTable::default();
    for record in records {
        if record.len() < 3 {
            warn!("generic row with {} fields skipped", record.len());
            continue;
        }
        let Some(name) = extract_leading_key(&record[0]) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let line = &record[1];
        if line.is_empty() {
            continue;
        }
        table
            .entry(name.to_string())
            .or_default()
            .entry(line.clone())
            .or_insert_with(|| record[2].to_uppercase());
    }
    table
}

/// Tool descriptions: key = context column up to the first dash, value kept
/// in original case.
fn header_table(records: &[Vec<String>]) -> Table {
    let mut table = Table::default();
    for record in records {
        if record.len() < 3 {
            warn!("tool-about row with {} fields skipped", record.len());
            continue;
        }
        let Some(key) = extract_leading_key(&record[0]) else {
            continue;
        };
        if key.is_empty() || table.contains_key(key) {
            continue;
        }
        table.insert(key.to_string(), record[2].clone());
    }
    table
}

/// `scene-event-SPEAKER-line` context column: the slice between the second
/// and third dash. Rows with fewer than three dashes carry no speaker.
fn extract_speaker_key(field: &str) -> Option<&str> {
    let first = field.find('-')?;
    let second = field[first + 1..].find('-')? + first + 1;
    let third = field[second + 1..].find('-')? + second + 1;
    Some(&field[second + 1..third])
}

/// `NAME-line` context column: everything before the first dash.
fn extract_leading_key(field: &str) -> Option<&str> {
    field.find('-').map(|i| &field[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    #[test]
    fn speaker_key_sits_between_second_and_third_dash() {
        assert_eq!(
            extract_speaker_key("Pa-Event2-PA DARROW-DEAR PA"),
            Some("PA DARROW")
        );
        assert_eq!(extract_speaker_key("Pa-Event2-NOKEY"), None);
        assert_eq!(extract_speaker_key("a-b--x"), Some(""));
    }

    #[test]
    fn leading_key_stops_at_the_first_dash() {
        assert_eq!(
            extract_leading_key("BUNNY-COME BY THE*crocasino*SOMETIME"),
            Some("BUNNY")
        );
        assert_eq!(extract_leading_key("NODASH"), None);
    }

    #[test]
    fn plain_tables_uppercase_and_keep_the_first_entry() {
        let table = plain_table(
            &records(&[
                &["0", "OLD KEY", "new value"],
                &["1", "OLD KEY", "other value"],
                &["2", "SELF"],
                &["3"],
            ]),
            true,
        );
        assert_eq!(table.get("OLD KEY").map(String::as_str), Some("NEW VALUE"));
        assert_eq!(table.get("SELF").map(String::as_str), Some("SELF"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn tool_about_values_keep_their_case() {
        let table = header_table(&records(&[&[
            "BLESSED PICK-SUPPOSEDLY STRIKING",
            "ignored",
            "Strikes with holy light. . .",
        ]]));
        assert_eq!(
            table.get("BLESSED PICK").map(String::as_str),
            Some("Strikes with holy light. . .")
        );
    }

    #[test]
    fn speech_rows_group_by_speaker() {
        let table = speaker_table(&records(&[
            &["Pa-Event2-PA DARROW-DEAR PA", "DEAR PA LINE", "亲爱的爸爸"],
            &["Pa-Event2-PA DARROW-OTHER", "OTHER LINE", "其他"],
            &["Broken-NoSpeaker", "LOST", "迷路"],
        ]));
        let pa = table.get("PA DARROW").expect("speaker bucket");
        assert_eq!(pa.len(), 2);
        assert_eq!(pa.get("DEAR PA LINE").map(String::as_str), Some("亲爱的爸爸"));
        assert!(!table.contains_key("Broken"));
    }

    #[test]
    fn skip_filter_catches_paths_and_scripts() {
        let tables = TranslationTables::default();
        assert!(tables.should_skip(""));
        assert!(tables.should_skip("D:/Archive/Code/Tools/TELEPLAY 2 For Unity/x"));
        assert!(tables.should_skip("ifxrangeless 18,explode:ifxrangeless 64,run:iplay idle:break:run@"));
        assert!(!tables.should_skip("AN ORDINARY LINE."));
    }
}
