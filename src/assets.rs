//! Resource-pack file access: the translation tables (delimited records),
//! the atlas character set, and the packed font texture.
//!
//! Every loader degrades instead of failing the caller: a missing or
//! malformed file logs and yields an empty result, and the patch falls back
//! to the host's untranslated rendering.

use image::ImageReader;
use log::warn;
use std::error::Error;
use std::fs;
use std::path::Path;

/// Ordered character set of the packed font atlas, one long UTF-8 string.
pub const CHARSET_FILE: &str = "charset.txt";
/// Packed font atlas texture.
pub const ATLAS_FILE: &str = "font.png";

/// Reads a delimited-record file, or logs and returns no records when the
/// file is absent or unreadable.
#[must_use]
pub fn read_records(path: &Path) -> Vec<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => parse_records(&content),
        Err(e) => {
            warn!("translation file {} not loaded: {e}", path.display());
            Vec::new()
        }
    }
}

/// Splits file content into records of comma-separated fields.
///
/// Standard quoting applies: a `"`-delimited field may contain commas,
/// doubled quotes (`""` for a literal quote), and newlines, so one record
/// may span several physical lines. Blank records are dropped.
#[must_use]
pub fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_record(&mut records, &mut fields, &mut field);
            }
            _ => field.push(c),
        }
    }
    flush_record(&mut records, &mut fields, &mut field);
    records
}

fn flush_record(records: &mut Vec<Vec<String>>, fields: &mut Vec<String>, field: &mut String) {
    fields.push(std::mem::take(field));
    let record = std::mem::take(fields);
    // A record that is one whitespace-only field is a blank line.
    if record.len() > 1 || !record[0].trim().is_empty() {
        records.push(record);
    }
}

/// Loads the atlas character set. Trailing line endings are stripped so an
/// editor-added final newline cannot shift glyph indices.
pub fn load_charset(path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read_to_string(path)?;
    Ok(content.trim_end_matches(['\r', '\n']).to_string())
}

/// Decodes the atlas texture far enough to learn its pixel dimensions.
pub fn texture_dimensions(path: &Path) -> Result<(u32, u32), Box<dyn Error>> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok((img.width(), img.height()))
}
