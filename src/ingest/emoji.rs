//! Emoji presentation flags and named emoji sequences

use crate::data::types::{CodePoint, Sequence};
use crate::ingest::CharTable;
use crate::ingest::ucd::parse_range;
use anyhow::{Context, Result};
use regex::Regex;
use roaring::RoaringBitmap;
use std::sync::LazyLock;
use tracing::warn;

/// Regional indicators carry the property but only render as flag pairs
const REGIONAL_INDICATOR_START: CodePoint = 0x1F1E6;

static PRESENTATION_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([0-9A-F.]+) *; Emoji_Presentation\b").ok());

static SEQUENCE_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-F.]+(?: [0-9A-F.]+)+) *;([^;]+);([^#]+)# *(E[0-9.]+)").ok()
});

/// `emoji-data.txt`: code points with default emoji presentation
pub fn parse_emoji_presentation(text: &str) -> Result<RoaringBitmap> {
    let mut emoji = RoaringBitmap::new();
    let Some(line_re) = PRESENTATION_LINE.as_ref() else {
        return Ok(emoji);
    };

    for (idx, line) in text.lines().enumerate() {
        let Some(caps) = line_re.captures(line) else { continue };
        let (first, last) = parse_range(&caps[1]).with_context(|| format!("emoji-data.txt line {}", idx + 1))?;
        if first == REGIONAL_INDICATOR_START {
            continue;
        }
        emoji.insert_range(first..=last);
    }
    Ok(emoji)
}

/// Flag every table record that has default emoji presentation
pub fn mark_emoji(emoji: &RoaringBitmap, table: &mut CharTable) {
    for code in emoji {
        if let Some(record) = table.get_mut(code) {
            record.is_emoji = true;
        }
    }
}

/// `emoji-sequences.txt` and `emoji-zwj-sequences.txt`.
///
/// Single code points and ranges are skipped; they are plain characters.
pub fn parse_sequences(text: &str) -> Vec<Sequence> {
    let Some(line_re) = SEQUENCE_LINE.as_ref() else {
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| line_re.captures(line))
        .filter_map(|caps| {
            let codes: Option<Vec<CodePoint>> = caps[1]
                .split(' ')
                .map(|hex| u32::from_str_radix(hex, 16).ok())
                .collect();
            let Some(codes) = codes else {
                warn!(line = &caps[0], "skipping sequence with unparseable codes");
                return None;
            };
            Some(Sequence {
                codes,
                name: caps[3].trim().to_uppercase().replace(r"\X{23}", "#"),
                kind: Some(caps[2].trim().replace('_', " ")),
                age: Some(caps[4].to_string()),
            })
        })
        .collect()
}
