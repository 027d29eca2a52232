//! Unihan readings and variants for CJK ideographs

use crate::data::types::CodePoint;
use crate::ingest::CharTable;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PINLU_FREQUENCY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\(\d+\)").ok());
static CODE_REF: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"U\+([0-9A-F]+)").ok());

/// `U+4E00<TAB>kDefinition<TAB>one; a, an; alone`
fn unihan_fields(line: &str) -> Option<(CodePoint, &str, &str)> {
    if line.starts_with('#') {
        return None;
    }
    let mut parts = line.splitn(3, '\t');
    let code = parts.next()?.strip_prefix("U+")?;
    let code = u32::from_str_radix(code, 16).ok()?;
    Some((code, parts.next()?, parts.next()?.trim()))
}

/// Pinyin readings of one field, in field order
fn pinyin_readings(field: &str, value: &str) -> Vec<String> {
    match field {
        "kHanyuPinlu" => {
            let stripped = match PINLU_FREQUENCY.as_ref() {
                Some(re) => re.replace_all(value, "").into_owned(),
                None => value.to_string(),
            };
            stripped.split_whitespace().map(str::to_string).collect()
        }
        // `10019.020:tiàn,diàn 74801.030:tiàn`
        "kHanyuPinyin" => value
            .split_whitespace()
            .filter_map(|entry| entry.rsplit_once(':').map(|(_, readings)| readings))
            .flat_map(|readings| readings.split(','))
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
        "kMandarin" => value.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

const PINYIN_ORDER: [&str; 3] = ["kHanyuPinlu", "kHanyuPinyin", "kMandarin"];

/// `Unihan_Readings.txt`: pinyin, definition, Japanese, Korean and
/// Vietnamese readings
pub fn apply_readings(text: &str, table: &mut CharTable) {
    let mut pinyin: BTreeMap<CodePoint, [Vec<String>; 3]> = BTreeMap::new();

    for line in text.lines() {
        let Some((code, field, value)) = unihan_fields(line) else { continue };
        let Some(record) = table.get_mut(code) else { continue };

        match field {
            "kDefinition" => record.definition = Some(value.to_string()),
            "kJapaneseKun" => record.japanese_kun = Some(value.to_lowercase()),
            "kJapaneseOn" => record.japanese_on = Some(value.to_lowercase()),
            "kKorean" => record.korean = Some(value.to_lowercase()),
            "kVietnamese" => record.vietnamese = Some(value.to_string()),
            _ => {
                if let Some(slot) = PINYIN_ORDER.iter().position(|f| *f == field) {
                    pinyin.entry(code).or_default()[slot] = pinyin_readings(field, value);
                }
            }
        }
    }

    for (code, sources) in pinyin {
        let Some(record) = table.get_mut(code) else { continue };
        let mut readings: Vec<String> = Vec::new();
        for reading in sources.into_iter().flatten() {
            if !readings.contains(&reading) {
                readings.push(reading);
            }
        }
        if !readings.is_empty() {
            record.pinyin = Some(readings.join(" "));
        }
    }
}

const VARIANT_FIELDS: [&str; 4] = [
    "kTraditionalVariant",
    "kSimplifiedVariant",
    "kSemanticVariant",
    "kZVariant",
];

/// `Unihan_Variants.txt`: orthographic variants, ascending and unique
pub fn apply_variants(text: &str, table: &mut CharTable) {
    let Some(code_ref) = CODE_REF.as_ref() else { return };

    for line in text.lines() {
        let Some((code, field, value)) = unihan_fields(line) else { continue };
        if !VARIANT_FIELDS.contains(&field) {
            continue;
        }
        let Some(record) = table.get_mut(code) else { continue };
        let refs = code_ref
            .captures_iter(value)
            .filter_map(|c| u32::from_str_radix(&c[1], 16).ok())
            .filter(|&v| v != code);
        record.variant_codes.extend(refs);
        record.variant_codes.sort_unstable();
        record.variant_codes.dedup();
    }
}

/// Make variants symmetric and share pinyin across them.
///
/// Each character picks up the readings of its variants, and every variant
/// lists the character back.
pub fn close_variants(table: &mut CharTable) {
    // Visited in code order; back links added earlier are seen by later codes
    let codes: Vec<CodePoint> = table.records().map(|r| r.code).collect();

    for code in codes {
        let variants = match table.get(code) {
            Some(record) if !record.variant_codes.is_empty() => record.variant_codes.clone(),
            _ => continue,
        };
        let mut merged: Vec<String> = table
            .get(code)
            .and_then(|r| r.pinyin.as_deref())
            .map(|p| p.split(' ').map(str::to_string).collect())
            .unwrap_or_default();

        for &variant in &variants {
            let Some(other) = table.get_mut(variant) else { continue };
            if let Some(readings) = other.pinyin.as_deref() {
                for reading in readings.split(' ') {
                    if !merged.iter().any(|r| r == reading) {
                        merged.push(reading.to_string());
                    }
                }
            }
            if !other.variant_codes.contains(&code) {
                other.variant_codes.push(code);
                other.variant_codes.sort_unstable();
            }
        }

        if let Some(record) = table.get_mut(code)
            && !merged.is_empty()
        {
            record.pinyin = Some(merged.join(" "));
        }
    }
}
