//! Parsers for the core UCD text files.
//!
//! All of them share the same line shape: `;`-separated fields, `#` starts
//! a comment, and code points are bare upper-case hex, optionally written
//! as a `FIRST..LAST` range.

use crate::data::types::{Block, CharRecord, CodePoint, to_hex};
use crate::ingest::CharTable;
use anyhow::{Context, Result, bail};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Name given to every line feed, whatever its aliases say
const LINE_FEED_NAME: &str = "<control> LINE FEED";

static HEX_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[0-9A-F]+\b").ok());

/// Data fields of a line, with the comment stripped; `None` for blank lines
fn fields(line: &str) -> Option<Vec<&str>> {
    let data = line.split('#').next().unwrap_or("").trim();
    if data.is_empty() {
        return None;
    }
    Some(data.split(';').map(str::trim).collect())
}

fn parse_code(text: &str) -> Result<CodePoint> {
    u32::from_str_radix(text.trim(), 16).with_context(|| format!("bad code point {:?}", text))
}

/// `0041` or `0041..005A`
pub fn parse_range(text: &str) -> Result<(CodePoint, CodePoint)> {
    match text.split_once("..") {
        Some((first, last)) => Ok((parse_code(first)?, parse_code(last)?)),
        None => {
            let code = parse_code(text)?;
            Ok((code, code))
        }
    }
}

/// One `NameAliases.txt` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAlias {
    pub alias: String,
    pub kind: String,
}

/// `NameAliases.txt`: aliases per code point, in file order
pub fn parse_name_aliases(text: &str) -> Result<FxHashMap<CodePoint, Vec<NameAlias>>> {
    let mut aliases: FxHashMap<CodePoint, Vec<NameAlias>> = FxHashMap::default();
    for (idx, line) in text.lines().enumerate() {
        let Some(f) = fields(line) else { continue };
        if f.len() < 3 {
            bail!("NameAliases.txt line {}: expected 3 fields", idx + 1);
        }
        let code = parse_code(f[0]).with_context(|| format!("NameAliases.txt line {}", idx + 1))?;
        aliases.entry(code).or_default().push(NameAlias {
            alias: f[1].to_string(),
            kind: f[2].to_string(),
        });
    }
    Ok(aliases)
}

/// Display name for a control character.
///
/// Takes the first alias that is not an abbreviation, then prefers the
/// alias whose word initials spell the first abbreviation (`LF` picks
/// `LINE FEED` over `NEW LINE`).
pub fn control_name(code: CodePoint, aliases: &[NameAlias]) -> Option<String> {
    if code == 0x0A {
        return Some(LINE_FEED_NAME.to_string());
    }

    let full_names: Vec<&str> = aliases
        .iter()
        .filter(|a| a.kind != "abbreviation")
        .map(|a| a.alias.as_str())
        .collect();
    let abbreviation = aliases.iter().find(|a| a.kind == "abbreviation");

    let spelled = abbreviation.and_then(|abbr| {
        let pattern: String = std::iter::once("^".to_string())
            .chain(abbr.alias.chars().map(|c| format!(r"\b{}.+", regex::escape(&c.to_string()))))
            .collect();
        let re = Regex::new(&pattern).ok()?;
        full_names.iter().find(|name| re.is_match(name)).copied()
    });

    spelled
        .or_else(|| full_names.first().copied())
        .map(|name| format!("<control> {}", name))
}

/// Algorithmic name for a member of a `<..., First>` range, if it has one
fn range_member_name(label: &str, code: CodePoint) -> Option<String> {
    if label.starts_with("CJK Ideograph") {
        Some(format!("CJK UNIFIED IDEOGRAPH-{}", to_hex(code)))
    } else if label.starts_with("Tangut Ideograph") {
        Some(format!("TANGUT IDEOGRAPH-{}", to_hex(code)))
    } else if label.starts_with("Hangul Syllable") {
        hangul_syllable_name(code)
    } else {
        // Private use and surrogate ranges are synthesized at lookup time
        None
    }
}

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LEADS: [&str; 19] = [
    "G", "GG", "N", "D", "DD", "R", "M", "B", "BB", "S", "SS", "", "J", "JJ", "C", "K", "T", "P",
    "H",
];
const HANGUL_VOWELS: [&str; 21] = [
    "A", "AE", "YA", "YAE", "EO", "E", "YEO", "YE", "O", "WA", "WAE", "OE", "YO", "U", "WEO", "WE",
    "WI", "YU", "EU", "YI", "I",
];
const HANGUL_TRAILS: [&str; 28] = [
    "", "G", "GG", "GS", "N", "NJ", "NH", "D", "L", "LG", "LM", "LB", "LS", "LT", "LP", "LH", "M",
    "B", "BS", "S", "SS", "NG", "J", "C", "K", "T", "P", "H",
];

/// `HANGUL SYLLABLE GA` and friends, composed from jamo short names
pub fn hangul_syllable_name(code: CodePoint) -> Option<String> {
    let index = code.checked_sub(HANGUL_BASE)? as usize;
    let lead = HANGUL_LEADS.get(index / (21 * 28))?;
    let vowel = HANGUL_VOWELS[(index % (21 * 28)) / 28];
    let trail = HANGUL_TRAILS[index % 28];
    Some(format!("HANGUL SYLLABLE {}{}{}", lead, vowel, trail))
}

/// `UnicodeData.txt`: every assigned, named character.
///
/// Range pairs are expanded where members have algorithmic names; control
/// characters are named through `aliases`.
pub fn parse_unicode_data(
    text: &str,
    aliases: &FxHashMap<CodePoint, Vec<NameAlias>>,
    table: &mut CharTable,
) -> Result<usize> {
    let mut range_start: Option<(CodePoint, String)> = None;
    let mut count = 0;

    for (idx, line) in text.lines().enumerate() {
        let Some(f) = fields(line) else { continue };
        if f.len() < 3 {
            bail!("UnicodeData.txt line {}: expected at least 3 fields", idx + 1);
        }
        let code = parse_code(f[0]).with_context(|| format!("UnicodeData.txt line {}", idx + 1))?;
        let (name, category) = (f[1], f[2]);

        if let Some(label) = name.strip_prefix('<').and_then(|n| n.strip_suffix(", First>")) {
            range_start = Some((code, label.to_string()));
            continue;
        }
        if name.ends_with(", Last>") {
            let Some((first, label)) = range_start.take() else {
                bail!("UnicodeData.txt line {}: range end without start", idx + 1);
            };
            let mut expanded = 0;
            for member in first..=code {
                if let Some(member_name) = range_member_name(&label, member) {
                    table.insert(CharRecord::assigned(member, member_name, category));
                    expanded += 1;
                }
            }
            debug!(range = %label, expanded, "expanded range");
            count += expanded;
            continue;
        }

        let name = if name == "<control>" {
            let found = aliases.get(&code).map(Vec::as_slice).unwrap_or_default();
            control_name(code, found).unwrap_or_else(|| name.to_string())
        } else {
            name.to_string()
        };
        table.insert(CharRecord::assigned(code, name, category));
        count += 1;
    }

    Ok(count)
}

/// `DerivedAge.txt`: stamp each assigned character with its version
pub fn apply_derived_age(text: &str, table: &mut CharTable) -> Result<()> {
    for (idx, line) in text.lines().enumerate() {
        let Some(f) = fields(line) else { continue };
        if f.len() < 2 {
            bail!("DerivedAge.txt line {}: expected 2 fields", idx + 1);
        }
        let (first, last) = parse_range(f[0]).with_context(|| format!("DerivedAge.txt line {}", idx + 1))?;
        for record in table.range_mut(first, last) {
            record.age = Some(f[1].to_string());
        }
    }
    Ok(())
}

/// `Blocks.txt`
pub fn parse_blocks(text: &str) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(f) = fields(line) else { continue };
        if f.len() < 2 {
            bail!("Blocks.txt line {}: expected 2 fields", idx + 1);
        }
        let (first_code, last_code) =
            parse_range(f[0]).with_context(|| format!("Blocks.txt line {}", idx + 1))?;
        blocks.push(Block {
            first_code,
            last_code,
            name: f[1].to_string(),
        });
    }
    Ok(blocks)
}

/// `NamesList.txt`: cross references (`\tx` lines) and decompositions
/// (`\t#` lines) for characters already in the table
pub fn apply_names_list(text: &str, table: &mut CharTable) {
    let Some(hex_word) = HEX_WORD.as_ref() else { return };
    let mut current: Option<CodePoint> = None;

    for line in text.lines() {
        if let Some(m) = hex_word.find(line).filter(|m| m.start() == 0) {
            current = u32::from_str_radix(m.as_str(), 16).ok();
            continue;
        }
        let Some(record) = current.and_then(|code| table.get_mut(code)) else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("\tx ") {
            let refs = hex_word
                .find_iter(rest)
                .filter_map(|m| u32::from_str_radix(m.as_str(), 16).ok());
            record.cross_references.extend(refs);
            record.cross_references.sort_unstable();
        } else if let Some(rest) = line.strip_prefix("\t# ") {
            let decomposition: String = hex_word
                .find_iter(rest)
                .filter_map(|m| u32::from_str_radix(m.as_str(), 16).ok())
                .filter_map(char::from_u32)
                .collect();
            record.decomposition = Some(decomposition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIASES: &str = "\
# NameAliases
0000;NULL;control
0000;NUL;abbreviation
000A;LINE FEED;control
000A;NEW LINE;control
000A;LF;abbreviation
0085;NEXT LINE;control
0085;NEL;abbreviation
0009;CHARACTER TABULATION;control
0009;HORIZONTAL TABULATION;control
0009;HT;abbreviation
";

    #[test]
    fn test_control_names() {
        let aliases = parse_name_aliases(ALIASES).unwrap();
        assert_eq!(control_name(0x00, &aliases[&0x00]).unwrap(), "<control> NULL");
        assert_eq!(control_name(0x0A, &aliases[&0x0A]).unwrap(), "<control> LINE FEED");
        assert_eq!(control_name(0x85, &aliases[&0x85]).unwrap(), "<control> NEXT LINE");
        // HT spells HORIZONTAL TABULATION, not the first listed alias
        assert_eq!(
            control_name(0x09, &aliases[&0x09]).unwrap(),
            "<control> HORIZONTAL TABULATION"
        );
    }

    #[test]
    fn test_unicode_data_ranges_and_controls() {
        let text = "\
0000;<control>;Cc;0;BN;;;;;N;NULL;;;;
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
3400;<CJK Ideograph Extension A, First>;Lo;0;L;;;;;N;;;;;
3402;<CJK Ideograph Extension A, Last>;Lo;0;L;;;;;N;;;;;
AC00;<Hangul Syllable, First>;Lo;0;L;;;;;N;;;;;
AC01;<Hangul Syllable, Last>;Lo;0;L;;;;;N;;;;;
E000;<Private Use, First>;Co;0;L;;;;;N;;;;;
F8FF;<Private Use, Last>;Co;0;L;;;;;N;;;;;
";
        let aliases = parse_name_aliases(ALIASES).unwrap();
        let mut table = CharTable::default();
        let count = parse_unicode_data(text, &aliases, &mut table).unwrap();

        assert_eq!(count, 7);
        assert_eq!(table.get_mut(0).unwrap().name.as_deref(), Some("<control> NULL"));
        assert_eq!(
            table.get_mut(0x3401).unwrap().name.as_deref(),
            Some("CJK UNIFIED IDEOGRAPH-3401")
        );
        assert_eq!(
            table.get_mut(0xAC01).unwrap().name.as_deref(),
            Some("HANGUL SYLLABLE GAG")
        );
        assert!(table.get_mut(0xE000).is_none());
    }

    #[test]
    fn test_hangul_names() {
        assert_eq!(hangul_syllable_name(0xAC00).unwrap(), "HANGUL SYLLABLE GA");
        assert_eq!(hangul_syllable_name(0xD7A3).unwrap(), "HANGUL SYLLABLE HIH");
        assert!(hangul_syllable_name(0xABFF).is_none());
    }

    #[test]
    fn test_age_and_blocks() {
        let mut table = CharTable::default();
        table.insert(CharRecord::assigned(0x41, "LATIN CAPITAL LETTER A", "Lu"));
        table.insert(CharRecord::assigned(0x20AC, "EURO SIGN", "Sc"));

        apply_derived_age("0000..007F    ; 1.1 #  [128]\n20AC          ; 2.1 #\n", &mut table).unwrap();
        assert_eq!(table.get_mut(0x41).unwrap().age.as_deref(), Some("1.1"));
        assert_eq!(table.get_mut(0x20AC).unwrap().age.as_deref(), Some("2.1"));

        let blocks = parse_blocks("# Blocks\n0000..007F; Basic Latin\n0080..00FF; Latin-1 Supplement\n").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].first_code, 0x80);
        assert_eq!(blocks[1].name, "Latin-1 Supplement");
    }

    #[test]
    fn test_names_list() {
        let mut table = CharTable::default();
        table.insert(CharRecord::assigned(0xBD, "VULGAR FRACTION ONE HALF", "No"));

        let text = "\
@@\t0080\tLatin-1 Supplement\t00FF
00BD\tVULGAR FRACTION ONE HALF
\tx (fraction slash - 2044)
\tx (vulgar fraction one quarter - 00BC)
\t# <fraction> 0031 2044 0032
00BE\tVULGAR FRACTION THREE QUARTERS
\tx (vulgar fraction one half - 00BD)
";
        apply_names_list(text, &mut table);
        let half = table.get_mut(0xBD).unwrap();
        assert_eq!(half.cross_references, vec![0xBC, 0x2044]);
        assert_eq!(half.decomposition.as_deref(), Some("1\u{2044}2"));
    }
}
