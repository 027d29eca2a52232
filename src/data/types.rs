use crate::data::labels;
use crate::error::{Result, UcdError};
use serde::{Deserialize, Serialize};

/// A Unicode scalar value or surrogate code point, 0..=0x10FFFF
pub type CodePoint = u32;

/// Largest valid code point
pub const MAX_CODE: CodePoint = 0x10FFFF;

/// Number of code points in one chunk ("hundred")
pub const CHUNK_SIZE: u32 = 0x100;

/// Number of chunks covering the whole code space
pub const HUNDRED_COUNT: u32 = 0x1100;

/// Number of code points in one table row
pub const ROW_SIZE: u32 = 0x10;

/// Age assigned to synthesized noncharacters and supplementary private use
const EARLIEST_AGE: &str = "2.0";

/// Age assigned to synthesized BMP private use characters
const BMP_PRIVATE_USE_AGE: &str = "1.1";

/// Category given to every code point that is not assigned
pub const UNASSIGNED_CATEGORY: &str = "Cn";

/// Category of private use characters
pub const PRIVATE_USE_CATEGORY: &str = "Co";

/// Index of the chunk owning `code`
#[inline]
pub fn hundred_of(code: CodePoint) -> u32 {
    code / CHUNK_SIZE
}

#[inline]
pub fn is_surrogate(code: CodePoint) -> bool {
    (0xD800..=0xDFFF).contains(&code)
}

/// Noncharacters: the last two code points of every plane plus U+FDD0..U+FDEF
#[inline]
pub fn is_noncharacter(code: CodePoint) -> bool {
    code & 0xFFFF >= 0xFFFE || (0xFDD0..=0xFDEF).contains(&code)
}

/// Private use areas: U+E000..U+F8FF and planes 15 and 16
#[inline]
pub fn is_private_use(code: CodePoint) -> bool {
    (0xE000..=0xF8FF).contains(&code) || code >= 0xF0000
}

/// Format a code point as upper-case hex, zero-padded to at least 4 digits
pub fn to_hex(code: CodePoint) -> String {
    format!("{:04X}", code)
}

/// Reject code points the engine will never serve.
///
/// Callers holding raw user input must go through this before touching the
/// store; surrogates and values past U+10FFFF are contract violations.
pub fn check_code(code: CodePoint) -> Result<CodePoint> {
    if code > MAX_CODE {
        return Err(UcdError::OutOfRange(code));
    }
    if is_surrogate(code) {
        return Err(UcdError::Surrogate(code));
    }
    Ok(code)
}

/// Parse a user-supplied code point: `U+1F600`, `0x41`, `\u41`, bare hex, or a
/// literal single character.
pub fn parse_code_literal(input: &str) -> Option<CodePoint> {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && !c.is_ascii_hexdigit()
    {
        return Some(c as CodePoint);
    }

    let lower = trimmed.to_ascii_lowercase();
    let digits = ["u+", "\\u", "0x", "u"]
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .unwrap_or(&lower);

    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Kind of a code point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CharKind {
    /// An assigned character (including private use)
    #[serde(rename = "char")]
    Assigned,
    #[default]
    Reserved,
    Noncharacter,
    Surrogate,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Metadata for a single code point.
///
/// Field names on the wire match the persisted chunk format, so a chunk
/// loaded and written back is structurally identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharRecord {
    pub code: CodePoint,

    #[serde(rename = "type")]
    pub kind: CharKind,

    /// Two-letter general category
    #[serde(rename = "gc")]
    pub general_category: String,

    /// Version tag such as `6.0` or `E2.0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "decomp", default, skip_serializing_if = "Option::is_none")]
    pub decomposition: Option<String>,

    /// Related code points, ascending
    #[serde(rename = "cf", default, skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<CodePoint>,

    #[serde(rename = "html", default, skip_serializing_if = "Vec::is_empty")]
    pub html_aliases: Vec<String>,

    #[serde(rename = "latex", default, skip_serializing_if = "Vec::is_empty")]
    pub latex_aliases: Vec<String>,

    /// Default emoji presentation
    #[serde(rename = "emoji", default, skip_serializing_if = "is_false")]
    pub is_emoji: bool,

    #[serde(rename = "kc", default, skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<String>,

    #[serde(rename = "kd", default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    #[serde(rename = "kjo", default, skip_serializing_if = "Option::is_none")]
    pub japanese_on: Option<String>,

    #[serde(rename = "kjk", default, skip_serializing_if = "Option::is_none")]
    pub japanese_kun: Option<String>,

    #[serde(rename = "kk", default, skip_serializing_if = "Option::is_none")]
    pub korean: Option<String>,

    #[serde(rename = "kv", default, skip_serializing_if = "Option::is_none")]
    pub vietnamese: Option<String>,

    /// Orthographic variants (traditional, simplified, semantic, z)
    #[serde(rename = "ky", default, skip_serializing_if = "Vec::is_empty")]
    pub variant_codes: Vec<CodePoint>,
}

impl CharRecord {
    /// An empty record of the given kind
    pub fn new(code: CodePoint, kind: CharKind, general_category: impl Into<String>) -> Self {
        Self {
            code,
            kind,
            general_category: general_category.into(),
            age: None,
            name: None,
            decomposition: None,
            cross_references: Vec::new(),
            html_aliases: Vec::new(),
            latex_aliases: Vec::new(),
            is_emoji: false,
            pinyin: None,
            definition: None,
            japanese_on: None,
            japanese_kun: None,
            korean: None,
            vietnamese: None,
            variant_codes: Vec::new(),
        }
    }

    /// An assigned character
    pub fn assigned(code: CodePoint, name: impl Into<String>, general_category: &str) -> Self {
        let mut record = Self::new(code, CharKind::Assigned, general_category);
        record.name = Some(name.into());
        record
    }

    pub fn reserved(code: CodePoint) -> Self {
        Self::new(code, CharKind::Reserved, UNASSIGNED_CATEGORY)
    }

    pub fn noncharacter(code: CodePoint) -> Self {
        let mut record = Self::new(code, CharKind::Noncharacter, UNASSIGNED_CATEGORY);
        record.age = Some(EARLIEST_AGE.to_string());
        record
    }

    pub fn private_use(code: CodePoint) -> Self {
        let mut record = Self::assigned(
            code,
            format!("<private use> {}", to_hex(code)),
            PRIVATE_USE_CATEGORY,
        );
        let age = if code >= 0xF0000 {
            EARLIEST_AGE
        } else {
            BMP_PRIVATE_USE_AGE
        };
        record.age = Some(age.to_string());
        record
    }

    /// Default record for a code point with no persisted data.
    ///
    /// Precedence: noncharacter, then private use, then reserved.
    pub fn synthesize(code: CodePoint) -> Self {
        if is_noncharacter(code) {
            Self::noncharacter(code)
        } else if is_private_use(code) {
            Self::private_use(code)
        } else {
            Self::reserved(code)
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.kind == CharKind::Assigned
    }

    /// Human-readable age, e.g. `Unicode 6.0 (2010)`
    pub fn age_label(&self) -> Option<&'static str> {
        self.age.as_deref().and_then(labels::age_label)
    }

    /// Human-readable general category, e.g. `Uppercase Letter`
    pub fn category_label(&self) -> Option<&'static str> {
        labels::general_category_label(&self.general_category)
    }

    /// The code point as a `char`, if it is a scalar value
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.code)
    }
}

/// A named block of consecutive code points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub first_code: CodePoint,
    pub last_code: CodePoint,
    pub name: String,
}

impl Block {
    pub fn contains(&self, code: CodePoint) -> bool {
        (self.first_code..=self.last_code).contains(&code)
    }

    /// Private use and surrogate blocks are hidden from browsing
    pub fn is_listed(&self) -> bool {
        !(self.name.contains("Private Use") || self.name.contains("Surrogates"))
    }
}

/// A named multi-code-point sequence (emoji, ZWJ sequence, keycap, flag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub codes: Vec<CodePoint>,
    pub name: String,

    /// Classification such as `RGI Emoji Flag Sequence`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl Sequence {
    /// Human-readable age, e.g. `Emoji 2.0 (2015)`
    pub fn age_label(&self) -> Option<&'static str> {
        self.age.as_deref().and_then(labels::age_label)
    }

    /// The sequence as a string, skipping anything that is not a scalar value
    pub fn to_text(&self) -> String {
        self.codes.iter().filter_map(|&c| char::from_u32(c)).collect()
    }
}

/// A curated, possibly nested, set of characters for browsing shortcuts.
///
/// Opaque to the engine; passed through to clients unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSet {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<CharSet>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chars: Vec<String>,
}
