//! Query normalization and keyword extraction.
//!
//! A free-text query is turned into:
//! - a trimmed raw copy and a lower-cased working copy
//! - an NFKD-normalized copy for decomposition matching
//! - one case-insensitive, word-anchored regex per keyword, after synonym
//!   expansion and deduplication
//! - the entity name and loose LaTeX pattern used for alias matching

use crate::error::{Result, UcdError};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Groups of interchangeable query words
const SYNONYMS: &[&[&str]] = &[
    &["0", "zero"],
    &["1", "one"],
    &["2", "two"],
    &["3", "three"],
    &["4", "four"],
    &["5", "five"],
    &["6", "six"],
    &["7", "seven"],
    &["8", "eight"],
    &["9", "nine"],
    &["10", "ten"],
    &["11", "eleven"],
    &["12", "twelve"],
    &["13", "thirteen"],
    &["14", "fourteen"],
    &["15", "fifteen"],
    &["16", "sixteen"],
    &["17", "seventeen"],
    &["18", "eighteen"],
    &["19", "nineteen"],
    &["20", "twenty"],
    &["-", "minus"],
    &["+", "plus"],
    &["/", "slash", "solidus"],
    &["math", "mathematical"],
];

const FRACTION_SLASH: char = '\u{2044}';

static HTML_ENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\\&]?([a-zA-Z0-9]+);?$").ok());

static LATEX_BRACED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\\[^\\{]+)\{(.|\\[a-zA-Z]+)\}$").ok());

static LATEX_MATH_STYLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\\math([a-z]+)\{(.|\\[a-zA-Z]+)\}$").ok());

/// One search keyword: its pattern source and compiled matcher
#[derive(Debug, Clone)]
pub struct Keyword {
    pattern: String,
    regex: Regex,
}

impl Keyword {
    /// Regex source before anchoring, e.g. `2|two`
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A normalized, tokenized query
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// Raw query, trimmed
    pub text: String,
    /// Trimmed and lower-cased
    pub lower: String,
    /// NFKD of the raw query with fraction slash folded to `/`
    pub normalized: String,
    pub keywords: Vec<Keyword>,
    html_name: Option<String>,
    latex_loose: Option<Regex>,
}

/// NFKD with the fraction slash folded to `/`, applied to queries and
/// decompositions alike
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .map(|c| if c == FRACTION_SLASH { '/' } else { c })
        .collect()
}

/// Parse a free-text query
pub fn parse_query(input: &str) -> Result<ParsedQuery> {
    let text = input.trim().to_string();
    let lower = text.to_lowercase();
    let normalized = normalize(&text);

    let patterns = dedupe_keywords(tokenize(&lower).iter().map(|t| expand_token(t)).collect());
    let keywords = patterns
        .into_iter()
        .map(|pattern| {
            let regex = word_regex(&pattern)?;
            Ok(Keyword { pattern, regex })
        })
        .collect::<Result<Vec<_>>>()?;

    let html_name = HTML_ENTITY
        .as_ref()
        .and_then(|re| re.captures(&text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    // every character may be preceded by an optional backslash
    let latex_loose = if text.is_empty() {
        None
    } else {
        let body = text
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect::<Vec<_>>()
            .join(r"\\?");
        RegexBuilder::new(&format!(r"^\\?{}$", body))
            .case_insensitive(true)
            .build()
            .ok()
    };

    Ok(ParsedQuery {
        text,
        lower,
        normalized,
        keywords,
        html_name,
        latex_loose,
    })
}

/// Split the lower-cased query on anything outside `[0-9a-z+\-/]`
pub fn tokenize(lower: &str) -> Vec<String> {
    lower
        .chars()
        .map(|c| {
            if c.is_ascii_digit() || c.is_ascii_lowercase() || matches!(c, '+' | '-' | '/') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Regex source for one token, expanded through its synonym group
pub fn expand_token(token: &str) -> String {
    match SYNONYMS.iter().find(|group| group.contains(&token)) {
        Some(group) => group
            .iter()
            .filter(|&&word| word != "-")
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|"),
        None => regex::escape(token),
    }
}

/// Drop repeated keywords and keywords found as a whole word inside another
pub fn dedupe_keywords(patterns: Vec<String>) -> Vec<String> {
    patterns
        .iter()
        .enumerate()
        .filter(|&(idx, pattern)| {
            if patterns[..idx].contains(pattern) {
                return false;
            }
            let Ok(re) = word_regex(pattern) else {
                return true;
            };
            !patterns
                .iter()
                .any(|other| other != pattern && re.is_match(other))
        })
        .map(|(_, pattern)| pattern.clone())
        .collect()
}

fn word_regex(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&format!(r"\b(?:{})\b", pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| UcdError::InvalidQuery(e.to_string()))
}

/// Spellings of one LaTeX alias, the alias itself first:
/// `\acute{e}` is also written `\acutee` and `\acute e`, and
/// `\mathbb{R}` is also written `\bb R` and `\bbR`
pub fn latex_spellings(alias: &str) -> Vec<String> {
    let mut variants = vec![alias.to_string()];
    if let Some(caps) = LATEX_BRACED.as_ref().and_then(|re| re.captures(alias)) {
        variants.push(format!("{}{}", &caps[1], &caps[2]));
        variants.push(format!("{} {}", &caps[1], &caps[2]));
    }
    if let Some(caps) = LATEX_MATH_STYLE.as_ref().and_then(|re| re.captures(alias)) {
        variants.push(format!("\\{} {}", &caps[1], &caps[2]));
        variants.push(format!("\\{}{}", &caps[1], &caps[2]));
    }
    variants
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Every occurrence of every keyword in `name`, as written in the name,
    /// in keyword order and without repeats; `None` if any keyword is missing
    pub fn match_name(&self, name: &str) -> Option<Vec<String>> {
        if self.keywords.is_empty() {
            return None;
        }
        let mut words: Vec<String> = Vec::with_capacity(self.keywords.len());
        for keyword in &self.keywords {
            let mut found = false;
            for m in keyword.regex.find_iter(name) {
                found = true;
                if !words.iter().any(|w| w == m.as_str()) {
                    words.push(m.as_str().to_string());
                }
            }
            if !found {
                return None;
            }
        }
        Some(words)
    }

    /// Entity name if the query looks like `&name;`, `\name`, or `name`
    pub fn html_name(&self) -> Option<&str> {
        self.html_name.as_deref()
    }

    /// The raw query is exactly this spelling of a LaTeX alias
    pub fn latex_exact(&self, spelling: &str) -> bool {
        self.text == spelling
    }

    /// Case-insensitive match against a spelling, allowing a backslash
    /// before any character of the query
    pub fn latex_loose(&self, spelling: &str) -> bool {
        self.latex_loose
            .as_ref()
            .is_some_and(|re| re.is_match(spelling))
    }

    /// The single code point of the raw query, if it is exactly one
    pub fn single_code(&self) -> Option<u32> {
        single_char(&self.text)
    }

    /// The single code point of the normalized query, if it is exactly one
    pub fn single_normalized_code(&self) -> Option<u32> {
        single_char(&self.normalized)
    }
}

fn single_char(text: &str) -> Option<u32> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c as u32),
        _ => None,
    }
}
