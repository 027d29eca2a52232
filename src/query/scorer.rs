//! Match kinds, relevance, and result merging.
//!
//! Every match is keyed by what it hit: a single code point or a sequence's
//! code list. Matches against the same key merge into one candidate whose
//! relevance is the best seen and whose tags accumulate in match order.

use crate::data::types::CodePoint;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Tag of a single-code-point match on the raw query
pub const EXACT_TAG: &str = "exact";

/// How a query matched a character or sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// Hex code literal (`U+41`, `0x41`, `41`)
    Code,
    /// Decimal code literal
    DecimalCode,
    /// The raw query is this character
    Exact,
    /// The normalized query is this character
    DecompExact,
    /// Decomposition equals the normalized query
    Decomp,
    DecompCaseless,
    HtmlExact,
    HtmlCaseless,
    LatexExact,
    LatexCaseless,
    /// All keywords found and nothing else in the name
    NameFull,
    /// All keywords found among other words
    NamePartial,
    SequenceName,
}

impl MatchKind {
    pub fn relevance(self) -> f32 {
        match self {
            MatchKind::Code => 10.0,
            MatchKind::DecimalCode => 9.5,
            MatchKind::Exact => 9.0,
            MatchKind::DecompExact => 8.1,
            MatchKind::Decomp => 8.0,
            MatchKind::DecompCaseless => 7.5,
            MatchKind::HtmlExact | MatchKind::LatexExact => 7.0,
            MatchKind::HtmlCaseless | MatchKind::LatexCaseless => 6.5,
            MatchKind::NameFull => 5.5,
            MatchKind::NamePartial | MatchKind::SequenceName => 5.0,
        }
    }
}

/// Ordered set of match tags such as `code` or `name:arrow`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchedProperties(Vec<String>);

impl MatchedProperties {
    /// Add a tag unless already present; returns whether it was added
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a match points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HitKey {
    Char(CodePoint),
    Sequence(Vec<CodePoint>),
}

/// A merged, not yet hydrated match
#[derive(Debug, Clone)]
pub struct Candidate {
    pub key: HitKey,
    pub matched: MatchedProperties,
    pub relevance: f32,
}

/// Accumulates matches, merging by key
#[derive(Debug, Default)]
pub struct ResultSet {
    candidates: Vec<Candidate>,
    index: AHashMap<HitKey, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match with a single tag
    pub fn add(&mut self, key: HitKey, tag: impl Into<String>, kind: MatchKind) {
        self.add_all(key, std::iter::once(tag.into()), kind);
    }

    /// Record one match carrying several tags.
    ///
    /// On an existing key the tags are appended, except `exact`, and the
    /// relevance is raised to the better of the two.
    pub fn add_all(&mut self, key: HitKey, tags: impl IntoIterator<Item = String>, kind: MatchKind) {
        let relevance = kind.relevance();
        match self.index.get(&key) {
            Some(&idx) => {
                let candidate = &mut self.candidates[idx];
                for tag in tags {
                    if tag != EXACT_TAG {
                        candidate.matched.insert(tag);
                    }
                }
                candidate.relevance = candidate.relevance.max(relevance);
            }
            None => {
                let mut matched = MatchedProperties::default();
                for tag in tags {
                    matched.insert(tag);
                }
                self.index.insert(key.clone(), self.candidates.len());
                self.candidates.push(Candidate {
                    key,
                    matched,
                    relevance,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates by relevance, best first, ties in match order
    pub fn into_ranked(self, limit: usize) -> Vec<Candidate> {
        let mut candidates = self.candidates;
        candidates.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        candidates.truncate(limit);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_by_key() {
        let mut results = ResultSet::new();
        results.add(HitKey::Char(0x41), "code", MatchKind::Code);
        results.add_all(
            HitKey::Char(0x41),
            vec!["name:a".to_string()],
            MatchKind::NamePartial,
        );

        let ranked = results.into_ranked(100);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].relevance, 10.0);
        assert_eq!(ranked[0].matched.iter().collect::<Vec<_>>(), vec!["code", "name:a"]);
    }

    #[test]
    fn test_exact_tag_not_merged() {
        let mut results = ResultSet::new();
        results.add(HitKey::Char(0x41), "code", MatchKind::Code);
        results.add(HitKey::Char(0x41), EXACT_TAG, MatchKind::Exact);
        results.add(HitKey::Char(0x42), EXACT_TAG, MatchKind::Exact);

        let ranked = results.into_ranked(100);
        assert!(!ranked[0].matched.contains(EXACT_TAG));
        // a first match keeps its exact tag
        assert!(ranked[1].matched.contains(EXACT_TAG));
    }

    #[test]
    fn test_ranking_is_stable_and_capped() {
        let mut results = ResultSet::new();
        for code in 0..150 {
            results.add(HitKey::Char(code), "name:x", MatchKind::NamePartial);
        }
        results.add(HitKey::Char(1000), "name:x", MatchKind::NameFull);
        results.add(
            HitKey::Sequence(vec![0x1F44D, 0x1F3FB]),
            "name:x",
            MatchKind::SequenceName,
        );

        let ranked = results.into_ranked(100);
        assert_eq!(ranked.len(), 100);
        assert_eq!(ranked[0].key, HitKey::Char(1000));
        assert_eq!(ranked[1].key, HitKey::Char(0));
        assert_eq!(ranked[99].key, HitKey::Char(98));
    }

    #[test]
    fn test_matched_properties_serialize_as_list() {
        let mut matched = MatchedProperties::default();
        assert!(matched.insert("code"));
        assert!(!matched.insert("code"));
        matched.insert("name:a");
        assert_eq!(serde_json::to_string(&matched).unwrap(), r#"["code","name:a"]"#);
    }
}
