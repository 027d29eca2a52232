//! Free-text search over every character and sequence.
//!
//! Search is a linear sweep: all chunks are loaded, then every persisted
//! record and every sequence is tested against the parsed query. Results
//! are merged by key, ranked, capped, and hydrated with full records.

use crate::data::chunk_store::ChunkStore;
use crate::data::sequences::SequenceIndex;
use crate::data::types::{CharRecord, CodePoint, MAX_CODE, Sequence, is_surrogate, to_hex};
use crate::error::Result;
use crate::query::parser::{ParsedQuery, latex_spellings, normalize, parse_query};
use crate::query::scorer::{Candidate, EXACT_TAG, HitKey, MatchKind, MatchedProperties, ResultSet};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Instant;
use tracing::debug;

/// Maximum number of results returned by one search
pub const MAX_RESULTS: usize = 100;

static HEX_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(u\+|u|\\u|0x)?([0-9a-f]+)$").ok());

static DECIMAL_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]+$").ok());

static NAME_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^<.+>").ok());

/// The record or sequence a result points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Char { char: CharRecord },
    Sequence { sequence: Sequence },
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub codes: Vec<CodePoint>,
    pub hit: SearchHit,
    pub matched: MatchedProperties,
    pub relevance: f32,
}

/// Search over a store and a sequence index
pub struct SearchEngine<'a> {
    store: &'a ChunkStore,
    sequences: &'a SequenceIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a ChunkStore, sequences: &'a SequenceIndex) -> Self {
        Self { store, sequences }
    }

    /// Ranked results for `text`, best first, at most [`MAX_RESULTS`]
    pub fn search(&self, text: &str) -> Result<Vec<SearchResult>> {
        let query = parse_query(text)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        self.store.ensure_all_loaded()?;

        let mut results = ResultSet::new();
        self.match_code_literals(&query, &mut results);
        self.match_single_chars(&query, &mut results);
        self.match_records(&query, &mut results);
        self.match_sequences(&query, &mut results);

        let matches = results.len();
        let ranked = results.into_ranked(MAX_RESULTS);
        let hydrated = self.hydrate(ranked)?;

        debug!(
            query = %query.text,
            keywords = query.keywords.len(),
            matches,
            returned = hydrated.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "search complete"
        );
        Ok(hydrated)
    }

    fn match_code_literals(&self, query: &ParsedQuery, results: &mut ResultSet) {
        let hex = HEX_CODE
            .as_ref()
            .and_then(|re| re.captures(&query.lower))
            .and_then(|caps| caps.get(2))
            .and_then(|m| u32::from_str_radix(m.as_str(), 16).ok());
        if let Some(code) = hex.filter(|&c| servable(c)) {
            results.add(HitKey::Char(code), "code", MatchKind::Code);
        }

        let decimal = DECIMAL_CODE
            .as_ref()
            .filter(|re| re.is_match(&query.lower))
            .and_then(|_| query.lower.parse::<u32>().ok());
        if let Some(code) = decimal.filter(|&c| servable(c)) {
            results.add(HitKey::Char(code), "decimal-code", MatchKind::DecimalCode);
        }
    }

    fn match_single_chars(&self, query: &ParsedQuery, results: &mut ResultSet) {
        if let Some(code) = query.single_code().filter(|&c| servable(c)) {
            results.add(HitKey::Char(code), EXACT_TAG, MatchKind::Exact);
        }
        if let Some(code) = query.single_normalized_code().filter(|&c| servable(c)) {
            results.add(HitKey::Char(code), "decomp-exact", MatchKind::DecompExact);
        }
    }

    fn match_records(&self, query: &ParsedQuery, results: &mut ResultSet) {
        let normalized_lower = query.normalized.to_lowercase();

        for record in self.store.dense_chunks().flat_map(|chunk| chunk.records()) {
            let key = || HitKey::Char(record.code);

            if let Some(decomposition) = &record.decomposition {
                let decomposed = normalize(decomposition);
                if decomposed == query.normalized {
                    results.add(key(), "decomp", MatchKind::Decomp);
                } else if decomposed.to_lowercase() == normalized_lower {
                    results.add(key(), "decomp", MatchKind::DecompCaseless);
                }
            }

            if let Some(entity) = query.html_name() {
                for alias in &record.html_aliases {
                    if alias == entity {
                        results.add(key(), format!("html:{}", alias), MatchKind::HtmlExact);
                    } else if alias.eq_ignore_ascii_case(entity) {
                        results.add(key(), format!("html:{}", alias), MatchKind::HtmlCaseless);
                    }
                }
            }

            if record.is_assigned() {
                for alias in &record.latex_aliases {
                    for spelling in latex_spellings(alias) {
                        if query.latex_exact(&spelling) {
                            results.add(key(), format!("latex:{}", alias), MatchKind::LatexExact);
                        } else if query.latex_loose(&spelling) {
                            results.add(key(), format!("latex:{}", alias), MatchKind::LatexCaseless);
                        }
                    }
                }
            }

            if let Some(name) = &record.name {
                self.match_name(query, record.code, name, results);
            }
        }
    }

    fn match_name(&self, query: &ParsedQuery, code: CodePoint, name: &str, results: &mut ResultSet) {
        // Algorithmic names such as CJK UNIFIED IDEOGRAPH-4E00 carry no words
        if name.ends_with(&format!("-{}", to_hex(code))) {
            return;
        }
        let stripped = match NAME_TAG.as_ref() {
            Some(re) => re.replace(name, ""),
            None => name.into(),
        };
        let stripped = stripped.trim();

        if let Some(words) = query.match_name(stripped) {
            let kind = if stripped.split(' ').count() == query.keywords.len() {
                MatchKind::NameFull
            } else {
                MatchKind::NamePartial
            };
            let tags = words.into_iter().map(|w| format!("name:{}", w));
            results.add_all(HitKey::Char(code), tags, kind);
        }
    }

    fn match_sequences(&self, query: &ParsedQuery, results: &mut ResultSet) {
        for sequence in self.sequences.all() {
            if let Some(words) = query.match_name(&sequence.name) {
                let tags = words.into_iter().map(|w| format!("name:{}", w));
                results.add_all(
                    HitKey::Sequence(sequence.codes.clone()),
                    tags,
                    MatchKind::SequenceName,
                );
            }
        }
    }

    fn hydrate(&self, ranked: Vec<Candidate>) -> Result<Vec<SearchResult>> {
        let hydrated: Vec<Option<SearchResult>> = ranked
            .into_par_iter()
            .map(|candidate| -> Result<Option<SearchResult>> {
                let (codes, hit) = match candidate.key {
                    HitKey::Char(code) => {
                        let record = self.store.get_character(code)?;
                        (vec![code], SearchHit::Char { char: record })
                    }
                    HitKey::Sequence(codes) => match self.sequences.find(&codes) {
                        Some(sequence) => (
                            codes,
                            SearchHit::Sequence {
                                sequence: sequence.clone(),
                            },
                        ),
                        None => return Ok(None),
                    },
                };
                Ok(Some(SearchResult {
                    codes,
                    hit,
                    matched: candidate.matched,
                    relevance: candidate.relevance,
                }))
            })
            .collect::<Result<_>>()?;

        Ok(hydrated.into_iter().flatten().collect())
    }
}

/// Code points a code-literal or single-character match may point at
fn servable(code: CodePoint) -> bool {
    code <= MAX_CODE && !is_surrogate(code)
}
