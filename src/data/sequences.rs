use crate::data::storage::{ResourceStore, SEQUENCES_RESOURCE, read_json};
use crate::data::types::{CodePoint, Sequence};
use crate::error::Result;
use rustc_hash::FxHashMap;

/// Code points ignored when grouping sequences into variant families:
/// presentation selectors, skin tone modifiers, and the keycap mark
pub fn is_variant_modifier(code: CodePoint) -> bool {
    matches!(code, 0xFE0E | 0xFE0F | 0x20E3 | 0x1F3FB..=0x1F3FF)
}

/// `codes` with every variant modifier removed
pub fn strip_modifiers(codes: &[CodePoint]) -> Vec<CodePoint> {
    codes
        .iter()
        .copied()
        .filter(|&c| !is_variant_modifier(c))
        .collect()
}

/// Immutable index over named sequences
#[derive(Debug, Default)]
pub struct SequenceIndex {
    sequences: Vec<Sequence>,
    by_codes: FxHashMap<Vec<CodePoint>, usize>,
    families: FxHashMap<Vec<CodePoint>, Vec<usize>>,
}

impl SequenceIndex {
    /// Load the sequence list; an absent resource yields an empty index
    pub fn load(store: &dyn ResourceStore) -> Result<Self> {
        let sequences: Vec<Sequence> = read_json(store, SEQUENCES_RESOURCE)?.unwrap_or_default();
        Ok(Self::from_sequences(sequences))
    }

    pub fn from_sequences(sequences: Vec<Sequence>) -> Self {
        let mut by_codes = FxHashMap::default();
        let mut families: FxHashMap<Vec<CodePoint>, Vec<usize>> = FxHashMap::default();

        for (idx, sequence) in sequences.iter().enumerate() {
            // First occurrence wins for duplicated code lists
            by_codes.entry(sequence.codes.clone()).or_insert(idx);
            families
                .entry(strip_modifiers(&sequence.codes))
                .or_default()
                .push(idx);
        }

        Self {
            sequences,
            by_codes,
            families,
        }
    }

    /// The sequence with exactly these codes
    pub fn find(&self, codes: &[CodePoint]) -> Option<&Sequence> {
        self.by_codes.get(codes).map(|&idx| &self.sequences[idx])
    }

    /// Other members of the variant family of `codes`.
    ///
    /// Members are sequences whose codes match after stripping modifiers;
    /// the exact match itself is excluded. `None` when the family is empty.
    pub fn find_variants(&self, codes: &[CodePoint]) -> Option<Vec<&Sequence>> {
        let family = self.families.get(&strip_modifiers(codes))?;
        let variants: Vec<&Sequence> = family
            .iter()
            .map(|&idx| &self.sequences[idx])
            .filter(|s| s.codes != codes)
            .collect();
        (!variants.is_empty()).then_some(variants)
    }

    /// Every sequence, in resource order
    pub fn all(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
