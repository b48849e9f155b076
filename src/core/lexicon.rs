/// Lexicon access: candidate queries, mask filtering, and uniform
/// random selection.
///
/// The store behind the `Lexicon` trait is external; this module only
/// fixes the selection semantics. The bundled `InMemoryLexicon` backs
/// the tools and the test suites, loading word lists from RON files.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::core::masks::FeatureMasks;
use crate::schema::feature::FeatureSet;
use crate::schema::pos::PartOfSpeech;
use crate::schema::word::{FormNode, Word};

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("no {pos} in the lexicon matches {features}")]
    NoMatch {
        pos: PartOfSpeech,
        features: FeatureSet,
    },
}

/// Candidate query capability of a word store.
pub trait Lexicon {
    /// Every word of the given part of speech, in stable order.
    fn candidates(&self, pos: PartOfSpeech) -> &[Word];
}

/// Select one word uniformly at random among those whose masks supply
/// every constrained category of the assignment.
pub fn query_random<'a, L, R>(
    lexicon: &'a L,
    pos: PartOfSpeech,
    features: &FeatureSet,
    rng: &mut R,
) -> Result<&'a Word, QueryError>
where
    L: Lexicon + ?Sized,
    R: Rng + ?Sized,
{
    let matching: Vec<&Word> = lexicon
        .candidates(pos)
        .iter()
        .filter(|word| word.masks.matches(features))
        .collect();
    matching
        .choose(rng)
        .copied()
        .ok_or_else(|| QueryError::NoMatch {
            pos,
            features: features.clone(),
        })
}

/// In-memory word store, loadable from RON word lists.
///
/// Masks are recomputed for every entry on insert, so files never
/// carry them and a stale cache cannot enter the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLexicon {
    buckets: FxHashMap<PartOfSpeech, Vec<Word>>,
}

// RON word lists use a flat entry shape; the bucketed layout is
// internal.
#[derive(Debug, Deserialize)]
struct RonWord {
    pos: PartOfSpeech,
    lemma: String,
    #[serde(default)]
    translations: Vec<String>,
    forms: FormNode,
}

impl InMemoryLexicon {
    pub fn new() -> InMemoryLexicon {
        InMemoryLexicon::default()
    }

    /// Add a word under the given part of speech, refreshing its masks.
    pub fn insert(&mut self, pos: PartOfSpeech, mut word: Word) {
        word.refresh_masks(pos);
        self.buckets.entry(pos).or_default().push(word);
    }

    /// Load a word list from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<InMemoryLexicon, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a word list from a RON string.
    pub fn parse_ron(input: &str) -> Result<InMemoryLexicon, LexiconError> {
        let raw: Vec<RonWord> = ron::from_str(input)?;
        let mut lexicon = InMemoryLexicon::new();
        for entry in raw {
            let word = Word {
                lemma: entry.lemma,
                translations: entry.translations,
                forms: entry.forms,
                masks: FeatureMasks::default(),
            };
            lexicon.insert(entry.pos, word);
        }
        Ok(lexicon)
    }

    /// Merge another lexicon into this one; buckets are concatenated.
    pub fn merge(&mut self, other: InMemoryLexicon) {
        for (pos, words) in other.buckets {
            self.buckets.entry(pos).or_default().extend(words);
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, pos: PartOfSpeech) -> usize {
        self.candidates(pos).len()
    }
}

impl Lexicon for InMemoryLexicon {
    fn candidates(&self, pos: PartOfSpeech) -> &[Word] {
        self.buckets.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }
}
