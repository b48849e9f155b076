/// Morphological index: per-word feature-availability bitmasks.
///
/// Each word's inflection table is summarized into one bitmask per
/// feature category, recording which enumerated values the table
/// actually provides. Candidate filtering then becomes a handful of
/// bit tests instead of a walk over the nested forms.

use serde::{Deserialize, Serialize};

use crate::schema::feature::{forms_key_bit, Category, FeatureSet, FeatureValue, Wild};
use crate::schema::pos::PartOfSpeech;
use crate::schema::word::FormNode;

/// One bitmask per feature category. Bit positions follow each value
/// enum's declaration order; a zero mask means the category never
/// occurs in the word's forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMasks {
    pub case: u16,
    pub gender: u16,
    pub number: u16,
    pub tense: u16,
    pub voice: u16,
    pub mood: u16,
    pub person: u16,
    pub pronoun_type: u16,
}

impl FeatureMasks {
    /// Derive masks from an inflection table.
    ///
    /// Walks every branch; the part of speech's forms path names the
    /// category whose keys appear at each depth, and every recognized
    /// key contributes its bit. Missing branches and unrecognized keys
    /// contribute nothing. The result is independent of traversal
    /// order, so recomputation always reproduces the cache bit for bit.
    pub fn compute(pos: PartOfSpeech, forms: &FormNode) -> FeatureMasks {
        let mut masks = FeatureMasks::default();
        walk(forms, pos.forms_path(), &mut masks);
        masks
    }

    pub fn mask(&self, category: Category) -> u16 {
        match category {
            Category::Case => self.case,
            Category::Gender => self.gender,
            Category::Number => self.number,
            Category::Tense => self.tense,
            Category::Voice => self.voice,
            Category::Mood => self.mood,
            Category::Person => self.person,
            Category::PronounType => self.pronoun_type,
        }
    }

    fn set(&mut self, category: Category, bit: u16) {
        match category {
            Category::Case => self.case |= bit,
            Category::Gender => self.gender |= bit,
            Category::Number => self.number |= bit,
            Category::Tense => self.tense |= bit,
            Category::Voice => self.voice |= bit,
            Category::Mood => self.mood |= bit,
            Category::Person => self.person |= bit,
            Category::PronounType => self.pronoun_type |= bit,
        }
    }

    /// Whether the word can supply the given value. Wildcards are no
    /// constraint and always pass.
    pub fn supports(&self, value: FeatureValue) -> bool {
        match value {
            FeatureValue::Case(v) => self.case & v.bit() != 0,
            FeatureValue::Gender(Wild::Concrete(v)) => self.gender & v.bit() != 0,
            FeatureValue::Number(Wild::Concrete(v)) => self.number & v.bit() != 0,
            FeatureValue::Tense(v) => self.tense & v.bit() != 0,
            FeatureValue::Voice(v) => self.voice & v.bit() != 0,
            FeatureValue::Person(Wild::Concrete(v)) => self.person & v.bit() != 0,
            FeatureValue::PronounType(v) => self.pronoun_type & v.bit() != 0,
            FeatureValue::Gender(Wild::Wildcard)
            | FeatureValue::Number(Wild::Wildcard)
            | FeatureValue::Person(Wild::Wildcard) => true,
        }
    }

    /// Whether every constrained category of the assignment is
    /// available. An empty assignment matches everything.
    pub fn matches(&self, features: &FeatureSet) -> bool {
        features.values().into_iter().all(|v| self.supports(v))
    }
}

fn walk(node: &FormNode, path: &[Category], masks: &mut FeatureMasks) {
    if let FormNode::Branch(children) = node {
        if let Some((&category, rest)) = path.split_first() {
            for (key, child) in children {
                if let Some(bit) = forms_key_bit(category, key) {
                    masks.set(category, bit);
                }
                walk(child, rest, masks);
            }
        }
    }
}
