/// Lexicon word records: nested inflection tables and surface extraction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::masks::FeatureMasks;
use super::feature::{Category, FeatureSet, Mood};
use super::pos::PartOfSpeech;

/// One level of a word's inflection table.
///
/// Branch keys are canonical feature value tokens for the category at
/// that depth of the part of speech's forms path; leaves hold surface
/// strings. Invariable words are a bare leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormNode {
    Leaf(Vec<String>),
    Branch(BTreeMap<String, FormNode>),
}

impl FormNode {
    pub fn is_empty(&self) -> bool {
        match self {
            FormNode::Leaf(forms) => forms.is_empty(),
            FormNode::Branch(children) => children.is_empty(),
        }
    }
}

/// A lexicon entry: lemma, inflection table, translations, and the
/// derived feature-availability masks.
///
/// The masks are a cache over `forms`, recomputed whenever the entry is
/// loaded or its forms change; they are never an independent source of
/// truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub lemma: String,
    #[serde(default)]
    pub translations: Vec<String>,
    pub forms: FormNode,
    #[serde(skip)]
    pub masks: FeatureMasks,
}

impl Word {
    pub fn new(lemma: &str, translations: &[&str], forms: FormNode) -> Word {
        Word {
            lemma: lemma.to_string(),
            translations: translations.iter().map(|t| t.to_string()).collect(),
            forms,
            masks: FeatureMasks::default(),
        }
    }

    /// Recompute the mask cache from `forms`. Must be called after any
    /// edit to the inflection table.
    pub fn refresh_masks(&mut self, pos: PartOfSpeech) {
        self.masks = FeatureMasks::compute(pos, &self.forms);
    }

    /// Surface forms matching a concrete feature assignment.
    ///
    /// Descends the part of speech's forms path; a category the
    /// assignment leaves unconstrained unions every branch at that
    /// level. Verbs pin mood to indicative. Returned forms are sorted
    /// and deduplicated.
    pub fn surface_forms(&self, pos: PartOfSpeech, features: &FeatureSet) -> Vec<String> {
        let mut out = BTreeSet::new();
        collect_forms(&self.forms, pos.forms_path(), features, &mut out);
        out.into_iter().collect()
    }
}

fn collect_forms(
    node: &FormNode,
    path: &[Category],
    features: &FeatureSet,
    out: &mut BTreeSet<String>,
) {
    match node {
        FormNode::Leaf(forms) => {
            out.extend(forms.iter().cloned());
        }
        FormNode::Branch(children) => {
            let Some((&category, rest)) = path.split_first() else {
                // Table is deeper than the declared path; take everything.
                for child in children.values() {
                    collect_forms(child, &[], features, out);
                }
                return;
            };
            let constraint = match features.get(category) {
                Some(value) => Some(value.token()),
                None if category == Category::Mood => Some(Mood::Indicative.token()),
                None => None,
            };
            match constraint {
                Some(key) => {
                    if let Some(child) = children.get(key) {
                        collect_forms(child, rest, features, out);
                    }
                }
                None => {
                    for child in children.values() {
                        collect_forms(child, rest, features, out);
                    }
                }
            }
        }
    }
}
