/// Parts of speech, their fixed feature schemas, and forms traversal paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::feature::{Category, TokenError};

/// Every part of speech the template language names.
///
/// `Numeral` is reserved: the token is recognized so templates using it
/// get a targeted error, but no schema work is done for it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Article,
    Pronoun,
    Adverb,
    Preposition,
    Conjunction,
    Numeral,
}

impl PartOfSpeech {
    pub const ALL: &'static [PartOfSpeech] = &[
        Self::Noun,
        Self::Verb,
        Self::Adjective,
        Self::Article,
        Self::Pronoun,
        Self::Adverb,
        Self::Preposition,
        Self::Conjunction,
        Self::Numeral,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Article => "article",
            Self::Pronoun => "pronoun",
            Self::Adverb => "adverb",
            Self::Preposition => "preposition",
            Self::Conjunction => "conjunction",
            Self::Numeral => "numeral",
        }
    }

    /// Resolve a part-of-speech token: exact match first, then unique
    /// prefix, so `adj` and `art` work while `a` is ambiguous.
    pub fn from_token(token: &str) -> Result<PartOfSpeech, TokenError> {
        if let Some(pos) = Self::ALL.iter().find(|p| p.token() == token) {
            return Ok(*pos);
        }
        let hits: Vec<PartOfSpeech> = Self::ALL
            .iter()
            .filter(|p| p.token().starts_with(token))
            .copied()
            .collect();
        match hits.as_slice() {
            [] => Err(TokenError::Unknown),
            [pos] => Ok(*pos),
            many => Err(TokenError::Ambiguous(
                many.iter().map(|p| p.token()).collect(),
            )),
        }
    }

    /// Reserved parts of speech parse but refuse to resolve.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Numeral)
    }

    /// Required feature categories, in declared order.
    pub fn required(self) -> &'static [Category] {
        match self {
            Self::Noun | Self::Adjective | Self::Article | Self::Numeral => {
                &[Category::Case, Category::Gender, Category::Number]
            }
            Self::Verb => &[
                Category::Tense,
                Category::Voice,
                Category::Person,
                Category::Number,
            ],
            Self::Pronoun => &[Category::PronounType],
            Self::Adverb | Self::Preposition | Self::Conjunction => &[],
        }
    }

    /// Optional feature categories, in declared order.
    pub fn optional(self) -> &'static [Category] {
        match self {
            Self::Pronoun => &[
                Category::Case,
                Category::Person,
                Category::Number,
                Category::Gender,
            ],
            _ => &[],
        }
    }

    /// Whether this part of speech accepts the category at all.
    pub fn allows(self, category: Category) -> bool {
        self.required().contains(&category) || self.optional().contains(&category)
    }

    /// Nesting order of the word's inflection table: the category whose
    /// keys appear at each depth of `forms`. Invariable words have an
    /// empty path (their forms are a bare surface set).
    pub fn forms_path(self) -> &'static [Category] {
        match self {
            Self::Noun | Self::Adjective | Self::Article | Self::Numeral => {
                &[Category::Gender, Category::Number, Category::Case]
            }
            Self::Verb => &[
                Category::Tense,
                Category::Voice,
                Category::Mood,
                Category::Number,
                Category::Person,
            ],
            Self::Pronoun => &[
                Category::PronounType,
                Category::Person,
                Category::Gender,
                Category::Number,
                Category::Case,
            ],
            Self::Adverb | Self::Preposition | Self::Conjunction => &[],
        }
    }

    pub fn is_inflected(self) -> bool {
        !self.forms_path().is_empty()
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
