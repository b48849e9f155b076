/// Generation: wildcard expansion, per-slot lexicon queries, and the
/// orchestrating engine.
///
/// Group-level wildcards are drawn once per group and shared down
/// reference chains; override wildcards are drawn independently per
/// slot. Slots are filled in template appearance order and any failed
/// query fails the whole call, leaving no partial result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::lexicon::{query_random, InMemoryLexicon, Lexicon, LexiconError, QueryError};
use crate::core::parser::{ParseError, Template};
use crate::core::resolver::{resolve, ConflictWarning, ResolveError, ResolvedTemplate};
use crate::schema::feature::{FeatureSet, Gender, Number, Person, Wild};
use crate::schema::pos::PartOfSpeech;

/// Attempts per wildcard template before a no-match is surfaced. A
/// miss caused by an unlucky draw is recoverable with fresh draws.
const MAX_WILDCARD_ATTEMPTS: u32 = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
}

/// One filled lexical slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedWord {
    pub pos: PartOfSpeech,
    pub lemma: String,
    pub forms: Vec<String>,
    pub translations: Vec<String>,
    pub features: FeatureSet,
}

/// An assembled generation: filled slots in template appearance order,
/// plus the resolution's conflict warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub words: Vec<GeneratedWord>,
    pub warnings: Vec<ConflictWarning>,
}

impl Generation {
    /// The phrase built from the first surface form of every slot.
    pub fn phrase(&self) -> String {
        self.words
            .iter()
            .filter_map(|word| word.forms.first())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn pick<T: Copy, R: Rng + ?Sized>(values: &[T], rng: &mut R) -> T {
    values[rng.gen_range(0..values.len())]
}

/// Draw concrete values for every wildcard in the set. Draw order is
/// fixed (gender, number, person) so a given rng stream always expands
/// the same way.
fn expand_wildcards<R: Rng + ?Sized>(features: &FeatureSet, rng: &mut R) -> FeatureSet {
    let mut out = features.clone();
    if out.gender == Some(Wild::Wildcard) {
        out.gender = Some(Wild::Concrete(pick(Gender::ALL, rng)));
    }
    if out.number == Some(Wild::Wildcard) {
        out.number = Some(Wild::Concrete(pick(Number::ALL, rng)));
    }
    if out.person == Some(Wild::Wildcard) {
        out.person = Some(Wild::Concrete(pick(Person::ALL, rng)));
    }
    out
}

/// Fill every lexical slot of a resolved template.
pub fn generate<L, R>(
    resolved: &ResolvedTemplate,
    lexicon: &L,
    rng: &mut R,
) -> Result<Generation, GenerateError>
where
    L: Lexicon + ?Sized,
    R: Rng + ?Sized,
{
    // Group bases first: a referencing group reuses its target's draws.
    let mut bases: Vec<FeatureSet> = Vec::with_capacity(resolved.groups.len());
    for group in &resolved.groups {
        let base = match group.reference {
            Some(target) if target >= 1 && target <= bases.len() => bases[target - 1].clone(),
            _ => expand_wildcards(&group.base, rng),
        };
        bases.push(base);
    }

    let mut words = Vec::with_capacity(resolved.lexical_count());
    for (index, group) in resolved.groups.iter().enumerate() {
        for lexical in &group.lexicals {
            let mut features = bases[index].clone();
            features.retain(|category| lexical.pos.allows(category));
            for value in lexical.overrides.values() {
                features.insert(value);
            }
            let features = expand_wildcards(&features, rng);
            let word = query_random(lexicon, lexical.pos, &features, rng)?;
            words.push(GeneratedWord {
                pos: lexical.pos,
                lemma: word.lemma.clone(),
                forms: word.surface_forms(lexical.pos, &features),
                translations: word.translations.clone(),
                features,
            });
        }
    }

    Ok(Generation {
        words,
        warnings: resolved.warnings.clone(),
    })
}

/// The top-level engine. Owns a lexicon and a seed; every call derives
/// a fresh rng from the seed and a call counter, so a whole run is
/// replayable from the seed alone.
pub struct Engine<L: Lexicon> {
    lexicon: L,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing an `Engine` over the in-memory lexicon.
pub struct EngineBuilder {
    lexicon_path: Option<String>,
    lexicon: Option<InMemoryLexicon>,
    seed: u64,
}

impl Engine<InMemoryLexicon> {
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            lexicon_path: None,
            lexicon: None,
            seed: 0,
        }
    }
}

impl<L: Lexicon> Engine<L> {
    pub fn new(lexicon: L, seed: u64) -> Engine<L> {
        Engine {
            lexicon,
            seed,
            generation_count: 0,
        }
    }

    pub fn lexicon(&self) -> &L {
        &self.lexicon
    }

    /// Parse, resolve, and generate in one call.
    pub fn generate(&mut self, template: &str) -> Result<Generation, EngineError> {
        let template = Template::parse(template)?;
        let resolved = resolve(&template)?;
        self.generate_resolved(&resolved)
    }

    /// Generate from an already-resolved template.
    ///
    /// A wildcard template whose draws find no matching word is retried
    /// with a fresh seed offset before the failure is surfaced. The
    /// resolved template is untouched either way, so callers may retry
    /// freely themselves.
    pub fn generate_resolved(
        &mut self,
        resolved: &ResolvedTemplate,
    ) -> Result<Generation, EngineError> {
        let attempts = if resolved.has_wildcards() {
            MAX_WILDCARD_ATTEMPTS
        } else {
            1
        };
        let mut attempt = 0;
        loop {
            let mut rng = StdRng::seed_from_u64(
                self.seed
                    .wrapping_add(self.generation_count)
                    .wrapping_add(attempt as u64 * 7919), // prime offset per retry
            );
            match generate(resolved, &self.lexicon, &mut rng) {
                Ok(generation) => {
                    self.generation_count += 1;
                    return Ok(generation);
                }
                Err(error) => {
                    attempt += 1;
                    if attempt >= attempts {
                        self.generation_count += 1;
                        return Err(error.into());
                    }
                }
            }
        }
    }
}

impl EngineBuilder {
    pub fn lexicon_path(mut self, path: &str) -> Self {
        self.lexicon_path = Some(path.to_string());
        self
    }

    /// Provide a lexicon directly (for testing without files).
    pub fn with_lexicon(mut self, lexicon: InMemoryLexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Engine<InMemoryLexicon>, EngineError> {
        let mut lexicon = self.lexicon.unwrap_or_default();
        if let Some(ref path) = self.lexicon_path {
            lexicon.merge(InMemoryLexicon::load_from_ron(Path::new(path))?);
        }
        Ok(Engine {
            lexicon,
            seed: self.seed,
            generation_count: 0,
        })
    }
}
