//! Syntagma — template-driven Modern Greek phrase generation.
//!
//! Compiles compact morphological templates into sequences of Greek words:
//! templates declare parts of speech and the grammatical features they must
//! carry, the resolver layers inherited and overridden features per lexical
//! slot, and the generator fills each slot with a random word drawn from a
//! bitmask-indexed lexicon.

pub mod core;
pub mod schema;
