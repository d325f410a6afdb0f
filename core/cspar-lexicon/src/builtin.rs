//! Lexica shipped with the parser.

use crate::error::LexiconError;
use crate::lexicon::Lexicon;
use crate::registry::LexiconRegistry;

const SG_ENGLISH: &str = include_str!("../data/sg_english.json");
const MANDARIN: &str = include_str!("../data/mandarin.json");

/// Singapore English.
pub fn singapore_english() -> Result<Lexicon, LexiconError> {
    Lexicon::from_json(SG_ENGLISH)
}

/// (Singapore) Mandarin, romanized.
pub fn mandarin() -> Result<Lexicon, LexiconError> {
    Lexicon::from_json(MANDARIN)
}

/// Both built-in lexica, English first.
pub fn builtin_registry() -> Result<LexiconRegistry, LexiconError> {
    Ok(LexiconRegistry::new().with(singapore_english()?).with(mandarin()?))
}
