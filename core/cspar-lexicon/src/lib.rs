//! Lexicon entry expansion.
//!
//! A lookup fetches the stored base readings for a span, applies the
//! lexicon's enrichment rules, materializes `generate` heads and tags every
//! pronounced leaf with the lexicon id.

pub mod archive;
pub mod builtin;
pub mod error;
pub mod generate;
pub mod lexicon;
pub mod registry;
pub mod rules;
pub mod source;

pub use archive::{compile_source, decompile, read_archive, to_archive_bytes};
pub use error::LexiconError;
pub use generate::{expand_generate, MAX_GENERATE_ROUNDS};
pub use lexicon::Lexicon;
pub use registry::LexiconRegistry;
pub use rules::{FnRule, PatternRule, Rule, RuleError, RuleOutcome};
pub use source::LexiconSource;

use cspar_protocol::SyntacticObject;

/// One candidate reading of a span: a short sequence of SOs (a base entry
/// plus any heads it generated).
pub type Reading = Vec<SyntacticObject>;

/// Lookup capability consumed by the enumerator.
pub trait LexiconLookup: Send + Sync {
    /// Stable identifier, used as the lexicon tag.
    fn id(&self) -> &str;

    /// Every fully expanded reading of `span`; empty when the span is unknown.
    fn lookup(&self, span: &str) -> Result<Vec<Reading>, LexiconError>;
}
