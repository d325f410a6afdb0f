use std::collections::BTreeSet;

use cspar_lexicon::LexiconError;
use cspar_protocol::LexiconTag;
use thiserror::Error;

use crate::token::Span;

/// Failure to form any lexical array for an input.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("out of vocabulary: '{token}' at {span}")]
    OutOfVocabulary { token: String, span: Span },

    #[error("input has more than {limit} candidate lexical arrays")]
    TooManyCandidates { limit: usize },

    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("head {category} cannot join lexica {head:?} and {complement:?} outside a phase boundary")]
    LexiconMismatch {
        category: String,
        head: BTreeSet<LexiconTag>,
        complement: BTreeSet<LexiconTag>,
    },

    #[error("head {0} has no pending selection")]
    NothingToSelect(String),
}

/// Why one lexical array produced no tree. Never fatal for the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("no merge sequence reduces the lexical array")]
    Unparsable,

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("step budget of {0} exhausted")]
    BudgetExhausted(usize),

    #[error("cancelled")]
    Cancelled,
}

impl ArrayError {
    pub fn is_lexicon_mismatch(&self) -> bool {
        matches!(self, ArrayError::Merge(MergeError::LexiconMismatch { .. }))
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),

    #[error("parse cancelled")]
    Cancelled,
}
