pub mod config;
pub mod derivation;
pub mod enumerate;
pub mod error;
pub mod merge;
pub mod phase;
pub mod token;
pub mod tokenize;

pub use config::{CancelToken, Grammar, GrammarBuilder, ParseBudget, PhaseHeads};
pub use derivation::{parse_array, parse_array_with};
pub use enumerate::{enumerate, LexicalArray};
pub use error::{ArrayError, EnumerateError, MergeError, ParseError};
pub use merge::{merge, selects};
pub use phase::last_phase_lexicon;

use cspar_protocol::{CandidateId, SyntacticObject};

/// A lexical array that produced no tree, and why.
#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub candidate: CandidateId,
    pub array: LexicalArray,
    pub error: ArrayError,
}

/// Result of parsing one input: every surviving tree, in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Number of lexical arrays tried.
    pub arrays: usize,
    pub parses: Vec<SyntacticObject>,
    pub failures: Vec<CandidateFailure>,
}

impl ParseOutcome {
    pub fn brackets(&self) -> Vec<String> {
        self.parses.iter().map(SyntacticObject::to_brackets).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }
}

/// Primary entry point: Text -> lexical arrays -> trees.
///
/// An out-of-vocabulary token fails the whole input. A lexical array that
/// cannot be reduced is recorded in `failures` and does not affect the others.
pub fn parse_sentence(input: &str, grammar: &Grammar) -> Result<ParseOutcome, ParseError> {
    parse_sentence_with(input, grammar, &CancelToken::new())
}

fn candidate_id(index: usize, grammar: &Grammar) -> Result<CandidateId, EnumerateError> {
    u32::try_from(index)
        .map(CandidateId::new)
        .map_err(|_| EnumerateError::TooManyCandidates {
            limit: grammar.budget().max_lexical_arrays,
        })
}

#[tracing::instrument(skip(grammar, cancel))]
pub fn parse_sentence_with(input: &str, grammar: &Grammar, cancel: &CancelToken) -> Result<ParseOutcome, ParseError> {
    let arrays = enumerate(input, grammar)?;
    let mut outcome = ParseOutcome {
        arrays: arrays.len(),
        ..ParseOutcome::default()
    };

    for (index, array) in arrays.into_iter().enumerate() {
        let candidate = candidate_id(index, grammar)?;
        match parse_array_with(array.clone(), grammar, cancel) {
            Ok(tree) => {
                tracing::debug!(candidate = candidate.0, tree = %tree, "candidate parsed");
                outcome.parses.push(tree);
            }
            Err(ArrayError::Cancelled) => return Err(ParseError::Cancelled),
            Err(error) => {
                tracing::debug!(candidate = candidate.0, %error, "candidate failed");
                outcome.failures.push(CandidateFailure { candidate, array, error });
            }
        }
    }

    tracing::info!(arrays = outcome.arrays, parses = outcome.parses.len(), "parsed");
    Ok(outcome)
}
