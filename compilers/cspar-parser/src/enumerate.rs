use std::fmt;

use cspar_lexicon::{LexiconRegistry, Reading};
use cspar_protocol::SyntacticObject;

use crate::config::Grammar;
use crate::error::EnumerateError;
use crate::token::Token;
use crate::tokenize::tokenize;

/// One candidate reading of the whole input: an ordered sequence of SOs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LexicalArray(Vec<SyntacticObject>);

impl LexicalArray {
    pub fn new(items: Vec<SyntacticObject>) -> Self {
        Self(items)
    }

    pub fn into_items(self) -> Vec<SyntacticObject> {
        self.0
    }
}

impl fmt::Display for LexicalArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, so) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", so)?;
        }
        Ok(())
    }
}

/// The readings found for one matched span of tokens.
#[derive(Debug, Clone)]
pub struct SpanReadings {
    pub tokens: Vec<Token>,
    pub readings: Vec<Reading>,
}

/// Greedy longest-match segmentation of `tokens` against the registry.
///
/// At each position the longest span with any reading wins, even if a shorter
/// span would have led to a parse. A token that starts no known span is out of
/// vocabulary.
pub fn lookup_spans(tokens: &[Token], registry: &LexiconRegistry) -> Result<Vec<SpanReadings>, EnumerateError> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let remaining = &tokens[pos..];
        let mut matched = None;

        for len in (1..=remaining.len()).rev() {
            let text = remaining[..len].iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
            let readings = registry.lookup(&text)?;
            if !readings.is_empty() {
                matched = Some((len, readings));
                break;
            }
        }

        let Some((len, readings)) = matched else {
            let token = &remaining[0];
            return Err(EnumerateError::OutOfVocabulary {
                token: token.text.clone(),
                span: token.span,
            });
        };

        tracing::trace!(span = len, readings = readings.len(), "span matched");
        spans.push(SpanReadings {
            tokens: remaining[..len].to_vec(),
            readings,
        });
        pos += len;
    }

    Ok(spans)
}

/// Cartesian product of the span readings, each combination flattened into one
/// lexical array. The first span varies slowest. Every array gets its own copy
/// of every node.
pub fn combine(spans: &[SpanReadings], limit: usize) -> Result<Vec<LexicalArray>, EnumerateError> {
    if spans.is_empty() {
        return Ok(Vec::new());
    }

    let count = spans
        .iter()
        .try_fold(1usize, |acc, s| acc.checked_mul(s.readings.len()))
        .filter(|count| *count <= limit)
        .ok_or(EnumerateError::TooManyCandidates { limit })?;

    let mut arrays: Vec<Vec<SyntacticObject>> = vec![Vec::new()];
    for span in spans {
        let mut next = Vec::with_capacity(arrays.len() * span.readings.len());
        for prefix in &arrays {
            for reading in &span.readings {
                let mut array = prefix.clone();
                array.extend(reading.iter().cloned());
                next.push(array);
            }
        }
        arrays = next;
    }

    debug_assert_eq!(arrays.len(), count);
    Ok(arrays.into_iter().map(LexicalArray::new).collect())
}

/// Every candidate lexical array for `input`. Empty input yields no arrays.
#[tracing::instrument(level = "debug", skip(grammar), fields(arrays = tracing::field::Empty))]
pub fn enumerate(input: &str, grammar: &Grammar) -> Result<Vec<LexicalArray>, EnumerateError> {
    let tokens = tokenize(input);
    let spans = lookup_spans(&tokens, grammar.registry())?;
    let arrays = combine(&spans, grammar.budget().max_lexical_arrays)?;
    tracing::Span::current().record("arrays", arrays.len());
    Ok(arrays)
}
