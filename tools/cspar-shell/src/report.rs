use std::fmt::Write;

use cspar_parser::{parse_sentence, EnumerateError, Grammar, ParseError, ParseOutcome};
use serde::Serialize;

use crate::config::Settings;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Parsed,
    NoParse,
    OutOfVocabulary,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub candidate: u32,
    pub array: String,
    pub error: String,
}

/// Machine-readable summary of one input, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub input: String,
    pub status: Status,
    pub arrays: usize,
    pub parses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_token: Option<String>,
}

impl ParseReport {
    fn from_outcome(input: &str, outcome: &ParseOutcome, with_failures: bool) -> Self {
        let failures = if with_failures {
            outcome
                .failures
                .iter()
                .map(|f| FailureReport {
                    candidate: f.candidate.0,
                    array: f.array.to_string(),
                    error: f.error.to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            input: input.to_string(),
            status: if outcome.is_empty() { Status::NoParse } else { Status::Parsed },
            arrays: outcome.arrays,
            parses: outcome.brackets(),
            failures,
            unknown_token: None,
        }
    }

    fn out_of_vocabulary(input: &str, token: &str) -> Self {
        Self {
            input: input.to_string(),
            status: Status::OutOfVocabulary,
            arrays: 0,
            parses: Vec::new(),
            failures: Vec::new(),
            unknown_token: Some(token.to_string()),
        }
    }
}

/// Parses `input` and renders the result the way `settings` asks for.
///
/// An unknown word is an answer, not an error. Anything else the parser
/// reports (budget, cancellation, broken lexicon) is returned as an error.
pub fn parse_and_render(input: &str, grammar: &Grammar, settings: &Settings) -> anyhow::Result<String> {
    let outcome = match parse_sentence(input, grammar) {
        Ok(outcome) => outcome,
        Err(ParseError::Enumerate(EnumerateError::OutOfVocabulary { token, .. })) => {
            return if settings.json {
                render_json(&ParseReport::out_of_vocabulary(input, &token))
            } else {
                Ok(format!("Out of Vocabulary: {token}\n"))
            };
        }
        Err(e) => return Err(e.into()),
    };

    if settings.json {
        render_json(&ParseReport::from_outcome(input, &outcome, settings.debug))
    } else {
        Ok(render_text(&outcome, settings.debug))
    }
}

fn render_json(report: &ParseReport) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');
    Ok(text)
}

pub fn render_text(outcome: &ParseOutcome, debug: bool) -> String {
    let mut out = String::new();
    if outcome.is_empty() {
        out.push_str("No valid parses.\n");
        if debug {
            for failure in &outcome.failures {
                let _ = writeln!(out, "  #{} {}: {}", failure.candidate.0, failure.array, failure.error);
            }
        }
        return out;
    }

    out.push_str("Valid parses found:\n");
    for tree in &outcome.parses {
        out.push_str("-----\n");
        let _ = writeln!(out, "{}", tree.to_brackets());
        if debug {
            let _ = writeln!(out, "{tree:#?}");
        }
    }
    out
}
