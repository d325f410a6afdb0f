use cspar_protocol::{Selection, SyntacticObject};
use thiserror::Error;

use crate::Reading;

/// What a rule did to one base reading.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The rule matched and produced an enriched copy.
    Applied(Reading),
    /// The rule's pattern did not match; nothing to add.
    Declined,
}

#[derive(Debug, Error)]
#[error("rule '{rule}' failed: {reason}")]
pub struct RuleError {
    pub rule: String,
    pub reason: String,
}

/// A lexicon-specific enrichment rule. Rules never modify the base reading;
/// an `Applied` result is added next to it.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, reading: &[SyntacticObject]) -> Result<RuleOutcome, RuleError>;
}

/// Declarative rule: append `subcat` and `generate` entries to the first SO
/// of the reading that `pattern` matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRule {
    pub name: String,
    pub pattern: SyntacticObject,
    pub subcat: Vec<Selection>,
    pub generate: Vec<Selection>,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, pattern: SyntacticObject) -> Self {
        Self {
            name: name.into(),
            pattern,
            subcat: Vec::new(),
            generate: Vec::new(),
        }
    }

    pub fn selecting(mut self, selection: Selection) -> Self {
        self.subcat.push(selection);
        self
    }

    pub fn generating(mut self, selection: Selection) -> Self {
        self.generate.push(selection);
        self
    }
}

impl Rule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, reading: &[SyntacticObject]) -> Result<RuleOutcome, RuleError> {
        let Some(pos) = reading.iter().position(|so| self.pattern.matches(so)) else {
            return Ok(RuleOutcome::Declined);
        };

        let mut enriched = reading.to_vec();
        let target = &mut enriched[pos];
        target.subcat.extend(self.subcat.iter().cloned());
        target.generate.extend(self.generate.iter().cloned());
        Ok(RuleOutcome::Applied(enriched))
    }
}

/// Adapter for rules written as closures.
pub struct FnRule<F> {
    name: String,
    transform: F,
}

impl<F> FnRule<F>
where
    F: Fn(&[SyntacticObject]) -> Result<RuleOutcome, RuleError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, transform: F) -> Self {
        Self { name: name.into(), transform }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&[SyntacticObject]) -> Result<RuleOutcome, RuleError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, reading: &[SyntacticObject]) -> Result<RuleOutcome, RuleError> {
        (self.transform)(reading)
    }
}

/// Runs every rule over every base reading. The base readings come first and
/// are always kept; a failing rule is logged and treated as declined.
pub fn apply_rules(rules: &[Box<dyn Rule>], base: Vec<Reading>) -> Vec<Reading> {
    if rules.is_empty() {
        return base;
    }

    let mut enriched = Vec::with_capacity(base.len() * 2);
    for reading in &base {
        for rule in rules {
            match rule.apply(reading) {
                Ok(RuleOutcome::Applied(out)) => {
                    tracing::trace!(rule = rule.name(), "rule applied");
                    enriched.push(out);
                }
                Ok(RuleOutcome::Declined) => {}
                Err(err) => tracing::warn!(%err, "rule treated as no-op"),
            }
        }
    }

    let mut out = base;
    out.extend(enriched);
    out
}
