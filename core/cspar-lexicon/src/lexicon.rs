use std::collections::BTreeMap;
use std::fmt;

use cspar_protocol::{LexiconTag, SyntacticObject};

use crate::error::LexiconError;
use crate::generate::expand_generate;
use crate::rules::{apply_rules, Rule};
use crate::source::LexiconSource;
use crate::{LexiconLookup, Reading};

/// One lexicon: base readings per surface span plus enrichment rules.
///
/// Stored readings are templates. Every lookup works on fresh copies, so no
/// two derivations ever share a node.
pub struct Lexicon {
    id: String,
    entries: BTreeMap<String, Vec<Reading>>,
    rules: Vec<Box<dyn Rule>>,
}

impl Lexicon {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: BTreeMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn from_source(source: &LexiconSource) -> Result<Self, LexiconError> {
        let mut lexicon = Lexicon::new(source.id.clone());

        for (span, readings) in &source.entries {
            for reading in readings {
                let objects = reading
                    .objects()
                    .iter()
                    .map(|t| t.to_object())
                    .collect::<Result<Reading, _>>()?;
                lexicon.add_entry(span, objects);
            }
        }

        for rule in &source.rules {
            lexicon.rules.push(Box::new(rule.to_rule()?));
        }

        Ok(lexicon)
    }

    pub fn from_json(text: &str) -> Result<Self, LexiconError> {
        Self::from_source(&LexiconSource::from_json(text)?)
    }

    /// Adds a base reading for `span` (after any existing ones).
    pub fn add_entry(&mut self, span: &str, reading: Reading) {
        self.entries.entry(span.to_string()).or_default().push(reading);
    }

    pub fn with_entry(mut self, span: &str, reading: Reading) -> Self {
        self.add_entry(span, reading);
        self
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn spans(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Base readings, then rule output, each generate-expanded and tagged.
    fn expand(&self, span: &str) -> Result<Vec<Reading>, LexiconError> {
        let Some(base) = self.entries.get(span) else {
            return Ok(Vec::new());
        };

        let tag = LexiconTag::Lexicon(self.id.clone());
        apply_rules(&self.rules, base.clone())
            .into_iter()
            .map(|reading| {
                let mut reading = expand_generate(span, reading)?;
                tag_reading(&tag, &mut reading);
                Ok(reading)
            })
            .collect()
    }
}

impl LexiconLookup for Lexicon {
    fn id(&self) -> &str {
        &self.id
    }

    #[tracing::instrument(level = "trace", skip(self), fields(lexicon = %self.id))]
    fn lookup(&self, span: &str) -> Result<Vec<Reading>, LexiconError> {
        self.expand(span)
    }
}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicon")
            .field("id", &self.id)
            .field("entries", &self.entries.len())
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Null leaves stay unmarked until a phase boundary resolves them.
fn tag_reading(tag: &LexiconTag, reading: &mut [SyntacticObject]) {
    for so in reading.iter_mut().filter(|so| !so.is_null()) {
        so.lexicon = tag.clone();
    }
}
