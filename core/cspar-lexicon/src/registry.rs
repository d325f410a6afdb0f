use crate::error::LexiconError;
use crate::{LexiconLookup, Reading};

/// Ordered collection of lexica, queried in registration order.
///
/// Results are concatenated: no lexicon shadows another, so cross-lexicon
/// ambiguity survives into enumeration.
#[derive(Default)]
pub struct LexiconRegistry {
    lexica: Vec<Box<dyn LexiconLookup>>,
}

impl LexiconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, lexicon: impl LexiconLookup + 'static) {
        tracing::debug!(id = lexicon.id(), "registered lexicon");
        self.lexica.push(Box::new(lexicon));
    }

    pub fn with(mut self, lexicon: impl LexiconLookup + 'static) -> Self {
        self.register(lexicon);
        self
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.lexica.iter().map(|l| l.id())
    }

    pub fn len(&self) -> usize {
        self.lexica.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexica.is_empty()
    }

    pub fn lookup(&self, span: &str) -> Result<Vec<Reading>, LexiconError> {
        let mut readings = Vec::new();
        for lexicon in &self.lexica {
            readings.extend(lexicon.lookup(span)?);
        }
        Ok(readings)
    }
}

impl std::fmt::Debug for LexiconRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexicon;
    use cspar_protocol::{LexiconTag, SyntacticObject};

    #[test]
    fn test_results_concatenate_in_order() {
        let registry = LexiconRegistry::new()
            .with(Lexicon::new("A").with_entry("x", vec![SyntacticObject::leaf("N", "x")]))
            .with(Lexicon::new("B").with_entry("x", vec![SyntacticObject::leaf("D", "x")]))
            .with(Lexicon::new("C"));

        let readings = registry.lookup("x").unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0][0].lexicon, LexiconTag::Lexicon("A".to_string()));
        assert_eq!(readings[1][0].lexicon, LexiconTag::Lexicon("B".to_string()));

        assert!(registry.lookup("y").unwrap().is_empty());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
