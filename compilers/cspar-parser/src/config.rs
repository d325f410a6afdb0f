use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cspar_lexicon::LexiconRegistry;
use cspar_protocol::Constraint;

/// Categories whose merges may join material from different lexica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseHeads(BTreeSet<String>);

impl PhaseHeads {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(categories.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// An unconstrained category is never a phase head.
    pub fn licenses(&self, category: &Constraint<String>) -> bool {
        category.value().is_some_and(|c| self.0.contains(c))
    }
}

impl Default for PhaseHeads {
    /// Little v and C.
    fn default() -> Self {
        Self::new(["v", "c"])
    }
}

/// Resource caps for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBudget {
    /// Merge-parser steps allowed per lexical array.
    pub max_steps: usize,
    /// Cap on the cartesian product of span readings.
    pub max_lexical_arrays: usize,
}

impl Default for ParseBudget {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_lexical_arrays: 4_096,
        }
    }
}

/// Everything the enumerator and merge parser consult: the lexica, the phase
/// heads and the budget. Built once, passed by reference.
#[derive(Debug)]
pub struct Grammar {
    registry: LexiconRegistry,
    phase_heads: PhaseHeads,
    budget: ParseBudget,
}

impl Grammar {
    pub fn new(registry: LexiconRegistry) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder(registry: LexiconRegistry) -> GrammarBuilder {
        GrammarBuilder {
            registry,
            phase_heads: PhaseHeads::default(),
            budget: ParseBudget::default(),
        }
    }

    pub fn registry(&self) -> &LexiconRegistry {
        &self.registry
    }

    pub fn phase_heads(&self) -> &PhaseHeads {
        &self.phase_heads
    }

    pub fn budget(&self) -> ParseBudget {
        self.budget
    }
}

pub struct GrammarBuilder {
    registry: LexiconRegistry,
    phase_heads: PhaseHeads,
    budget: ParseBudget,
}

impl GrammarBuilder {
    pub fn phase_heads(mut self, phase_heads: PhaseHeads) -> Self {
        self.phase_heads = phase_heads;
        self
    }

    pub fn budget(mut self, budget: ParseBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.budget.max_steps = max_steps;
        self
    }

    pub fn max_lexical_arrays(mut self, max_lexical_arrays: usize) -> Self {
        self.budget.max_lexical_arrays = max_lexical_arrays;
        self
    }

    pub fn build(self) -> Grammar {
        Grammar {
            registry: self.registry,
            phase_heads: self.phase_heads,
            budget: self.budget,
        }
    }
}

/// Cooperative cancellation, checked between merge-parser steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
