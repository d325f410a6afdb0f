use std::collections::VecDeque;

use cspar_protocol::{Direction, SyntacticObject};

use crate::config::{CancelToken, Grammar, PhaseHeads};
use crate::enumerate::LexicalArray;
use crate::error::ArrayError;
use crate::merge::{merge, selects};

/// Shift/merge machine for one lexical array.
///
/// `left` holds shifted nodes (top = most recent), `right` the nodes still to
/// examine, `current` the node built by the last merge. The machine owns every
/// node it touches; the array it was given is consumed.
struct Derivation<'a> {
    phase_heads: &'a PhaseHeads,
    cancel: Option<&'a CancelToken>,
    max_steps: usize,
    left: Vec<SyntacticObject>,
    right: VecDeque<SyntacticObject>,
    current: Option<SyntacticObject>,
    /// Shifts since the last successful merge.
    last_active: usize,
    steps: usize,
    passes: usize,
}

impl<'a> Derivation<'a> {
    fn new(array: LexicalArray, grammar: &'a Grammar, cancel: Option<&'a CancelToken>) -> Self {
        Self {
            phase_heads: grammar.phase_heads(),
            cancel,
            max_steps: grammar.budget().max_steps,
            left: Vec::new(),
            right: array.into_items().into(),
            current: None,
            last_active: 0,
            steps: 0,
            passes: 1,
        }
    }

    fn tick(&mut self) -> Result<(), ArrayError> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ArrayError::Cancelled);
        }
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(ArrayError::BudgetExhausted(self.max_steps));
        }
        Ok(())
    }

    /// Runs shift/merge passes until one saturated node remains.
    ///
    /// Unlike a literal reading of the step list, a node that is alone in the
    /// derivation from the start (a one-item array) is accepted when it is
    /// saturated, without any merge having happened.
    fn run(mut self) -> Result<SyntacticObject, ArrayError> {
        loop {
            self.tick()?;

            let node = match self.current.take().or_else(|| self.right.pop_front()) {
                Some(node) => node,
                None => return Err(ArrayError::Unparsable),
            };

            // Nothing left to combine with: the node is the whole derivation
            if self.left.is_empty() && self.right.is_empty() {
                return if node.is_saturated() {
                    tracing::trace!(steps = self.steps, passes = self.passes, "derivation complete");
                    Ok(node)
                } else {
                    Err(ArrayError::Unparsable)
                };
            }

            if node.is_saturated() {
                // Head waiting on the left for a right complement
                if self.left.last().is_some_and(|head| selects(head, Direction::Right, &node)) {
                    if let Some(head) = self.left.pop() {
                        self.merged(merge(head, node, Direction::Left, self.phase_heads)?);
                        continue;
                    }
                }
                // Head on the right looking left
                if self.right.front().is_some_and(|head| selects(head, Direction::Left, &node)) {
                    if let Some(head) = self.right.pop_front() {
                        self.merged(merge(head, node, Direction::Right, self.phase_heads)?);
                        continue;
                    }
                }
            }

            if !self.right.is_empty() {
                tracing::trace!(node = %node, "shift");
                self.left.push(node);
                self.last_active += 1;
                continue;
            }

            // End of the queue. Rescan only if a merge happened after something
            // was left behind and that something could still be a complement.
            let has_complement = self.left.iter().any(SyntacticObject::is_saturated);
            if has_complement && self.last_active < self.left.len() {
                let mut queue: VecDeque<_> = std::mem::take(&mut self.left).into();
                queue.push_back(node);
                self.right = queue;
                self.last_active = 0;
                self.passes += 1;
                tracing::trace!(pass = self.passes, items = self.right.len(), "rescan");
                continue;
            }

            return Err(ArrayError::Unparsable);
        }
    }

    fn merged(&mut self, node: SyntacticObject) {
        tracing::trace!(node = %node, "merge");
        self.current = Some(node);
        self.last_active = 0;
    }
}

/// Reduces one lexical array to a single saturated tree.
pub fn parse_array(array: LexicalArray, grammar: &Grammar) -> Result<SyntacticObject, ArrayError> {
    Derivation::new(array, grammar, None).run()
}

/// As [`parse_array`], observing `cancel` between steps.
pub fn parse_array_with(
    array: LexicalArray,
    grammar: &Grammar,
    cancel: &CancelToken,
) -> Result<SyntacticObject, ArrayError> {
    Derivation::new(array, grammar, Some(cancel)).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspar_lexicon::LexiconRegistry;
    use cspar_protocol::LexiconTag;

    fn grammar() -> Grammar {
        Grammar::new(LexiconRegistry::new())
    }

    fn tag(id: &str) -> LexiconTag {
        LexiconTag::Lexicon(id.to_string())
    }

    fn tense(label: &str) -> SyntacticObject {
        SyntacticObject::leaf("T", label)
            .selecting(Direction::Right, SyntacticObject::of_category("V"))
            .selecting(Direction::Left, SyntacticObject::of_category("D"))
            .tagged(tag("SgE"))
    }

    fn the() -> SyntacticObject {
        SyntacticObject::leaf("D", "the")
            .selecting(Direction::Right, SyntacticObject::of_category("N"))
            .tagged(tag("SgE"))
    }

    fn english(category: &str, label: &str) -> SyntacticObject {
        SyntacticObject::leaf(category, label).tagged(tag("SgE"))
    }

    fn array(items: Vec<SyntacticObject>) -> LexicalArray {
        LexicalArray::new(items)
    }

    #[test]
    fn test_determiner_noun() {
        let tree = parse_array(array(vec![the(), english("N", "man")]), &grammar()).unwrap();
        assert_eq!(tree.to_brackets(), "[D [D the] [N man]]");
    }

    #[test]
    fn test_single_saturated_item() {
        let tree = parse_array(array(vec![english("D", "john")]), &grammar()).unwrap();
        assert_eq!(tree.to_brackets(), "[D john]");

        let err = parse_array(array(vec![the()]), &grammar()).unwrap_err();
        assert_eq!(err, ArrayError::Unparsable);
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(parse_array(array(vec![]), &grammar()).unwrap_err(), ArrayError::Unparsable);
    }

    #[test]
    fn test_rescan_attaches_subject() {
        // the man -ed eat: the subject only becomes mergeable after T takes V
        let items = vec![the(), english("N", "man"), tense("-ed"), english("V", "eat")];
        let tree = parse_array(array(items), &grammar()).unwrap();
        assert_eq!(tree.to_brackets(), "[T [D [D the] [N man]] [T [T -ed] [V eat]]]");
        assert!(tree.is_saturated());
    }

    #[test]
    fn test_transitive_clause() {
        let eat = english("V", "eat").selecting(Direction::Right, SyntacticObject::of_category("D"));
        let items = vec![english("D", "john"), tense("-s"), eat, english("D", "rice")];
        let tree = parse_array(array(items), &grammar()).unwrap();
        assert_eq!(tree.to_brackets(), "[T [D john] [T [T -s] [V [V eat] [D rice]]]]");
    }

    #[test]
    fn test_unsatisfied_object_fails() {
        let eat = english("V", "eat").selecting(Direction::Right, SyntacticObject::of_category("D"));
        let items = vec![english("D", "john"), tense("-s"), eat];
        assert_eq!(parse_array(array(items), &grammar()).unwrap_err(), ArrayError::Unparsable);
    }

    #[test]
    fn test_lexicon_mismatch_aborts_array() {
        let le = SyntacticObject::leaf("T", "le")
            .selecting(Direction::Left, SyntacticObject::of_category("V"))
            .selecting(Direction::Left, SyntacticObject::of_category("D"))
            .tagged(tag("Mandarin"));
        let chi = SyntacticObject::leaf("V", "chi").tagged(tag("Mandarin"));
        let items = vec![english("D", "john"), chi, le];

        let err = parse_array(array(items.clone()), &grammar()).unwrap_err();
        assert!(err.is_lexicon_mismatch());

        let switching = Grammar::builder(LexiconRegistry::new())
            .phase_heads(PhaseHeads::new(["v", "c", "T"]))
            .build();
        let tree = parse_array(array(items), &switching).unwrap();
        assert_eq!(tree.to_brackets(), "[T [D john] [T [V chi] [T le]]]");
    }

    #[test]
    fn test_mandarin_verb_takes_english_clause() {
        let shuo = SyntacticObject::leaf("V", "shuo")
            .selecting(Direction::Right, SyntacticObject::of_category("c"))
            .tagged(tag("Mandarin"));
        let that = english("c", "that").selecting(Direction::Right, SyntacticObject::of_category("T"));
        let items = vec![shuo, that, english("D", "john"), tense("-s"), english("V", "eat")];

        let tree = parse_array(array(items.clone()), &grammar()).unwrap();
        assert_eq!(
            tree.to_brackets(),
            "[V [V shuo] [c [c that] [T [D john] [T [T -s] [V eat]]]]]"
        );

        let no_phases = Grammar::builder(LexiconRegistry::new())
            .phase_heads(PhaseHeads::none())
            .build();
        assert!(parse_array(array(items), &no_phases).unwrap_err().is_lexicon_mismatch());
    }

    #[test]
    fn test_idempotent_on_fresh_copies() {
        let items = vec![the(), english("N", "man"), tense("-ed"), english("V", "eat")];
        let first = parse_array(array(items.clone()), &grammar()).unwrap();
        let second = parse_array(array(items), &grammar()).unwrap();
        assert_eq!(first.to_brackets(), second.to_brackets());
    }

    #[test]
    fn test_step_budget() {
        let items = vec![the(), english("N", "man"), tense("-ed"), english("V", "eat")];
        let tight = Grammar::builder(LexiconRegistry::new()).max_steps(3).build();
        assert_eq!(parse_array(array(items), &tight).unwrap_err(), ArrayError::BudgetExhausted(3));
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = parse_array_with(array(vec![the(), english("N", "man")]), &grammar(), &cancel).unwrap_err();
        assert_eq!(err, ArrayError::Cancelled);
    }

    #[test]
    fn test_no_progress_terminates() {
        // Three saturated nouns: nothing ever merges
        let items = vec![english("N", "a"), english("N", "b"), english("N", "c")];
        assert_eq!(parse_array(array(items), &grammar()).unwrap_err(), ArrayError::Unparsable);
    }
}
