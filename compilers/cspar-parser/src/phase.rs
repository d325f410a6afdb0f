use std::collections::BTreeSet;

use cspar_protocol::{LexiconTag, SyntacticObject};

use crate::config::PhaseHeads;

/// Lexicon identity of the material in `node`'s current phase.
///
/// Leaves and phase heads answer with their own tag. Any other node unions
/// its children's answers; silent (unmarked) material drops out as soon as a
/// concrete tag is present.
pub fn last_phase_lexicon(node: &SyntacticObject, phase_heads: &PhaseHeads) -> BTreeSet<LexiconTag> {
    if node.is_leaf() || phase_heads.licenses(&node.category) {
        return BTreeSet::from([node.lexicon.clone()]);
    }

    let mut tags: BTreeSet<LexiconTag> = node
        .children()
        .iter()
        .flat_map(|child| last_phase_lexicon(child, phase_heads))
        .collect();

    if tags.len() > 1 {
        tags.remove(&LexiconTag::Unmarked);
    }
    tags
}

fn is_unmarked_only(tags: &BTreeSet<LexiconTag>) -> bool {
    tags.len() == 1 && tags.contains(&LexiconTag::Unmarked)
}

/// May two phase-lexicon sets meet under a non-phase head?
pub fn lexica_compatible(head: &BTreeSet<LexiconTag>, complement: &BTreeSet<LexiconTag>) -> bool {
    head == complement || is_unmarked_only(head) || is_unmarked_only(complement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspar_protocol::Direction;
    use proptest::prelude::*;

    fn tag(id: &str) -> LexiconTag {
        LexiconTag::Lexicon(id.to_string())
    }

    fn leaf(category: &str, label: &str, lexicon: &str) -> SyntacticObject {
        SyntacticObject::leaf(category, label)
            .selecting(Direction::Right, SyntacticObject::any())
            .tagged(tag(lexicon))
    }

    #[test]
    fn test_null_sibling_resolved_by_concrete_tag() {
        let v = SyntacticObject::null("T").selecting(Direction::Right, SyntacticObject::any());
        let node = SyntacticObject::project(v, SyntacticObject::leaf("V", "eat").tagged(tag("SgE")), Direction::Left);
        assert_eq!(last_phase_lexicon(&node, &PhaseHeads::none()), BTreeSet::from([tag("SgE")]));
    }

    #[test]
    fn test_all_null_stays_unmarked() {
        let t = SyntacticObject::null("T").selecting(Direction::Right, SyntacticObject::any());
        let node = SyntacticObject::project(t, SyntacticObject::null("V"), Direction::Left);
        assert_eq!(last_phase_lexicon(&node, &PhaseHeads::none()), BTreeSet::from([LexiconTag::Unmarked]));
    }

    #[test]
    fn test_mixed_lexica_union() {
        let head = leaf("V", "chi", "Mandarin");
        let node = SyntacticObject::project(head, SyntacticObject::leaf("D", "rice").tagged(tag("SgE")), Direction::Left);
        assert_eq!(
            last_phase_lexicon(&node, &PhaseHeads::none()),
            BTreeSet::from([tag("Mandarin"), tag("SgE")])
        );
    }

    #[test]
    fn test_phase_head_stops_recursion() {
        let v = SyntacticObject::null("v").selecting(Direction::Right, SyntacticObject::any());
        let vp = SyntacticObject::project(v, SyntacticObject::leaf("V", "eat").tagged(tag("SgE")), Direction::Left);

        // A phase answers with its own (unmarked) tag
        assert_eq!(last_phase_lexicon(&vp, &PhaseHeads::default()), BTreeSet::from([LexiconTag::Unmarked]));
        // Without the phase boundary the English verb shows through
        assert_eq!(last_phase_lexicon(&vp, &PhaseHeads::none()), BTreeSet::from([tag("SgE")]));
    }

    #[test]
    fn test_pronounced_phase_head_is_unmarked() {
        let that = leaf("c", "that", "SgE");
        let cp = SyntacticObject::project(that, SyntacticObject::leaf("T", "-s").tagged(tag("SgE")), Direction::Left);

        assert_eq!(last_phase_lexicon(&cp, &PhaseHeads::default()), BTreeSet::from([LexiconTag::Unmarked]));
        assert_eq!(last_phase_lexicon(&cp, &PhaseHeads::none()), BTreeSet::from([tag("SgE")]));
    }

    #[test]
    fn test_compatibility() {
        let sge = BTreeSet::from([tag("SgE")]);
        let man = BTreeSet::from([tag("Mandarin")]);
        let unmarked = BTreeSet::from([LexiconTag::Unmarked]);
        let both = BTreeSet::from([tag("SgE"), tag("Mandarin")]);

        assert!(lexica_compatible(&sge, &sge));
        assert!(lexica_compatible(&sge, &unmarked));
        assert!(lexica_compatible(&unmarked, &man));
        assert!(!lexica_compatible(&sge, &man));
        assert!(!lexica_compatible(&both, &sge));
    }

    proptest! {
        #[test]
        fn test_leaf_is_its_own_tag(id in proptest::option::of("[A-Za-z]{1,8}"), category in "[a-zA-Z]{1,2}") {
            let tag = id.map(LexiconTag::Lexicon).unwrap_or_default();
            let leaf = SyntacticObject::leaf(&category, "x").tagged(tag.clone());
            prop_assert_eq!(last_phase_lexicon(&leaf, &PhaseHeads::default()), BTreeSet::from([tag]));
        }
    }
}
