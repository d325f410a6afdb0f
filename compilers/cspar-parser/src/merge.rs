use cspar_protocol::{Direction, SyntacticObject};

use crate::config::PhaseHeads;
use crate::error::MergeError;
use crate::phase::{last_phase_lexicon, lexica_compatible};

/// Does `head`'s next requirement point in `direction` and accept `candidate`?
pub fn selects(head: &SyntacticObject, direction: Direction, candidate: &SyntacticObject) -> bool {
    head.pending()
        .is_some_and(|s| s.direction == direction && s.object.matches(candidate))
}

/// Merges `head` with `complement`, consuming the head's first selection.
///
/// `head_side` is where the head sits in the result. The merge is refused when
/// the two phase-lexicon sets disagree, unless the head is a phase head.
pub fn merge(
    head: SyntacticObject,
    complement: SyntacticObject,
    head_side: Direction,
    phase_heads: &PhaseHeads,
) -> Result<SyntacticObject, MergeError> {
    if head.pending().is_none() {
        return Err(MergeError::NothingToSelect(head.to_brackets()));
    }

    let head_tags = last_phase_lexicon(&head, phase_heads);
    let complement_tags = last_phase_lexicon(&complement, phase_heads);
    if !phase_heads.licenses(&head.category) && !lexica_compatible(&head_tags, &complement_tags) {
        return Err(MergeError::LexiconMismatch {
            category: head.category.to_string(),
            head: head_tags,
            complement: complement_tags,
        });
    }

    Ok(SyntacticObject::project(head, complement, head_side))
}
