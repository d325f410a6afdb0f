use cspar_protocol::Direction;

use crate::error::LexiconError;
use crate::Reading;

/// Upper bound on expansion rounds. Each round materializes one more level
/// of generated heads; lexica in practice need two or three.
pub const MAX_GENERATE_ROUNDS: usize = 16;

/// Materializes every `generate` entry of a reading as a sibling SO.
///
/// Left entries go before the host and right entries after it, each side in
/// declaration order. The host's `generate` list is cleared. Heads that carry
/// their own `generate` entries are expanded in the next round, until no
/// entry is left.
pub fn expand_generate(span: &str, reading: Reading) -> Result<Reading, LexiconError> {
    let mut current = reading;

    for _ in 0..MAX_GENERATE_ROUNDS {
        if current.iter().all(|so| so.generate.is_empty()) {
            return Ok(current);
        }

        let mut next = Vec::with_capacity(current.len() + 2);
        for mut so in current {
            if so.generate.is_empty() {
                next.push(so);
                continue;
            }

            let (left, right): (Vec<_>, Vec<_>) = std::mem::take(&mut so.generate)
                .into_iter()
                .partition(|s| s.direction == Direction::Left);

            next.extend(left.into_iter().map(|s| s.object));
            next.push(so);
            next.extend(right.into_iter().map(|s| s.object));
        }
        current = next;
    }

    if current.iter().all(|so| so.generate.is_empty()) {
        Ok(current)
    } else {
        Err(LexiconError::GenerateDidNotConverge {
            span: span.to_string(),
            rounds: MAX_GENERATE_ROUNDS,
        })
    }
}
