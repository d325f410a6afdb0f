#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

bitflags! {
    /// Atomic markers carried by a syntactic object.
    ///
    /// Selection only ever asks whether the candidate carries *at least* the
    /// criteria's markers, so the set is compared with `contains`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Features: u32 {
        // Verb form (Bits 0-2)
        const INF = 1;
        const FINITE = 2;
        const PERFECTIVE = 4;

        // Tense (Bits 3-4)
        const PRESENT = 8;
        const PAST = 16;

        // Number (Bits 5-6)
        const SINGULAR = 32;
        const PLURAL = 64;

        // Person (Bits 7-9)
        const FIRST_PERSON = 128;
        const SECOND_PERSON = 256;
        const THIRD_PERSON = 512;

        // Case (Bits 10-11)
        const NOMINATIVE = 1024;
        const ACCUSATIVE = 2048;

        // Clause typing (Bits 12-14)
        const REL = 4096;
        const WH = 8192;
        const Q = 16384;
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::empty()
    }
}

impl Features {
    /// Looks a marker up by the name used in lexicon sources (`"INF"`, `"REL"`, ...).
    /// Case-insensitive; an interpretable-feature prefix (`"iRel"`) resolves to the bare marker.
    pub fn from_marker(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let trimmed = upper.strip_prefix('I').filter(|rest| Self::from_name(rest).is_some());
        Self::from_name(&upper).or_else(|| trimmed.and_then(Self::from_name))
    }
}
