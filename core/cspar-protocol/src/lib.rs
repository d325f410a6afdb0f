#![no_std] // Shared with the wasm engine

extern crate alloc;

// Enable std for tests/tools
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod features;
pub mod ids;
pub mod model;
pub mod syntax;

// Re-export core types for convenience
pub use features::Features;
pub use ids::{CandidateId, NodeId};
pub use model::*;
pub use syntax::{Constraint, Direction, LexiconTag, Selection, SyntacticObject, NULL_LABEL};
