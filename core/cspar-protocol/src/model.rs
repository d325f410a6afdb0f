use rkyv::{Archive, Deserialize, Serialize};
use crate::ids::NodeId;
use crate::syntax::Direction;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A `(direction, node)` pair referring into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SelectionRecord {
    pub direction: Direction,
    pub node: NodeId,
}

/// One syntactic-object template. Recursion goes through `NodeId`s so the
/// archived form stays flat.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NodeRecord {
    pub category: Option<String>,
    pub label: Option<String>,
    /// `Features` bits.
    pub features: u32,
    pub subcat: Vec<SelectionRecord>,
    pub generate: Vec<SelectionRecord>,
}

/// A surface span and its base readings (each a short sequence of nodes).
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct EntryRecord {
    pub span: String,
    pub readings: Vec<Vec<NodeId>>,
}

/// A declarative enrichment rule: when `pattern` matches an SO of a base
/// reading, append `subcat` and `generate` to it.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct RuleRecord {
    pub name: String,
    pub pattern: NodeId,
    pub subcat: Vec<SelectionRecord>,
    pub generate: Vec<SelectionRecord>,
}

/// A compiled lexicon, as written by the lexicon compiler.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct LexiconData {
    pub version: u32,
    pub id: String,
    pub nodes: Vec<NodeRecord>,
    pub entries: Vec<EntryRecord>,
    pub rules: Vec<RuleRecord>,
}

impl LexiconData {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index())
    }
}
