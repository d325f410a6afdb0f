use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::features::Features;

/// Label carried by phonologically null leaves (silent functional heads).
pub const NULL_LABEL: &str = "∅";

/// A category or label slot: either unconstrained or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constraint<T> {
    Any,
    Exactly(T),
}

impl<T> Default for Constraint<T> {
    fn default() -> Self {
        Constraint::Any
    }
}

impl<T: PartialEq> Constraint<T> {
    /// Does a criteria slot accept the candidate's slot?
    /// An `Any` candidate only satisfies an `Any` criteria.
    pub fn admits(&self, candidate: &Constraint<T>) -> bool {
        match (self, candidate) {
            (Constraint::Any, _) => true,
            (Constraint::Exactly(want), Constraint::Exactly(have)) => want == have,
            (Constraint::Exactly(_), Constraint::Any) => false,
        }
    }
}

impl<T> Constraint<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Constraint::Any => None,
            Constraint::Exactly(v) => Some(v),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Constraint::Any)
    }
}

impl<T> From<Option<T>> for Constraint<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Constraint::Exactly(v),
            None => Constraint::Any,
        }
    }
}

impl From<&str> for Constraint<String> {
    fn from(value: &str) -> Self {
        Constraint::Exactly(String::from(value))
    }
}

impl<T: fmt::Display> fmt::Display for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => f.write_str("*"),
            Constraint::Exactly(v) => v.fmt(f),
        }
    }
}

/// Linear direction of a selection or of a generated sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Direction {
    Left = 0,
    Right = 1,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("left"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// Which lexicon contributed a leaf. Silent leaves stay `Unmarked`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LexiconTag {
    #[default]
    Unmarked,
    Lexicon(String),
}

impl LexiconTag {
    pub fn is_unmarked(&self) -> bool {
        matches!(self, LexiconTag::Unmarked)
    }
}

impl fmt::Display for LexiconTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexiconTag::Unmarked => f.write_str("unmarked"),
            LexiconTag::Lexicon(id) => f.write_str(id),
        }
    }
}

/// One `(direction, object)` pair.
///
/// In `subcat` the object is a criteria: the next adjacent SO on `direction`
/// must match it. In `generate` the object is a functional head to
/// materialize on `direction` before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub direction: Direction,
    pub object: SyntacticObject,
}

impl Selection {
    pub fn new(direction: Direction, object: SyntacticObject) -> Self {
        Self { direction, object }
    }
}

/// A node of a parse tree: a lexical leaf or the result of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntacticObject {
    pub category: Constraint<String>,
    pub label: Constraint<String>,
    pub lexicon: LexiconTag,
    pub features: Features,
    /// Ordered; only the first entry is ever checked.
    pub subcat: Vec<Selection>,
    pub generate: Vec<Selection>,
    children: Option<Box<[SyntacticObject; 2]>>,
}

impl SyntacticObject {
    /// The universal acceptor: matches every candidate.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn leaf(category: &str, label: &str) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// A phonologically null leaf of the given category.
    pub fn null(category: &str) -> Self {
        Self::leaf(category, NULL_LABEL)
    }

    /// Criteria that only constrains the category.
    pub fn of_category(category: &str) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features |= features;
        self
    }

    pub fn selecting(mut self, direction: Direction, criteria: SyntacticObject) -> Self {
        self.subcat.push(Selection::new(direction, criteria));
        self
    }

    pub fn generating(mut self, direction: Direction, head: SyntacticObject) -> Self {
        self.generate.push(Selection::new(direction, head));
        self
    }

    pub fn tagged(mut self, tag: LexiconTag) -> Self {
        self.lexicon = tag;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_null(&self) -> bool {
        matches!(&self.label, Constraint::Exactly(l) if l == NULL_LABEL)
    }

    pub fn children(&self) -> &[SyntacticObject] {
        match &self.children {
            Some(pair) => &pair[..],
            None => &[],
        }
    }

    /// The next unsatisfied requirement, if any.
    pub fn pending(&self) -> Option<&Selection> {
        self.subcat.first()
    }

    pub fn is_saturated(&self) -> bool {
        self.subcat.is_empty()
    }

    /// Criteria-side compatibility check: category and label slots must admit
    /// the candidate's, and the candidate must carry every criteria feature.
    pub fn matches(&self, candidate: &SyntacticObject) -> bool {
        self.category.admits(&candidate.category)
            && self.label.admits(&candidate.label)
            && candidate.features.contains(self.features)
    }

    /// Builds the derived node for `head` selecting `complement`.
    ///
    /// The projection takes the head's category (also as its display label)
    /// and features, and drops the head's first subcat entry. Lexicon tags
    /// belong to leaves, so the projection itself is unmarked.
    /// No lexicon-consistency check happens here.
    pub fn project(head: SyntacticObject, complement: SyntacticObject, head_side: Direction) -> Self {
        let category = head.category.clone();
        let label = head.category.clone();
        let features = head.features;
        let subcat = head.subcat.iter().skip(1).cloned().collect();
        let pair = match head_side {
            Direction::Left => [head, complement],
            Direction::Right => [complement, head],
        };
        Self {
            category,
            label,
            lexicon: LexiconTag::Unmarked,
            features,
            subcat,
            generate: Vec::new(),
            children: Some(Box::new(pair)),
        }
    }

    /// Bracketed rendering: leaves as `[category label]`, derived nodes as
    /// `[label left right]`.
    pub fn to_brackets(&self) -> String {
        alloc::format!("{}", self)
    }
}

impl fmt::Display for SyntacticObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.children {
            None => write!(f, "[{} {}]", self.category, self.label),
            Some(pair) => write!(f, "[{} {} {}]", self.label, pair[0], pair[1]),
        }
    }
}
