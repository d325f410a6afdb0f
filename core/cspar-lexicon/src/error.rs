use cspar_protocol::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("unknown feature marker '{0}'")]
    UnknownFeature(String),

    #[error("generate expansion of '{span}' did not settle after {rounds} rounds")]
    GenerateDidNotConverge { span: String, rounds: usize },

    #[error("node {0:?} is outside the lexicon arena")]
    NodeOutOfRange(NodeId),

    #[error("lexicon needs {0} nodes, more than a node id can address")]
    TooManyNodes(usize),

    #[error("node templates nest deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("invalid lexicon archive: {0}")]
    Archive(String),

    #[error("unsupported lexicon archive version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("invalid lexicon source: {0}")]
    Json(#[from] serde_json::Error),
}
