use std::collections::BTreeMap;

use cspar_protocol::{EntryRecord, Features, LexiconData, NodeId, NodeRecord, RuleRecord, SelectionRecord};
use rkyv::AlignedVec;

use crate::error::LexiconError;
use crate::lexicon::Lexicon;
use crate::source::{parse_features, LexiconSource, ObjectTemplate, ReadingTemplate, RuleTemplate, SelectionTemplate};

/// Guards decompilation against cyclic node references in a crafted archive.
pub const MAX_NESTING: usize = 64;

/// Flattens a source into the node arena written by the lexicon compiler.
pub fn compile_source(source: &LexiconSource) -> Result<LexiconData, LexiconError> {
    let mut arena = Arena::default();

    let mut entries = Vec::with_capacity(source.entries.len());
    for (span, readings) in &source.entries {
        let readings = readings
            .iter()
            .map(|reading| reading.objects().iter().map(|t| arena.push(t)).collect::<Result<Vec<NodeId>, _>>())
            .collect::<Result<Vec<Vec<NodeId>>, _>>()?;
        entries.push(EntryRecord { span: span.clone(), readings });
    }

    let mut rules = Vec::with_capacity(source.rules.len());
    for rule in &source.rules {
        rules.push(RuleRecord {
            name: rule.name.clone(),
            pattern: arena.push(&rule.pattern)?,
            subcat: arena.push_selections(&rule.subcat)?,
            generate: arena.push_selections(&rule.generate)?,
        });
    }

    Ok(LexiconData {
        version: LexiconData::CURRENT_VERSION,
        id: source.id.clone(),
        nodes: arena.nodes,
        entries,
        rules,
    })
}

/// Rebuilds the nested source form of a compiled lexicon.
pub fn decompile(data: &LexiconData) -> Result<LexiconSource, LexiconError> {
    if data.version != LexiconData::CURRENT_VERSION {
        return Err(LexiconError::Version {
            found: data.version,
            expected: LexiconData::CURRENT_VERSION,
        });
    }

    let mut entries: BTreeMap<String, Vec<ReadingTemplate>> = BTreeMap::new();
    for entry in &data.entries {
        let readings = entries.entry(entry.span.clone()).or_default();
        for ids in &entry.readings {
            let objects = ids
                .iter()
                .map(|id| template(data, *id, 0))
                .collect::<Result<Vec<_>, _>>()?;
            readings.push(ReadingTemplate::Sequence(objects));
        }
    }

    let rules = data
        .rules
        .iter()
        .map(|rule| {
            Ok(RuleTemplate {
                name: rule.name.clone(),
                pattern: template(data, rule.pattern, 0)?,
                subcat: selection_templates(data, &rule.subcat, 0)?,
                generate: selection_templates(data, &rule.generate, 0)?,
            })
        })
        .collect::<Result<Vec<_>, LexiconError>>()?;

    Ok(LexiconSource {
        id: data.id.clone(),
        rules,
        entries,
    })
}

/// Serializes a compiled lexicon to its archive bytes.
pub fn to_archive_bytes(data: &LexiconData) -> Result<AlignedVec, LexiconError> {
    rkyv::to_bytes::<_, 1024>(data).map_err(|e| LexiconError::Archive(format!("{e:?}")))
}

/// Validates archive bytes and deserializes them.
pub fn read_archive(bytes: &[u8]) -> Result<LexiconData, LexiconError> {
    // Files read from disk carry no alignment guarantee
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);

    rkyv::from_bytes::<LexiconData>(&aligned).map_err(|e| LexiconError::Archive(format!("{e:?}")))
}

impl Lexicon {
    pub fn from_data(data: &LexiconData) -> Result<Self, LexiconError> {
        Self::from_source(&decompile(data)?)
    }

    pub fn from_archive(bytes: &[u8]) -> Result<Self, LexiconError> {
        Self::from_data(&read_archive(bytes)?)
    }
}

#[derive(Default)]
struct Arena {
    nodes: Vec<NodeRecord>,
}

impl Arena {
    fn push(&mut self, template: &ObjectTemplate) -> Result<NodeId, LexiconError> {
        let features = parse_features(&template.features)?;
        let subcat = self.push_selections(&template.subcat)?;
        let generate = self.push_selections(&template.generate)?;

        let id = node_id(self.nodes.len())?;
        self.nodes.push(NodeRecord {
            category: template.category.clone(),
            label: template.label.clone(),
            features: features.bits(),
            subcat,
            generate,
        });
        Ok(id)
    }

    fn push_selections(&mut self, selections: &[SelectionTemplate]) -> Result<Vec<SelectionRecord>, LexiconError> {
        selections
            .iter()
            .map(|s| {
                Ok(SelectionRecord {
                    direction: s.direction,
                    node: self.push(&s.object)?,
                })
            })
            .collect()
    }
}

fn node_id(index: usize) -> Result<NodeId, LexiconError> {
    u32::try_from(index)
        .map(NodeId::new)
        .map_err(|_| LexiconError::TooManyNodes(index))
}

fn template(data: &LexiconData, id: NodeId, depth: usize) -> Result<ObjectTemplate, LexiconError> {
    if depth > MAX_NESTING {
        return Err(LexiconError::NestingTooDeep(MAX_NESTING));
    }
    let node = data.node(id).ok_or(LexiconError::NodeOutOfRange(id))?;

    let features = Features::from_bits_truncate(node.features)
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect();

    Ok(ObjectTemplate {
        category: node.category.clone(),
        label: node.label.clone(),
        features,
        subcat: selection_templates(data, &node.subcat, depth + 1)?,
        generate: selection_templates(data, &node.generate, depth + 1)?,
    })
}

fn selection_templates(
    data: &LexiconData,
    records: &[SelectionRecord],
    depth: usize,
) -> Result<Vec<SelectionTemplate>, LexiconError> {
    records
        .iter()
        .map(|r| {
            Ok(SelectionTemplate {
                direction: r.direction,
                object: template(data, r.node, depth)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LexiconLookup;

    const SOURCE: &str = r#"{
        "id": "SgE",
        "rules": [{ "name": "relative", "pattern": { "category": "N" },
                    "subcat": [{ "direction": "right", "object": { "category": "C", "features": ["REL"] } }] }],
        "entries": {
            "man": [{ "category": "N", "label": "man" }],
            "eats": [{ "category": "V", "label": "eat", "features": ["FINITE"],
                       "generate": [{ "direction": "left",
                                      "object": { "category": "T", "label": "-s",
                                                  "subcat": [{ "direction": "right", "object": { "category": "V" } }] } }] }]
        }
    }"#;

    #[test]
    fn test_archive_round_trip_preserves_lookups() {
        let source = LexiconSource::from_json(SOURCE).unwrap();
        let direct = Lexicon::from_source(&source).unwrap();

        let data = compile_source(&source).unwrap();
        let bytes = to_archive_bytes(&data).unwrap();
        let loaded = Lexicon::from_archive(&bytes).unwrap();

        assert_eq!(loaded.id(), "SgE");
        for span in ["man", "eats", "woman"] {
            assert_eq!(direct.lookup(span).unwrap(), loaded.lookup(span).unwrap());
        }
    }

    #[test]
    fn test_children_precede_parents_in_arena() {
        let data = compile_source(&LexiconSource::from_json(SOURCE).unwrap()).unwrap();
        for (index, node) in data.nodes.iter().enumerate() {
            for s in node.subcat.iter().chain(&node.generate) {
                assert!(s.node.index() < index);
            }
        }
    }

    #[test]
    fn test_node_ids_are_checked() {
        assert_eq!(node_id(7).unwrap(), NodeId(7));
        assert_eq!(node_id(u32::MAX as usize).unwrap(), NodeId(u32::MAX));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_node_id_overflow() {
        let index = u32::MAX as usize + 1;
        assert!(matches!(node_id(index), Err(LexiconError::TooManyNodes(i)) if i == index));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = Lexicon::from_archive(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, LexiconError::Archive(_)));
    }

    #[test]
    fn test_cyclic_nodes_rejected() {
        let mut data = compile_source(&LexiconSource::from_json(SOURCE).unwrap()).unwrap();
        // Point the first node's selection at itself
        data.nodes[0].subcat = vec![SelectionRecord { direction: cspar_protocol::Direction::Right, node: NodeId(0) }];
        data.entries[0].readings = vec![vec![NodeId(0)]];

        let err = Lexicon::from_data(&data).unwrap_err();
        assert!(matches!(err, LexiconError::NestingTooDeep(MAX_NESTING)));
    }

    #[test]
    fn test_dangling_node_rejected() {
        let mut data = compile_source(&LexiconSource::from_json(SOURCE).unwrap()).unwrap();
        data.entries[0].readings = vec![vec![NodeId(999)]];
        assert!(matches!(Lexicon::from_data(&data), Err(LexiconError::NodeOutOfRange(NodeId(999)))));
    }
}
