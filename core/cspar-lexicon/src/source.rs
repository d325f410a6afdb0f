//! JSON lexicon sources.
//!
//! A source maps each surface span to its base readings. A reading is a single
//! object template or a short array of them:
//!
//! ```json
//! {
//!   "id": "SgE",
//!   "entries": {
//!     "the": [{ "category": "D", "label": "the",
//!               "subcat": [{ "direction": "right", "object": { "category": "N" } }] }]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use cspar_protocol::{Direction, Features, Selection, SyntacticObject};
use serde::{Deserialize, Serialize};

use crate::error::LexiconError;
use crate::rules::PatternRule;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcat: Vec<SelectionTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate: Vec<SelectionTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionTemplate {
    pub direction: Direction,
    pub object: ObjectTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingTemplate {
    Single(ObjectTemplate),
    Sequence(Vec<ObjectTemplate>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleTemplate {
    pub name: String,
    pub pattern: ObjectTemplate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcat: Vec<SelectionTemplate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate: Vec<SelectionTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconSource {
    pub id: String,
    #[serde(default)]
    pub rules: Vec<RuleTemplate>,
    pub entries: BTreeMap<String, Vec<ReadingTemplate>>,
}

impl LexiconSource {
    pub fn from_json(text: &str) -> Result<Self, LexiconError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ObjectTemplate {
    pub fn to_object(&self) -> Result<SyntacticObject, LexiconError> {
        let mut object = SyntacticObject::any();
        object.category = self.category.clone().into();
        object.label = self.label.clone().into();
        object.features = parse_features(&self.features)?;
        object.subcat = to_selections(&self.subcat)?;
        object.generate = to_selections(&self.generate)?;
        Ok(object)
    }
}

impl ReadingTemplate {
    pub fn objects(&self) -> &[ObjectTemplate] {
        match self {
            ReadingTemplate::Single(object) => std::slice::from_ref(object),
            ReadingTemplate::Sequence(objects) => objects,
        }
    }
}

impl RuleTemplate {
    pub fn to_rule(&self) -> Result<PatternRule, LexiconError> {
        Ok(PatternRule {
            name: self.name.clone(),
            pattern: self.pattern.to_object()?,
            subcat: to_selections(&self.subcat)?,
            generate: to_selections(&self.generate)?,
        })
    }
}

pub(crate) fn parse_features(names: &[String]) -> Result<Features, LexiconError> {
    names.iter().try_fold(Features::empty(), |acc, name| {
        Features::from_marker(name)
            .map(|f| acc | f)
            .ok_or_else(|| LexiconError::UnknownFeature(name.clone()))
    })
}

fn to_selections(templates: &[SelectionTemplate]) -> Result<Vec<Selection>, LexiconError> {
    templates
        .iter()
        .map(|t| Ok(Selection::new(t.direction, t.object.to_object()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cspar_protocol::Constraint;

    #[test]
    fn test_single_and_sequence_readings() {
        let source = LexiconSource::from_json(
            r#"{
                "id": "Test",
                "entries": {
                    "the": [{ "category": "D", "label": "the",
                              "subcat": [{ "direction": "right", "object": { "category": "N" } }] }],
                    "gonna": [[{ "category": "T", "label": "gon" }, { "category": "V", "label": "na" }]]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(source.entries["the"][0].objects().len(), 1);
        assert_eq!(source.entries["gonna"][0].objects().len(), 2);

        let the = source.entries["the"][0].objects()[0].to_object().unwrap();
        assert_eq!(the.category, Constraint::from("D"));
        assert_eq!(the.subcat[0].direction, Direction::Right);
        assert!(the.subcat[0].object.label.is_any());
    }

    #[test]
    fn test_template_fills_every_slot() {
        let template = ObjectTemplate {
            category: Some("T".to_string()),
            label: Some("-s".to_string()),
            features: vec!["present".to_string()],
            subcat: vec![SelectionTemplate {
                direction: Direction::Right,
                object: ObjectTemplate { category: Some("V".to_string()), ..ObjectTemplate::default() },
            }],
            generate: vec![SelectionTemplate { direction: Direction::Left, object: ObjectTemplate::default() }],
        };
        let object = template.to_object().unwrap();

        assert_eq!(object.to_brackets(), "[T -s]");
        assert_eq!(object.features, Features::PRESENT);
        assert_eq!(object.subcat[0].object.category, Constraint::from("V"));
        assert_eq!(object.generate[0].direction, Direction::Left);
        assert!(object.generate[0].object.category.is_any());
        assert!(object.is_leaf());
    }

    #[test]
    fn test_features_are_validated() {
        let template = ObjectTemplate {
            category: Some("V".to_string()),
            features: vec!["inf".to_string(), "bogus".to_string()],
            ..ObjectTemplate::default()
        };
        let err = template.to_object().unwrap_err();
        assert!(matches!(err, LexiconError::UnknownFeature(name) if name == "bogus"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = LexiconSource::from_json(r#"{ "id": "X", "entries": {}, "phase": 1 }"#).unwrap_err();
        assert!(matches!(err, LexiconError::Json(_)));
    }
}
