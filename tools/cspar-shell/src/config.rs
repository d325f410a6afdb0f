use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use cspar_lexicon::builtin::builtin_registry;
use cspar_lexicon::{Lexicon, LexiconRegistry};
use cspar_parser::{Grammar, ParseBudget, PhaseHeads};
use serde::Deserialize;

#[derive(Args, Debug, Default)]
pub struct Options {
    /// JSON settings file; flags given on the command line win
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra lexicon: a JSON source or a compiled archive (repeatable)
    #[arg(short, long = "lexicon", value_name = "FILE")]
    pub lexica: Vec<PathBuf>,

    /// Do not load the built-in English and Mandarin lexica
    #[arg(long)]
    pub no_builtin: bool,

    /// Category allowed to switch lexica (repeatable; default: v, c)
    #[arg(long = "phase-head", value_name = "CAT")]
    pub phase_heads: Vec<String>,

    /// Merge-parser steps allowed per lexical array
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Cap on candidate lexical arrays per input
    #[arg(long)]
    pub max_arrays: Option<usize>,

    /// Print a JSON report instead of brackets
    #[arg(long)]
    pub json: bool,

    /// Also print the full structure of every tree
    #[arg(long)]
    pub debug: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Shape of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub lexica: Vec<PathBuf>,
    pub builtin: Option<bool>,
    pub phase_heads: Option<Vec<String>>,
    pub max_steps: Option<usize>,
    pub max_arrays: Option<usize>,
    pub json: bool,
    pub debug: bool,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Effective settings after merging the config file and the flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub lexica: Vec<PathBuf>,
    pub builtin: bool,
    pub phase_heads: PhaseHeads,
    pub budget: ParseBudget,
    pub json: bool,
    pub debug: bool,
}

impl Settings {
    pub fn resolve(options: &Options) -> anyhow::Result<Self> {
        let file = match &options.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Ok(Self::merge(file, options))
    }

    fn merge(file: ConfigFile, options: &Options) -> Self {
        let defaults = ParseBudget::default();

        let phase_heads = if !options.phase_heads.is_empty() {
            PhaseHeads::new(options.phase_heads.iter().cloned())
        } else {
            file.phase_heads.map(PhaseHeads::new).unwrap_or_default()
        };

        let mut lexica = file.lexica;
        lexica.extend(options.lexica.iter().cloned());

        Self {
            lexica,
            builtin: !options.no_builtin && file.builtin.unwrap_or(true),
            phase_heads,
            budget: ParseBudget {
                max_steps: options.max_steps.or(file.max_steps).unwrap_or(defaults.max_steps),
                max_lexical_arrays: options.max_arrays.or(file.max_arrays).unwrap_or(defaults.max_lexical_arrays),
            },
            json: options.json || file.json,
            debug: options.debug || file.debug,
        }
    }

    /// Loads every lexicon from scratch.
    pub fn grammar(&self) -> anyhow::Result<Grammar> {
        let mut registry = if self.builtin {
            builtin_registry()?
        } else {
            LexiconRegistry::new()
        };

        for path in &self.lexica {
            registry.register(load_lexicon(path)?);
        }
        if registry.is_empty() {
            tracing::warn!("no lexica loaded; every input will be out of vocabulary");
        }

        Ok(Grammar::builder(registry)
            .phase_heads(self.phase_heads.clone())
            .budget(self.budget)
            .build())
    }
}

/// `.json` files are sources; anything else is taken as a compiled archive.
fn load_lexicon(path: &Path) -> anyhow::Result<Lexicon> {
    let lexicon = if path.extension().is_some_and(|ext| ext == "json") {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Lexicon::from_json(&text)
    } else {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Lexicon::from_archive(&bytes)
    };
    lexicon.with_context(|| format!("loading lexicon {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::merge(ConfigFile::default(), &Options::default());
        assert!(settings.builtin);
        assert_eq!(settings.phase_heads, PhaseHeads::default());
        assert_eq!(settings.budget, ParseBudget::default());
        assert!(settings.lexica.is_empty());
    }

    #[test]
    fn test_flags_override_file() {
        let file: ConfigFile = serde_json::from_str(
            r#"{ "phase_heads": ["v"], "max_steps": 50, "builtin": true, "lexica": ["a.json"] }"#,
        )
        .unwrap();
        let options = Options {
            phase_heads: vec!["T".to_string()],
            no_builtin: true,
            lexica: vec![PathBuf::from("b.rkyv")],
            ..Options::default()
        };
        let settings = Settings::merge(file, &options);

        assert_eq!(settings.phase_heads, PhaseHeads::new(["T"]));
        assert_eq!(settings.budget.max_steps, 50);
        assert!(!settings.builtin);
        assert_eq!(settings.lexica, vec![PathBuf::from("a.json"), PathBuf::from("b.rkyv")]);
    }

    #[test]
    fn test_unknown_config_keys_rejected() {
        assert!(serde_json::from_str::<ConfigFile>(r#"{ "phaseheads": ["v"] }"#).is_err());
    }

    #[test]
    fn test_builtin_grammar_loads() {
        let settings = Settings::merge(ConfigFile::default(), &Options::default());
        let grammar = settings.grammar().unwrap();
        assert_eq!(grammar.registry().ids().collect::<Vec<_>>(), vec!["SgE", "Mandarin"]);
    }
}
