use cspar_lexicon::builtin::builtin_registry;
use cspar_lexicon::{Lexicon, LexiconLookup, LexiconRegistry};
use cspar_parser::tokenize::tokenize;
use cspar_parser::{parse_sentence, Grammar, ParseError, ParseOutcome, PhaseHeads};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
pub struct TokenDebug {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Serialize)]
pub struct FailureDebug {
    pub array: String,
    pub error: String,
}

/// The structured response sent back to JavaScript
#[derive(Serialize, Default)]
pub struct AnalysisReport {
    pub tokens: Vec<TokenDebug>,
    pub parses: Vec<String>,
    pub failures: Vec<FailureDebug>,
    pub error: Option<String>,
    pub debug_info: String,
}

impl AnalysisReport {
    fn new(input: &str, result: Result<ParseOutcome, ParseError>) -> Self {
        let tokens = tokenize(input)
            .into_iter()
            .map(|t| TokenDebug {
                text: t.text,
                start: t.span.start,
                end: t.span.end,
            })
            .collect();

        match result {
            Ok(outcome) => Self {
                tokens,
                parses: outcome.brackets(),
                failures: outcome
                    .failures
                    .iter()
                    .map(|f| FailureDebug {
                        array: f.array.to_string(),
                        error: f.error.to_string(),
                    })
                    .collect(),
                error: None,
                debug_info: format!("Lexical arrays: {}", outcome.arrays),
            },
            Err(e) => Self {
                tokens,
                error: Some(e.to_string()),
                ..Self::default()
            },
        }
    }
}

/// The parser instance running in the browser.
///
/// Starts from the built-in lexica; compiled archives fetched by JS can be
/// added on top. The raw archives are kept so the grammar can be rebuilt.
#[wasm_bindgen]
pub struct CsparEngine {
    archives: Vec<Vec<u8>>,
    phase_heads: PhaseHeads,
    grammar: Grammar,
}

#[wasm_bindgen]
impl CsparEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<CsparEngine, JsValue> {
        let grammar = Grammar::new(builtin_registry().map_err(to_js)?);
        Ok(Self {
            archives: Vec::new(),
            phase_heads: PhaseHeads::default(),
            grammar,
        })
    }

    /// Registers a compiled lexicon archive after the ones already loaded.
    #[wasm_bindgen(js_name = addLexicon)]
    pub fn add_lexicon(&mut self, data: Vec<u8>) -> Result<String, JsValue> {
        let id = Lexicon::from_archive(&data).map_err(to_js)?.id().to_string();
        self.archives.push(data);
        self.rebuild()?;
        Ok(id)
    }

    /// Replaces the categories allowed to switch lexica.
    #[wasm_bindgen(js_name = setPhaseHeads)]
    pub fn set_phase_heads(&mut self, categories: Vec<String>) -> Result<(), JsValue> {
        self.phase_heads = PhaseHeads::new(categories);
        self.rebuild()
    }

    /// Text -> tokens -> lexical arrays -> trees -> JSON
    pub fn analyze(&self, input: &str) -> Result<JsValue, JsValue> {
        let report = AnalysisReport::new(input, parse_sentence(input, &self.grammar));
        serde_wasm_bindgen::to_value(&report).map_err(JsValue::from)
    }

    fn rebuild(&mut self) -> Result<(), JsValue> {
        let mut registry: LexiconRegistry = builtin_registry().map_err(to_js)?;
        for data in &self.archives {
            registry.register(Lexicon::from_archive(data).map_err(to_js)?);
        }
        self.grammar = Grammar::builder(registry)
            .phase_heads(self.phase_heads.clone())
            .build();
        Ok(())
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
