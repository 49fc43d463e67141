//! Ordered filter chains, treated opaquely: steps are sequenced for preview
//! but never executed here.

mod export;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use export::{
    export_chain, import_chain, import_chain_file, parse_chain_export, ChainExport,
    ChainImportError, ChainImportResult, ExportMetadata, CHAIN_EXPORT_VERSION,
};

/// Filter parameter: either a number or a string, as in the export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(serde_json::Number),
    Text(String),
}

impl ParamValue {
    pub fn number(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self::Number)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub type FilterParams = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStep {
    pub id: String,
    pub filter_type: String,
    pub params: FilterParams,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChain {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub items: Vec<FilterStep>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub modified_at: i64,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn current_epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

impl FilterChain {
    pub fn new(name: impl Into<String>, now_millis: i64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            items: Vec::new(),
            created_at: now_millis,
            modified_at: now_millis,
        }
    }

    pub fn touch(&mut self, now_millis: i64) {
        self.modified_at = now_millis;
    }

    pub fn step(&self, step_id: &str) -> Option<&FilterStep> {
        self.items.iter().find(|step| step.id == step_id)
    }

    fn position(&self, step_id: &str) -> Option<usize> {
        self.items.iter().position(|step| step.id == step_id)
    }

    /// Appends an enabled step and returns its id.
    pub fn add_step(&mut self, filter_type: impl Into<String>, params: FilterParams) -> String {
        let step = FilterStep {
            id: new_id(),
            filter_type: filter_type.into(),
            params,
            enabled: true,
        };
        let id = step.id.clone();
        self.items.push(step);
        id
    }

    pub fn remove_step(&mut self, step_id: &str) -> Option<FilterStep> {
        let index = self.position(step_id)?;
        Some(self.items.remove(index))
    }

    /// Moves a step to `new_index`, clamped to the end of the chain.
    pub fn move_step(&mut self, step_id: &str, new_index: usize) -> bool {
        let Some(index) = self.position(step_id) else {
            return false;
        };
        let step = self.items.remove(index);
        let target = new_index.min(self.items.len());
        self.items.insert(target, step);
        true
    }

    pub fn set_enabled(&mut self, step_id: &str, enabled: bool) -> bool {
        match self.items.iter_mut().find(|step| step.id == step_id) {
            Some(step) => {
                step.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_param(&mut self, step_id: &str, key: impl Into<String>, value: ParamValue) -> bool {
        match self.items.iter_mut().find(|step| step.id == step_id) {
            Some(step) => {
                step.params.insert(key.into(), value);
                true
            }
            None => false,
        }
    }

    pub fn enabled_steps(&self) -> impl Iterator<Item = &FilterStep> + '_ {
        self.items.iter().filter(|step| step.enabled)
    }

    /// Enabled steps up to and including `step_id`, in chain order, for a
    /// live preview of that step. Empty when the id is unknown.
    pub fn preview_steps(&self, step_id: &str) -> Vec<&FilterStep> {
        let Some(index) = self.position(step_id) else {
            return Vec::new();
        };
        self.items[..=index]
            .iter()
            .filter(|step| step.enabled)
            .collect()
    }
}

/// Saved chains available to the user.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    chains: Vec<FilterChain>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chains(&self) -> &[FilterChain] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn get(&self, chain_id: &str) -> Option<&FilterChain> {
        self.chains.iter().find(|chain| chain.id == chain_id)
    }

    pub fn add(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    pub fn remove(&mut self, chain_id: &str) -> Option<FilterChain> {
        let index = self.chains.iter().position(|chain| chain.id == chain_id)?;
        Some(self.chains.remove(index))
    }

    /// Imports a chain file. On any failure the library is left untouched.
    pub fn import_file(
        &mut self,
        file_name: &str,
        contents: &str,
        now_millis: i64,
    ) -> ChainImportResult<&FilterChain> {
        let chain = import_chain_file(file_name, contents, now_millis).inspect_err(|err| {
            tracing::warn!(file_name, %err, "chain import rejected");
        })?;
        tracing::info!(file_name, chain = %chain.name, steps = chain.items.len(), "chain imported");
        let index = self.chains.len();
        self.chains.push(chain);
        Ok(&self.chains[index])
    }

    pub fn export(
        &self,
        chain_id: &str,
        now_millis: i64,
        metadata: Option<ExportMetadata>,
    ) -> Option<serde_json::Result<String>> {
        self.get(chain_id)
            .map(|chain| export_chain(chain, now_millis, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, ParamValue)]) -> FilterParams {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    fn sample_chain() -> (FilterChain, [String; 3]) {
        let mut chain = FilterChain::new("sharpen set", 1_000);
        let gray = chain.add_step("grayscale", FilterParams::new());
        let blur = chain.add_step("gaussianBlur", params(&[("radius", ParamValue::from(3))]));
        let edge = chain.add_step("sobel", params(&[("direction", ParamValue::from("both"))]));
        (chain, [gray, blur, edge])
    }

    #[test]
    fn new_chain_has_fresh_id_and_timestamps() {
        let chain = FilterChain::new("a", 42);
        let other = FilterChain::new("a", 42);
        assert_ne!(chain.id, other.id);
        assert_eq!(chain.created_at, 42);
        assert_eq!(chain.modified_at, 42);
        assert!(chain.items.is_empty());
    }

    #[test]
    fn preview_steps_skip_disabled_and_stop_at_target() {
        let (mut chain, [gray, blur, edge]) = sample_chain();
        assert!(chain.set_enabled(&gray, false));

        let preview = chain.preview_steps(&blur);
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].filter_type, "gaussianBlur");

        assert_eq!(chain.preview_steps(&edge).len(), 2);
        assert!(chain.preview_steps("missing").is_empty());
        assert_eq!(chain.enabled_steps().count(), 2);
    }

    #[test]
    fn move_step_reorders_and_clamps_index() {
        let (mut chain, [gray, _, edge]) = sample_chain();
        assert!(chain.move_step(&edge, 0));
        assert_eq!(chain.items[0].id, edge);
        assert!(chain.move_step(&edge, 99));
        assert_eq!(chain.items[2].id, edge);
        assert_eq!(chain.items[0].id, gray);
        assert!(!chain.move_step("missing", 0));
    }

    #[test]
    fn remove_and_set_param_target_single_step() {
        let (mut chain, [_, blur, _]) = sample_chain();
        assert!(chain.set_param(&blur, "radius", ParamValue::from(5)));
        assert_eq!(
            chain.step(&blur).and_then(|step| step.params["radius"].as_f64()),
            Some(5.0)
        );
        let removed = chain.remove_step(&blur).expect("step removed");
        assert_eq!(removed.filter_type, "gaussianBlur");
        assert_eq!(chain.items.len(), 2);
        assert!(chain.remove_step(&blur).is_none());
    }

    #[test]
    fn library_rejects_bad_import_without_mutation() {
        let mut library = PresetLibrary::new();
        let (chain, _) = sample_chain();
        library.add(chain);

        let err = library
            .import_file(
                "broken.json",
                r#"{"version":"1.0.0","chain":{"name":"x"}}"#,
                5,
            )
            .expect_err("missing items should fail");
        assert!(matches!(err, ChainImportError::InvalidStructure(_)));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn library_export_then_import_keeps_items() {
        let mut library = PresetLibrary::new();
        let (chain, _) = sample_chain();
        let original_id = chain.id.clone();
        let original_items = chain.items.clone();
        library.add(chain);

        let text = library
            .export(&original_id, 2_000, None)
            .expect("chain exists")
            .expect("serializes");
        let imported = library
            .import_file("chain.json", &text, 3_000)
            .expect("import succeeds");

        assert_ne!(imported.id, original_id);
        assert_eq!(imported.created_at, 3_000);
        assert_eq!(imported.modified_at, 3_000);
        assert_eq!(imported.items, original_items);
        let imported_id = imported.id.clone();
        assert_eq!(library.len(), 2);
        assert_eq!(library.chains()[1].id, imported_id);
        assert_eq!(library.chains()[0].id, original_id);
    }
}
