use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{new_id, FilterChain, FilterStep};

pub const CHAIN_EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum ChainImportError {
    #[error("{file_name} is not a JSON file")]
    NotJson { file_name: String },
    #[error("failed to parse chain file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid chain file: {0}")]
    InvalidStructure(String),
}

pub type ChainImportResult<T> = std::result::Result<T, ChainImportError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExport {
    pub version: String,
    #[serde(default)]
    pub exported_at: i64,
    pub chain: FilterChain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

pub fn export_chain(
    chain: &FilterChain,
    now_millis: i64,
    metadata: Option<ExportMetadata>,
) -> serde_json::Result<String> {
    let document = ChainExport {
        version: CHAIN_EXPORT_VERSION.to_string(),
        exported_at: now_millis,
        chain: chain.clone(),
        metadata,
    };
    serde_json::to_string_pretty(&document)
}

fn invalid(message: impl Into<String>) -> ChainImportError {
    ChainImportError::InvalidStructure(message.into())
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn validate_document(document: &Value) -> ChainImportResult<()> {
    let root = document
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object"))?;
    if !root.contains_key("version") {
        return Err(invalid("missing `version`"));
    }
    let chain = root
        .get("chain")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("missing `chain` object"))?;
    if !chain.get("name").is_some_and(Value::is_string) {
        return Err(invalid("`chain.name` must be a string"));
    }
    let items = chain
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("`chain.items` must be an array"))?;

    for (index, item) in items.iter().enumerate() {
        let item = item
            .as_object()
            .ok_or_else(|| invalid(format!("item {index} is not an object")))?;
        if non_empty_str(item, "id").is_none() {
            return Err(invalid(format!("item {index} has no `id`")));
        }
        if non_empty_str(item, "filterType").is_none() {
            return Err(invalid(format!("item {index} has no `filterType`")));
        }
        if !item.get("params").is_some_and(Value::is_object) {
            return Err(invalid(format!("item {index} has no `params` object")));
        }
        if !item.get("enabled").is_some_and(Value::is_boolean) {
            return Err(invalid(format!("item {index} has no boolean `enabled`")));
        }
    }
    Ok(())
}

/// Parses and validates an exported chain document without touching ids.
///
/// Only the validated fields must be well-typed. `id`, the timestamps and the
/// metadata are read best-effort and fall back to defaults, since an import
/// regenerates the chain identity anyway.
pub fn parse_chain_export(contents: &str) -> ChainImportResult<ChainExport> {
    let document: Value = serde_json::from_str(contents).map_err(ChainImportError::Parse)?;
    validate_document(&document)?;

    let chain = &document["chain"];
    let items = serde_json::from_value::<Vec<FilterStep>>(chain["items"].clone())
        .map_err(|err| invalid(format!("`chain.items`: {err}")))?;
    let version = match &document["version"] {
        Value::String(version) => version.clone(),
        other => other.to_string(),
    };

    Ok(ChainExport {
        version,
        exported_at: document["exportedAt"].as_i64().unwrap_or_default(),
        chain: FilterChain {
            id: chain["id"].as_str().unwrap_or_default().to_string(),
            name: chain["name"].as_str().unwrap_or_default().to_string(),
            items,
            created_at: chain["createdAt"].as_i64().unwrap_or_default(),
            modified_at: chain["modifiedAt"].as_i64().unwrap_or_default(),
        },
        metadata: document
            .get("metadata")
            .and_then(|metadata| serde_json::from_value(metadata.clone()).ok()),
    })
}

/// Imports a chain document, regenerating its id and timestamps.
pub fn import_chain(contents: &str, now_millis: i64) -> ChainImportResult<FilterChain> {
    let mut chain = parse_chain_export(contents)?.chain;
    chain.id = new_id();
    chain.created_at = now_millis;
    chain.modified_at = now_millis;
    Ok(chain)
}

/// Like [`import_chain`], but first rejects files that are not `.json`.
pub fn import_chain_file(
    file_name: &str,
    contents: &str,
    now_millis: i64,
) -> ChainImportResult<FilterChain> {
    let is_json = std::path::Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(ChainImportError::NotJson {
            file_name: file_name.to_string(),
        });
    }
    import_chain(contents, now_millis)
}
