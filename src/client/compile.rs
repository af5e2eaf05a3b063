//! Recognition of compile results returned by the PromptForge API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptVersion {
    Number(Number),
    Text(String),
}

impl fmt::Display for PromptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptVersion::Number(n) => write!(f, "{}", n),
            PromptVersion::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPrompt {
    pub compiled: String,
    #[serde(deserialize_with = "id_text")]
    pub prompt_id: String,
    #[serde(default)]
    pub version: Option<PromptVersion>,
    #[serde(default, deserialize_with = "variables_or_empty")]
    pub variables: Map<String, Value>,
}

/// Prompt ids arrive as strings or numbers; both are kept as text.
fn id_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

fn variables_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where in the result the compiled prompt was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileShape {
    /// Fields directly on the result object.
    TopLevel,
    /// Fields under a `data` member.
    DataEnvelope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileExtraction {
    pub shape: CompileShape,
    pub prompt: CompiledPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized compile result shape")]
pub struct UnrecognizedShape;

/// Tries each known shape in order: top level, then `data`.
pub fn normalize_compile_result(result: &Value) -> Result<CompileExtraction, UnrecognizedShape> {
    let candidates = [
        (CompileShape::TopLevel, Some(result)),
        (CompileShape::DataEnvelope, result.get("data")),
    ];

    for (shape, candidate) in candidates {
        let Some(candidate) = candidate else { continue };
        if let Ok(prompt) = CompiledPrompt::deserialize(candidate) {
            return Ok(CompileExtraction { shape, prompt });
        }
    }

    Err(UnrecognizedShape)
}

/// How the compiled text is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompiledViewMode {
    /// Rendered as formatted markup.
    #[default]
    Rendered,
    /// Verbatim preformatted text.
    Raw,
}

impl CompiledViewMode {
    pub fn toggled(self) -> Self {
        match self {
            CompiledViewMode::Rendered => CompiledViewMode::Raw,
            CompiledViewMode::Raw => CompiledViewMode::Rendered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_shape() {
        let result = json!({
            "compiled": "Write about rust",
            "promptId": "p1",
            "version": 3,
            "variables": {"topic": "rust"}
        });
        let extraction = normalize_compile_result(&result).unwrap();
        assert_eq!(extraction.shape, CompileShape::TopLevel);
        assert_eq!(extraction.prompt.prompt_id, "p1");
        assert_eq!(extraction.prompt.version, Some(PromptVersion::Number(Number::from(3))));
        assert_eq!(extraction.prompt.variables["topic"], "rust");
    }

    #[test]
    fn test_data_envelope_shape() {
        let result = json!({
            "success": true,
            "data": {
                "compiled": "Hello",
                "promptId": "p2",
                "version": "v1.2",
                "variables": {}
            }
        });
        let extraction = normalize_compile_result(&result).unwrap();
        assert_eq!(extraction.shape, CompileShape::DataEnvelope);
        assert_eq!(extraction.prompt.compiled, "Hello");
        assert_eq!(extraction.prompt.version.unwrap().to_string(), "v1.2");
    }

    #[test]
    fn test_numeric_prompt_id_kept_as_text() {
        let result = json!({"compiled": "Hi", "promptId": 42, "version": 1});
        let extraction = normalize_compile_result(&result).unwrap();
        assert_eq!(extraction.prompt.prompt_id, "42");
    }

    #[test]
    fn test_fractional_version() {
        let result = json!({"compiled": "Hi", "promptId": "p1", "version": 1.5});
        let extraction = normalize_compile_result(&result).unwrap();
        assert_eq!(extraction.prompt.version.unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_null_variables_treated_as_empty() {
        let result = json!({"compiled": "Hi", "promptId": "p1", "variables": null});
        let extraction = normalize_compile_result(&result).unwrap();
        assert!(extraction.prompt.variables.is_empty());
        assert_eq!(extraction.prompt.version, None);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            normalize_compile_result(&json!({"error": "not found"})),
            Err(UnrecognizedShape)
        );
        assert_eq!(normalize_compile_result(&json!("plain text")), Err(UnrecognizedShape));
        assert_eq!(
            normalize_compile_result(&json!({"data": {"compiled": 1}})),
            Err(UnrecognizedShape)
        );
    }

    #[test]
    fn test_view_mode_toggle() {
        let mode = CompiledViewMode::default();
        assert_eq!(mode, CompiledViewMode::Rendered);
        assert_eq!(mode.toggled(), CompiledViewMode::Raw);
        assert_eq!(mode.toggled().toggled(), CompiledViewMode::Rendered);
    }
}
