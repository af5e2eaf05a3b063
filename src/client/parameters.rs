//! Prompt parameters and the variable form built from them.

use crate::proxy::ForwardResponse;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParameter {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
}

/// A parameter is either a bare name or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<ParameterSpec> for PromptParameter {
    fn from(spec: ParameterSpec) -> Self {
        match spec {
            ParameterSpec::Name(name) => PromptParameter {
                name,
                required: false,
                description: None,
            },
            ParameterSpec::Detailed {
                name,
                required,
                description,
            } => PromptParameter {
                name,
                required,
                description,
            },
        }
    }
}

#[derive(Deserialize)]
struct ParametersBody {
    parameters: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Failed to load parameters: {0}")]
    Request(String),

    #[error("Failed to load parameters: {status} {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected parameters response")]
    UnrecognizedShape,
}

/// Reads the parameter list from `{parameters}` or `{data: {parameters}}`.
pub fn parse_parameters(result: &Value) -> Result<Vec<PromptParameter>, ParameterError> {
    for candidate in [Some(result), result.get("data")].into_iter().flatten() {
        if let Ok(body) = ParametersBody::deserialize(candidate) {
            return Ok(body.parameters.into_iter().map(Into::into).collect());
        }
    }
    Err(ParameterError::UnrecognizedShape)
}

/// Interprets a forward envelope from the `/parameters` endpoint.
pub fn parameters_from_response(
    response: &ForwardResponse,
) -> Result<Vec<PromptParameter>, ParameterError> {
    if let (Some(error), None) = (&response.error, &response.result) {
        return Err(ParameterError::Request(error.clone()));
    }
    if !response.is_success_status() {
        let message = response
            .result
            .as_ref()
            .and_then(|r| r.get("error").or_else(|| r.get("message")))
            .and_then(Value::as_str)
            .unwrap_or(&response.meta.status_text)
            .to_string();
        return Err(ParameterError::Status {
            status: response.meta.status,
            message,
        });
    }
    match &response.result {
        Some(result) => parse_parameters(result),
        None => Err(ParameterError::UnrecognizedShape),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableField {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
    pub value: String,
}

/// One text field per declared variable, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableForm {
    fields: Vec<VariableField>,
}

impl VariableForm {
    /// Builds a form with every field empty.
    pub fn from_parameters(parameters: Vec<PromptParameter>) -> Self {
        let fields = parameters
            .into_iter()
            .map(|p| VariableField {
                name: p.name,
                required: p.required,
                description: p.description,
                value: String::new(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[VariableField] {
        &self.fields
    }

    /// Sets a field's value. Returns false for an unknown name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Names of required fields that are still empty.
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.value.trim().is_empty())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// `{"variables": {...}}` with only the non-empty fields, pretty-printed.
    pub fn body(&self) -> String {
        let variables: Map<String, Value> = self
            .fields
            .iter()
            .filter(|f| !f.value.trim().is_empty())
            .map(|f| (f.name.clone(), Value::String(f.value.clone())))
            .collect();
        let body = json!({ "variables": variables });
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
    }
}
