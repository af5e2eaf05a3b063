//! Static catalog of the PromptForge API endpoints offered by the UI.

use crate::proxy::ForwardMethod;

/// Token in a path template replaced by the resource id.
pub const ID_PLACEHOLDER: &str = ":id";

pub const COMPILE_ENDPOINT_ID: &str = "compile-prompt";
pub const PARAMETERS_ENDPOINT_ID: &str = "prompt-parameters";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub id: &'static str,
    pub label: &'static str,
    pub method: ForwardMethod,
    pub path: &'static str,
    pub description: &'static str,
    pub requires_id: bool,
    pub requires_body: bool,
    pub default_body: Option<&'static str>,
}

impl Endpoint {
    /// The compile endpoint gets structured result rendering and a
    /// parameter-driven body form.
    pub fn is_compile(&self) -> bool {
        self.id == COMPILE_ENDPOINT_ID
    }
}

pub static ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        id: "list-prompts",
        label: "List prompts",
        method: ForwardMethod::Get,
        path: "/api/v1/prompts",
        description: "List every prompt visible to the API key",
        requires_id: false,
        requires_body: false,
        default_body: None,
    },
    Endpoint {
        id: "get-prompt",
        label: "Get prompt",
        method: ForwardMethod::Get,
        path: "/api/v1/prompts/:id",
        description: "Fetch a single prompt with its latest version",
        requires_id: true,
        requires_body: false,
        default_body: None,
    },
    Endpoint {
        id: "create-prompt",
        label: "Create prompt",
        method: ForwardMethod::Post,
        path: "/api/v1/prompts",
        description: "Create a new prompt",
        requires_id: false,
        requires_body: true,
        default_body: Some(
            "{\n  \"name\": \"my-prompt\",\n  \"content\": \"Write a short poem about {{topic}}.\"\n}",
        ),
    },
    Endpoint {
        id: "update-prompt",
        label: "Update prompt",
        method: ForwardMethod::Put,
        path: "/api/v1/prompts/:id",
        description: "Publish a new version of a prompt",
        requires_id: true,
        requires_body: true,
        default_body: Some("{\n  \"content\": \"Write a haiku about {{topic}}.\"\n}"),
    },
    Endpoint {
        id: "delete-prompt",
        label: "Delete prompt",
        method: ForwardMethod::Delete,
        path: "/api/v1/prompts/:id",
        description: "Delete a prompt and all of its versions",
        requires_id: true,
        requires_body: false,
        default_body: None,
    },
    Endpoint {
        id: COMPILE_ENDPOINT_ID,
        label: "Compile prompt",
        method: ForwardMethod::Post,
        path: "/api/v1/prompts/:id/compile",
        description: "Render a prompt with the given variables",
        requires_id: true,
        requires_body: true,
        default_body: Some("{\n  \"variables\": {}\n}"),
    },
    Endpoint {
        id: PARAMETERS_ENDPOINT_ID,
        label: "Prompt parameters",
        method: ForwardMethod::Get,
        path: "/api/v1/prompts/:id/parameters",
        description: "List the variables a prompt declares",
        requires_id: true,
        requires_body: false,
        default_body: None,
    },
];

pub fn find(id: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|e| e.id == id)
}

pub fn default_endpoint() -> &'static Endpoint {
    &ENDPOINTS[0]
}

pub fn parameters_endpoint() -> &'static Endpoint {
    ENDPOINTS
        .iter()
        .find(|e| e.id == PARAMETERS_ENDPOINT_ID)
        .unwrap_or(&ENDPOINTS[0])
}
