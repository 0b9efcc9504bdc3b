//! OpenAPI 3.0 documents for agent tool definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::playbook::ParameterType;
use crate::errors::DomainError;

pub const OPENAPI_VERSION: &str = "3.0.3";

const SUPPORTED_METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    pub name: String,
    pub param_type: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parameters: Vec<QueryParameter>,
    #[serde(default)]
    pub has_request_body: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpecConfig {
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub server_url: String,
    pub endpoints: Vec<EndpointSpec>,
}

impl EndpointSpec {
    /// Parses `METHOD /path[:summary]`, e.g. `GET /orders/{id}:Fetch an order`.
    pub fn parse_shorthand(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();
        let (method, rest) = input.split_once(char::is_whitespace).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "endpoint `{input}` must look like `METHOD /path[:summary]`"
            ))
        })?;
        let rest = rest.trim();
        let (path, summary) = match rest.split_once(':') {
            Some((path, summary)) => (path.trim(), summary.trim()),
            None => (rest, ""),
        };

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            summary: summary.to_string(),
            parameters: Vec::new(),
            has_request_body: false,
        })
    }
}

pub fn generate_openapi(config: &ApiSpecConfig) -> Result<Value, DomainError> {
    if config.title.trim().is_empty() {
        return Err(DomainError::MissingField { field: "api title" });
    }
    if config.endpoints.is_empty() {
        return Err(DomainError::InvariantViolation(
            "at least one endpoint is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut paths = Map::new();
    for endpoint in &config.endpoints {
        let method = endpoint.method.trim().to_ascii_lowercase();
        if !SUPPORTED_METHODS.contains(&method.as_str()) {
            return Err(DomainError::UnknownValue {
                kind: "http method",
                value: endpoint.method.clone(),
            });
        }
        let path = endpoint.path.trim();
        if !path.starts_with('/') {
            return Err(DomainError::InvariantViolation(format!(
                "endpoint path `{path}` must start with `/`"
            )));
        }
        if !seen.insert((method.clone(), path.to_string())) {
            return Err(DomainError::InvariantViolation(format!(
                "duplicate endpoint {} {path}",
                method.to_ascii_uppercase()
            )));
        }

        let item = paths.entry(path.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(operations) = item {
            operations.insert(method.clone(), operation(endpoint, &method, path));
        }
    }

    let mut info = Map::new();
    info.insert("title".to_string(), json!(config.title.trim()));
    info.insert("version".to_string(), json!(config.version.trim()));
    if !config.description.trim().is_empty() {
        info.insert("description".to_string(), json!(config.description.trim()));
    }

    Ok(json!({
        "openapi": OPENAPI_VERSION,
        "info": info,
        "servers": [{ "url": config.server_url.trim() }],
        "paths": paths,
    }))
}

fn operation(endpoint: &EndpointSpec, method: &str, path: &str) -> Value {
    let mut parameters: Vec<Value> = path_parameters(path)
        .into_iter()
        .map(|name| {
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": { "type": "string" },
            })
        })
        .collect();
    parameters.extend(endpoint.parameters.iter().map(|parameter| {
        json!({
            "name": parameter.name,
            "in": "query",
            "required": parameter.required,
            "description": parameter.description,
            "schema": { "type": schema_type(parameter.param_type) },
        })
    }));

    let summary = if endpoint.summary.trim().is_empty() {
        format!("{} {path}", method.to_ascii_uppercase())
    } else {
        endpoint.summary.trim().to_string()
    };

    let mut operation = Map::new();
    operation.insert("operationId".to_string(), json!(operation_id(method, path)));
    operation.insert("summary".to_string(), json!(summary));
    if !parameters.is_empty() {
        operation.insert("parameters".to_string(), Value::Array(parameters));
    }
    if endpoint.has_request_body {
        operation.insert(
            "requestBody".to_string(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": { "type": "object" } } },
            }),
        );
    }
    operation.insert(
        "responses".to_string(),
        json!({
            "200": {
                "description": "Successful response",
                "content": { "application/json": { "schema": { "type": "object" } } },
            }
        }),
    );
    Value::Object(operation)
}

fn path_parameters(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')))
        .filter(|name| !name.is_empty())
        .collect()
}

fn operation_id(method: &str, path: &str) -> String {
    let mut id = method.to_string();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let cleaned: String =
            segment.chars().filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_').collect();
        let mut chars = cleaned.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.push_str(chars.as_str());
        }
    }
    id
}

fn schema_type(param_type: ParameterType) -> &'static str {
    match param_type {
        ParameterType::String => "string",
        ParameterType::Number => "number",
        ParameterType::Boolean => "boolean",
        ParameterType::Object => "object",
        ParameterType::Array => "array",
    }
}
