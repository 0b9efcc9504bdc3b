//! Fulfillment webhook skeletons rendered from Tera templates.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;

use crate::errors::{ApplicationError, DomainError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookLanguage {
    Node,
    Python,
}

impl WebhookLanguage {
    fn template_name(&self) -> &'static str {
        match self {
            Self::Node => "webhook.js",
            Self::Python => "webhook.py",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Node => "js",
            Self::Python => "py",
        }
    }
}

impl fmt::Display for WebhookLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Python => f.write_str("python"),
        }
    }
}

impl FromStr for WebhookLanguage {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "node" | "nodejs" | "javascript" | "js" => Ok(Self::Node),
            "python" | "py" => Ok(Self::Python),
            other => {
                Err(DomainError::UnknownValue { kind: "webhook language", value: other.to_string() })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub name: String,
    pub language: WebhookLanguage,
    #[serde(default)]
    pub intents: Vec<String>,
    #[serde(default)]
    pub include_auth: bool,
    #[serde(default)]
    pub include_logging: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub file_name: String,
    pub language: WebhookLanguage,
    pub source: String,
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

impl From<CodegenError> for ApplicationError {
    fn from(value: CodegenError) -> Self {
        match value {
            CodegenError::Domain(error) => Self::Domain(error),
            CodegenError::Template(error) => Self::Rendering(error.to_string()),
        }
    }
}

const NODE_TEMPLATE: &str = r#"// {{ name }} fulfillment webhook
const express = require('express');
{% if include_logging %}const morgan = require('morgan');
{% endif %}
const app = express();
app.use(express.json());
{% if include_logging %}app.use(morgan('combined'));
{% endif %}{% if include_auth %}
function authenticate(req, res, next) {
  const expected = `Bearer ${process.env.WEBHOOK_TOKEN}`;
  if (req.headers['authorization'] !== expected) {
    return res.status(401).json({ error: 'unauthorized' });
  }
  next();
}
{% endif %}{% for intent in intents %}
function handle{{ intent | pascal_case }}(parameters) {
  return { fulfillmentText: 'Handled {{ intent }}' };
}
{% endfor %}
const handlers = {
{% for intent in intents %}  '{{ intent }}': handle{{ intent | pascal_case }},
{% endfor %}};

app.post('/webhook', {% if include_auth %}authenticate, {% endif %}(req, res) => {
  const intentName = req.body.queryResult.intent.displayName;
  const handler = handlers[intentName];
  if (!handler) {
    return res.json({ fulfillmentText: 'Sorry, I did not understand that.' });
  }
  return res.json(handler(req.body.queryResult.parameters));
});

app.listen(process.env.PORT || 3000);
"#;

const PYTHON_TEMPLATE: &str = r#"# {{ name }} fulfillment webhook
import os
{% if include_logging %}import logging
{% endif %}
from flask import Flask, jsonify, request

app = Flask(__name__)
{% if include_logging %}logging.basicConfig(level=logging.INFO)
logger = logging.getLogger("{{ name | snake_case }}")
{% endif %}{% if include_auth %}

def is_authorized(req):
    expected = "Bearer " + os.environ.get("WEBHOOK_TOKEN", "")
    return req.headers.get("Authorization") == expected
{% endif %}{% for intent in intents %}

def handle_{{ intent | snake_case }}(parameters):
    return {"fulfillmentText": "Handled {{ intent }}"}
{% endfor %}

HANDLERS = {
{% for intent in intents %}    "{{ intent }}": handle_{{ intent | snake_case }},
{% endfor %}}


@app.route("/webhook", methods=["POST"])
def webhook():
{% if include_auth %}    if not is_authorized(request):
        return jsonify({"error": "unauthorized"}), 401
{% endif %}    body = request.get_json(force=True)
    intent_name = body["queryResult"]["intent"]["displayName"]
{% if include_logging %}    logger.info("fulfilling %s", intent_name)
{% endif %}    handler = HANDLERS.get(intent_name)
    if handler is None:
        return jsonify({"fulfillmentText": "Sorry, I did not understand that."})
    return jsonify(handler(body["queryResult"].get("parameters", {})))


if __name__ == "__main__":
    app.run(port=int(os.environ.get("PORT", 3000)))
"#;

pub struct WebhookGenerator {
    tera: Tera,
}

impl WebhookGenerator {
    pub fn new() -> Result<Self, CodegenError> {
        let mut tera = Tera::default();
        tera.register_filter("pascal_case", pascal_case_filter);
        tera.register_filter("snake_case", snake_case_filter);
        tera.add_raw_templates(vec![
            (WebhookLanguage::Node.template_name(), NODE_TEMPLATE),
            (WebhookLanguage::Python.template_name(), PYTHON_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub fn generate(&self, config: &WebhookConfig) -> Result<GeneratedCode, CodegenError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(DomainError::MissingField { field: "webhook name" }.into());
        }

        let mut intents: Vec<&str> = Vec::new();
        for intent in config.intents.iter().map(|intent| intent.trim()) {
            if !intent.is_empty() && !intents.contains(&intent) {
                intents.push(intent);
            }
        }

        let mut context = Context::new();
        context.insert("name", name);
        context.insert("intents", &intents);
        context.insert("include_auth", &config.include_auth);
        context.insert("include_logging", &config.include_logging);

        let source = self.tera.render(config.language.template_name(), &context)?;
        Ok(GeneratedCode {
            file_name: format!("{}_webhook.{}", snake_case(name), config.language.extension()),
            language: config.language,
            source,
        })
    }
}

fn words(input: &str) -> impl Iterator<Item = &str> {
    input.split(|ch: char| !ch.is_ascii_alphanumeric()).filter(|word| !word.is_empty())
}

pub fn pascal_case(input: &str) -> String {
    words(input)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

pub fn snake_case(input: &str) -> String {
    words(input).map(|word| word.to_ascii_lowercase()).collect::<Vec<_>>().join("_")
}

fn pascal_case_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let input =
        value.as_str().ok_or_else(|| tera::Error::msg("pascal_case filter expects a string"))?;
    Ok(tera::Value::String(pascal_case(input)))
}

fn snake_case_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let input =
        value.as_str().ok_or_else(|| tera::Error::msg("snake_case filter expects a string"))?;
    Ok(tera::Value::String(snake_case(input)))
}
