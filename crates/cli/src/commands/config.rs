use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

use buddy_core::config::{read_env, AppConfig};

use crate::commands::{load_config, to_data, CommandResult, Failure};

#[derive(Debug, Serialize)]
struct ConfigLine {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    CommandResult::from_outcome("config", execute())
}

fn execute() -> Result<(String, Option<serde_json::Value>), Failure> {
    let config = load_config(None)?;
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let origin = Origin { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let lines: Vec<ConfigLine> = fields(&config)
        .into_iter()
        .map(|field| ConfigLine {
            key: field.key,
            source: origin.source_of(field.key, field.env_keys),
            value: field.value,
        })
        .collect();

    Ok((
        "effective config (source precedence: env > file > default)".to_string(),
        Some(to_data(&lines)?),
    ))
}

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["BUDDY_DATABASE_URL"],
        },
        Field {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["BUDDY_DATABASE_MAX_CONNECTIONS"],
        },
        Field {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["BUDDY_DATABASE_TIMEOUT_SECS"],
        },
        Field {
            key: "generation.default_language",
            value: config.generation.language.clone(),
            env_keys: &["BUDDY_GENERATION_DEFAULT_LANGUAGE"],
        },
        Field {
            key: "generation.default_phrase_count",
            value: config.generation.phrase_count.to_string(),
            env_keys: &["BUDDY_GENERATION_DEFAULT_PHRASE_COUNT"],
        },
        Field {
            key: "generation.default_max_tokens",
            value: config.generation.max_tokens.to_string(),
            env_keys: &["BUDDY_GENERATION_DEFAULT_MAX_TOKENS"],
        },
        Field {
            key: "generation.default_user",
            value: config.generation.user_id.clone(),
            env_keys: &["BUDDY_GENERATION_DEFAULT_USER"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["BUDDY_LOGGING_LEVEL", "BUDDY_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            env_keys: &["BUDDY_LOGGING_FORMAT", "BUDDY_LOG_FORMAT"],
        },
    ]
}

struct Origin<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

impl Origin<'_> {
    fn source_of(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("buddy.toml"), PathBuf::from("config/buddy.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
