pub mod config;
pub mod detect;
pub mod entities;
pub mod import;
pub mod intent;
pub mod intents;
pub mod migrate;
pub mod openapi;
pub mod playbook;
pub mod playbooks;
pub mod webhook;

use std::fmt::Display;
use std::future::Future;

use buddy_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use buddy_core::errors::{ApplicationError, DomainError, Operation};
use buddy_core::seams::{IdGenerator, UuidIdGenerator};
use buddy_db::{connect, migrations, DbPool, RepositoryError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// `(error_class, message, exit_code)` carried out of a failed command.
pub(crate) type Failure = (&'static str, String, u8);

impl CommandResult {
    pub(crate) fn from_outcome(
        command: &str,
        outcome: Result<(String, Option<Value>), Failure>,
    ) -> Self {
        match outcome {
            Ok((message, data)) => Self::ok(command, message, data),
            Err((error_class, message, exit_code)) => {
                let correlation_id = UuidIdGenerator.next_id("cli");
                let interface = classify(error_class, message.clone())
                    .into_interface(operation_of(command), correlation_id.clone());
                tracing::warn!(
                    event_name = "cli.command.failed",
                    command,
                    error_class,
                    exit_code,
                    correlation_id = %correlation_id,
                    "{message}"
                );
                let payload = CommandOutcome {
                    command: command.to_string(),
                    status: "error".to_string(),
                    error_class: Some(error_class.to_string()),
                    message,
                    notice: Some(interface.user_message().to_string()),
                    correlation_id: Some(correlation_id),
                    data: None,
                };
                Self { exit_code, output: serialize_payload(payload) }
            }
        }
    }

    fn ok(command: &str, message: String, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            notice: None,
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn classify(error_class: &str, message: String) -> ApplicationError {
    match error_class {
        "validation" | "input" => DomainError::InvariantViolation(message).into(),
        "persistence" | "not_found" | "db_connectivity" | "migration" => {
            ApplicationError::Persistence(message)
        }
        "config_validation" | "runtime_init" => ApplicationError::Configuration(message),
        _ => ApplicationError::Rendering(message),
    }
}

/// Which user-facing operation a command name stands for.
fn operation_of(command: &str) -> Operation {
    let verb = command.rsplit('.').next().unwrap_or(command);
    match verb {
        "list" | "show" | "config" | "detect" => Operation::Load,
        "delete" => Operation::Delete,
        "edit-phrase" | "remove-phrase" | "migrate" => Operation::Update,
        "import" => Operation::Create,
        _ => Operation::Generate,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(user: Option<String>) -> Result<AppConfig, Failure> {
    let options = LoadOptions {
        overrides: ConfigOverrides { user_id: user, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    AppConfig::load(options)
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2))
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, Failure> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        ("runtime_init", format!("failed to initialize async runtime: {error}"), 3)
    })
}

/// Connects and brings the schema up to date, so a fresh workspace works
/// without a separate `migrate` step.
pub(crate) async fn open_store(config: &AppConfig) -> Result<DbPool, Failure> {
    let pool = connect(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4))?;
    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5))?;
    Ok(pool)
}

/// Runs one async store operation on a fresh current-thread runtime and
/// closes the pool afterwards.
pub(crate) fn with_store<T, F, Fut>(config: &AppConfig, operation: F) -> Result<T, Failure>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    runtime()?.block_on(async {
        let pool = open_store(config).await?;
        let result = operation(pool.clone()).await;
        pool.close().await;
        result
    })
}

pub(crate) fn validation_failure(error: impl Display) -> Failure {
    ("validation", error.to_string(), 2)
}

pub(crate) fn persistence_failure(error: RepositoryError) -> Failure {
    match error {
        RepositoryError::NotFound { .. } => ("not_found", error.to_string(), 5),
        other => ("persistence", other.to_string(), 5),
    }
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<Value, Failure> {
    serde_json::to_value(value).map_err(|error| ("serialization", error.to_string(), 1))
}
