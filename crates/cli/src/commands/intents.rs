use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use serde_json::json;

use buddy_core::config::AppConfig;
use buddy_core::domain::intent::{Intent, IntentId, PhraseId};
use buddy_core::export::to_dialogflow;
use buddy_db::{IntentFilter, IntentRepository, RepositoryError, SqlIntentRepository};

use crate::commands::intent::IntentFormat;
use crate::commands::{
    load_config, persistence_failure, to_data, validation_failure, with_store, CommandResult,
    Failure,
};

#[derive(Clone, Debug, Subcommand)]
pub enum IntentsCommand {
    #[command(about = "List stored intents, newest first")]
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, help = "Case-insensitive match on the display name")]
        search: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Show one stored intent")]
    Show {
        id: String,
        #[arg(long, value_enum, default_value_t = IntentFormat::Native)]
        format: IntentFormat,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Rewrite one training phrase of a stored intent")]
    EditPhrase {
        id: String,
        phrase_id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Remove one training phrase from a stored intent")]
    RemovePhrase {
        id: String,
        phrase_id: String,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Delete a stored intent by id")]
    Delete {
        id: String,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct IntentSummary<'a> {
    id: &'a str,
    display_name: &'a str,
    category: &'a str,
    language: &'a str,
    phrase_count: usize,
    updated_at: String,
}

impl<'a> From<&'a Intent> for IntentSummary<'a> {
    fn from(intent: &'a Intent) -> Self {
        Self {
            id: &intent.id.0,
            display_name: &intent.display_name,
            category: &intent.category,
            language: &intent.language,
            phrase_count: intent.training_phrases.len(),
            updated_at: intent.updated_at.to_rfc3339(),
        }
    }
}

pub fn run(command: IntentsCommand) -> CommandResult {
    match command {
        IntentsCommand::List { category, search, limit, user } => {
            let filter = IntentFilter { category, search, limit };
            CommandResult::from_outcome("intents.list", list(user, filter))
        }
        IntentsCommand::Show { id, format, user } => {
            CommandResult::from_outcome("intents.show", show(user, IntentId(id), format))
        }
        IntentsCommand::EditPhrase { id, phrase_id, text, user } => {
            let outcome = modify(user, IntentId(id), |intent| {
                intent
                    .edit_phrase(&PhraseId(phrase_id.clone()), text.clone(), Utc::now())
                    .map_err(validation_failure)
            });
            CommandResult::from_outcome("intents.edit-phrase", outcome)
        }
        IntentsCommand::RemovePhrase { id, phrase_id, user } => {
            let outcome = modify(user, IntentId(id), |intent| {
                if intent.remove_phrase(&PhraseId(phrase_id.clone()), Utc::now()) {
                    Ok(())
                } else {
                    Err(("not_found", format!("phrase `{phrase_id}` was not found"), 5))
                }
            });
            CommandResult::from_outcome("intents.remove-phrase", outcome)
        }
        IntentsCommand::Delete { id, user } => {
            CommandResult::from_outcome("intents.delete", delete(user, IntentId(id)))
        }
    }
}

type Outcome = Result<(String, Option<serde_json::Value>), Failure>;

fn list(user: Option<String>, filter: IntentFilter) -> Outcome {
    let config = load_config(user)?;
    let intents = with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        async move {
            SqlIntentRepository::new(pool)
                .list(&user_id, &filter)
                .await
                .map_err(persistence_failure)
        }
    })?;

    let summaries: Vec<IntentSummary<'_>> = intents.iter().map(IntentSummary::from).collect();
    Ok((format!("{} intents", intents.len()), Some(to_data(&summaries)?)))
}

fn show(user: Option<String>, id: IntentId, format: IntentFormat) -> Outcome {
    let config = load_config(user)?;
    let intent = fetch(&config, &id)?;
    let data = match format {
        IntentFormat::Native => to_data(&intent)?,
        IntentFormat::Dialogflow => to_data(&to_dialogflow(&intent))?,
    };
    Ok((format!("intent `{}`", intent.display_name), Some(data)))
}

fn modify<F>(user: Option<String>, id: IntentId, edit: F) -> Outcome
where
    F: FnOnce(&mut Intent) -> Result<(), Failure>,
{
    let config = load_config(user)?;
    let mut intent = fetch(&config, &id)?;
    edit(&mut intent)?;

    with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        let intent = intent.clone();
        async move {
            SqlIntentRepository::new(pool)
                .update(&user_id, &intent)
                .await
                .map_err(persistence_failure)
        }
    })?;

    Ok((
        format!("updated `{}` ({} phrases)", intent.display_name, intent.training_phrases.len()),
        Some(to_data(&intent)?),
    ))
}

fn delete(user: Option<String>, id: IntentId) -> Outcome {
    let config = load_config(user)?;
    let deleted = with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        let id = id.clone();
        async move {
            SqlIntentRepository::new(pool).delete(&user_id, &id).await.map_err(persistence_failure)
        }
    })?;

    if deleted {
        Ok((format!("deleted intent `{}`", id.0), Some(json!({ "deleted": true }))))
    } else {
        Err(persistence_failure(RepositoryError::NotFound { kind: "intent", id: id.0 }))
    }
}

fn fetch(config: &AppConfig, id: &IntentId) -> Result<Intent, Failure> {
    let found = with_store(config, |pool| {
        let user_id = config.generation.user_id.clone();
        let id = id.clone();
        async move {
            SqlIntentRepository::new(pool).find(&user_id, &id).await.map_err(persistence_failure)
        }
    })?;
    found.ok_or_else(|| {
        persistence_failure(RepositoryError::NotFound { kind: "intent", id: id.0.clone() })
    })
}
