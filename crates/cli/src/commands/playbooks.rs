use clap::Subcommand;
use serde_json::{json, Value};

use buddy_core::domain::playbook::PlaybookId;
use buddy_db::{PlaybookRepository, RepositoryError, SqlPlaybookRepository};

use crate::commands::{
    load_config, persistence_failure, to_data, with_store, CommandResult, Failure,
};

#[derive(Clone, Debug, Subcommand)]
pub enum PlaybooksCommand {
    #[command(about = "List stored playbooks, newest first")]
    List {
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Show one stored playbook")]
    Show {
        id: String,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Delete a stored playbook by id")]
    Delete {
        id: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(command: PlaybooksCommand) -> CommandResult {
    match command {
        PlaybooksCommand::List { user } => CommandResult::from_outcome("playbooks.list", list(user)),
        PlaybooksCommand::Show { id, user } => {
            CommandResult::from_outcome("playbooks.show", show(user, PlaybookId(id)))
        }
        PlaybooksCommand::Delete { id, user } => {
            CommandResult::from_outcome("playbooks.delete", delete(user, PlaybookId(id)))
        }
    }
}

fn list(user: Option<String>) -> Result<(String, Option<Value>), Failure> {
    let config = load_config(user)?;
    let playbooks = with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        async move {
            SqlPlaybookRepository::new(pool).list(&user_id).await.map_err(persistence_failure)
        }
    })?;

    let summaries: Vec<Value> = playbooks
        .iter()
        .map(|playbook| {
            json!({
                "id": playbook.id.0,
                "name": playbook.name,
                "domain": playbook.domain,
                "step_count": playbook.steps.len(),
                "token_count": playbook.performance.token_count,
            })
        })
        .collect();
    Ok((format!("{} playbooks", playbooks.len()), Some(Value::Array(summaries))))
}

fn show(user: Option<String>, id: PlaybookId) -> Result<(String, Option<Value>), Failure> {
    let config = load_config(user)?;
    let found = with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        let id = id.clone();
        async move {
            SqlPlaybookRepository::new(pool).find(&user_id, &id).await.map_err(persistence_failure)
        }
    })?;

    match found {
        Some(playbook) => Ok((format!("playbook `{}`", playbook.name), Some(to_data(&playbook)?))),
        None => Err(persistence_failure(RepositoryError::NotFound { kind: "playbook", id: id.0 })),
    }
}

fn delete(user: Option<String>, id: PlaybookId) -> Result<(String, Option<Value>), Failure> {
    let config = load_config(user)?;
    let deleted = with_store(&config, |pool| {
        let user_id = config.generation.user_id.clone();
        let id = id.clone();
        async move {
            SqlPlaybookRepository::new(pool)
                .delete(&user_id, &id)
                .await
                .map_err(persistence_failure)
        }
    })?;

    if deleted {
        Ok((format!("deleted playbook `{}`", id.0), Some(json!({ "deleted": true }))))
    } else {
        Err(persistence_failure(RepositoryError::NotFound { kind: "playbook", id: id.0 }))
    }
}
