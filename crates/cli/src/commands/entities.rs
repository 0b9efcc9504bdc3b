use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use buddy_db::{EntityRepository, SqlEntityRepository};

use crate::commands::detect::read_custom_entities;
use crate::commands::{load_config, persistence_failure, to_data, with_store, CommandResult};

#[derive(Clone, Debug, Subcommand)]
pub enum EntitiesCommand {
    #[command(about = "Store custom lookup entities from a JSON file")]
    Import {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "List stored custom entities")]
    List {
        #[arg(long)]
        user: Option<String>,
    },
    #[command(about = "Delete a stored custom entity by id")]
    Delete {
        id: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(command: EntitiesCommand) -> CommandResult {
    match command {
        EntitiesCommand::Import { file, user } => {
            let outcome = load_config(user).and_then(|config| {
                let entities = read_custom_entities(&file)?;
                let count = entities.len();
                with_store(&config, |pool| {
                    let user_id = config.generation.user_id.clone();
                    async move {
                        SqlEntityRepository::new(pool)
                            .insert_all(&user_id, &entities)
                            .await
                            .map_err(persistence_failure)
                    }
                })?;
                Ok((format!("stored {count} custom entities"), None))
            });
            CommandResult::from_outcome("entities.import", outcome)
        }
        EntitiesCommand::List { user } => {
            let outcome = load_config(user).and_then(|config| {
                let entities = with_store(&config, |pool| {
                    let user_id = config.generation.user_id.clone();
                    async move {
                        SqlEntityRepository::new(pool)
                            .list(&user_id)
                            .await
                            .map_err(persistence_failure)
                    }
                })?;
                Ok((format!("{} custom entities", entities.len()), Some(to_data(&entities)?)))
            });
            CommandResult::from_outcome("entities.list", outcome)
        }
        EntitiesCommand::Delete { id, user } => {
            let outcome = load_config(user).and_then(|config| {
                let deleted = with_store(&config, |pool| {
                    let user_id = config.generation.user_id.clone();
                    let id = id.clone();
                    async move {
                        SqlEntityRepository::new(pool)
                            .delete(&user_id, &id)
                            .await
                            .map_err(persistence_failure)
                    }
                })?;
                if deleted {
                    Ok((format!("deleted entity `{id}`"), Some(json!({ "deleted": true }))))
                } else {
                    Err(("not_found", format!("entity `{id}` was not found"), 5))
                }
            });
            CommandResult::from_outcome("entities.delete", outcome)
        }
    }
}
