use async_trait::async_trait;
use thiserror::Error;

use buddy_core::domain::entity::CustomEntity;
use buddy_core::domain::intent::{Intent, IntentId};
use buddy_core::domain::playbook::{PlaybookId, PlaybookInstruction};

pub mod entity;
pub mod intent;
pub mod memory;
pub mod playbook;

pub use entity::SqlEntityRepository;
pub use intent::SqlIntentRepository;
pub use memory::{InMemoryEntityRepository, InMemoryIntentRepository, InMemoryPlaybookRepository};
pub use playbook::SqlPlaybookRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{kind} `{id}` was not found")]
    NotFound { kind: &'static str, id: String },
}

impl From<serde_json::Error> for RepositoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<RepositoryError> for buddy_core::errors::ApplicationError {
    fn from(value: RepositoryError) -> Self {
        Self::Persistence(value.to_string())
    }
}

/// Narrows an intent listing. `search` is a case-insensitive substring
/// match on the display name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl IntentFilter {
    pub fn matches(&self, intent: &Intent) -> bool {
        let category_ok =
            self.category.as_deref().map_or(true, |category| intent.category == category);
        category_ok && self.matches_search(&intent.display_name)
    }

    /// Unicode-aware case folding, shared by every repository implementation.
    pub fn matches_search(&self, display_name: &str) -> bool {
        self.search
            .as_deref()
            .map_or(true, |term| display_name.to_lowercase().contains(&term.to_lowercase()))
    }
}

/// Every operation is scoped to an opaque owner id; rows owned by another
/// user behave as if absent. Listings are newest first.
#[async_trait]
pub trait IntentRepository: Send + Sync {
    async fn insert(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError>;
    async fn list(
        &self,
        user_id: &str,
        filter: &IntentFilter,
    ) -> Result<Vec<Intent>, RepositoryError>;
    async fn find(&self, user_id: &str, id: &IntentId) -> Result<Option<Intent>, RepositoryError>;
    async fn update(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError>;
    async fn delete(&self, user_id: &str, id: &IntentId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait PlaybookRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError>;
    async fn list(&self, user_id: &str) -> Result<Vec<PlaybookInstruction>, RepositoryError>;
    async fn find(
        &self,
        user_id: &str,
        id: &PlaybookId,
    ) -> Result<Option<PlaybookInstruction>, RepositoryError>;
    async fn update(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError>;
    async fn delete(&self, user_id: &str, id: &PlaybookId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn insert(&self, user_id: &str, entity: &CustomEntity) -> Result<(), RepositoryError>;
    /// Stores every entity or none of them.
    async fn insert_all(
        &self,
        user_id: &str,
        entities: &[CustomEntity],
    ) -> Result<(), RepositoryError>;
    async fn list(&self, user_id: &str) -> Result<Vec<CustomEntity>, RepositoryError>;
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_timestamp(
    raw: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&chrono::Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp `{raw}`: {error}")))
}
