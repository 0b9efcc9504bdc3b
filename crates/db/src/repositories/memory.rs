use tokio::sync::RwLock;

use buddy_core::domain::entity::CustomEntity;
use buddy_core::domain::intent::{Intent, IntentId};
use buddy_core::domain::playbook::{PlaybookId, PlaybookInstruction};

use super::{
    EntityRepository, IntentFilter, IntentRepository, PlaybookRepository, RepositoryError,
};

/// Rows kept in insertion order together with their owner.
type Owned<T> = RwLock<Vec<(String, T)>>;

#[derive(Default)]
pub struct InMemoryIntentRepository {
    intents: Owned<Intent>,
}

#[async_trait::async_trait]
impl IntentRepository for InMemoryIntentRepository {
    async fn insert(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError> {
        let mut intents = self.intents.write().await;
        if intents.iter().any(|(_, existing)| existing.id == intent.id) {
            return Err(RepositoryError::Decode(format!(
                "intent `{}` already exists",
                intent.id.0
            )));
        }
        intents.push((user_id.to_string(), intent.clone()));
        Ok(())
    }

    async fn list(
        &self,
        user_id: &str,
        filter: &IntentFilter,
    ) -> Result<Vec<Intent>, RepositoryError> {
        let intents = self.intents.read().await;
        let mut found: Vec<Intent> = intents
            .iter()
            .rev()
            .filter(|(owner, intent)| owner == user_id && filter.matches(intent))
            .map(|(_, intent)| intent.clone())
            .collect();
        found.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        if let Some(limit) = filter.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find(&self, user_id: &str, id: &IntentId) -> Result<Option<Intent>, RepositoryError> {
        let intents = self.intents.read().await;
        Ok(intents
            .iter()
            .find(|(owner, intent)| owner == user_id && &intent.id == id)
            .map(|(_, intent)| intent.clone()))
    }

    async fn update(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError> {
        let mut intents = self.intents.write().await;
        let slot = intents
            .iter_mut()
            .find(|(owner, existing)| owner == user_id && existing.id == intent.id)
            .ok_or_else(|| RepositoryError::NotFound { kind: "intent", id: intent.id.0.clone() })?;
        let created_at = slot.1.created_at;
        slot.1 = Intent { created_at, ..intent.clone() };
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &IntentId) -> Result<bool, RepositoryError> {
        let mut intents = self.intents.write().await;
        let before = intents.len();
        intents.retain(|(owner, intent)| !(owner == user_id && &intent.id == id));
        Ok(intents.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryPlaybookRepository {
    playbooks: Owned<PlaybookInstruction>,
}

#[async_trait::async_trait]
impl PlaybookRepository for InMemoryPlaybookRepository {
    async fn insert(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError> {
        let mut playbooks = self.playbooks.write().await;
        if playbooks.iter().any(|(_, existing)| existing.id == playbook.id) {
            return Err(RepositoryError::Decode(format!(
                "playbook `{}` already exists",
                playbook.id.0
            )));
        }
        playbooks.push((user_id.to_string(), playbook.clone()));
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<PlaybookInstruction>, RepositoryError> {
        let playbooks = self.playbooks.read().await;
        let mut found: Vec<PlaybookInstruction> = playbooks
            .iter()
            .rev()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, playbook)| playbook.clone())
            .collect();
        found.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(found)
    }

    async fn find(
        &self,
        user_id: &str,
        id: &PlaybookId,
    ) -> Result<Option<PlaybookInstruction>, RepositoryError> {
        let playbooks = self.playbooks.read().await;
        Ok(playbooks
            .iter()
            .find(|(owner, playbook)| owner == user_id && &playbook.id == id)
            .map(|(_, playbook)| playbook.clone()))
    }

    async fn update(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError> {
        let mut playbooks = self.playbooks.write().await;
        let slot = playbooks
            .iter_mut()
            .find(|(owner, existing)| owner == user_id && existing.id == playbook.id)
            .ok_or_else(|| RepositoryError::NotFound {
                kind: "playbook",
                id: playbook.id.0.clone(),
            })?;
        slot.1 = playbook.clone();
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &PlaybookId) -> Result<bool, RepositoryError> {
        let mut playbooks = self.playbooks.write().await;
        let before = playbooks.len();
        playbooks.retain(|(owner, playbook)| !(owner == user_id && &playbook.id == id));
        Ok(playbooks.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryEntityRepository {
    entities: Owned<CustomEntity>,
}

#[async_trait::async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn insert(&self, user_id: &str, entity: &CustomEntity) -> Result<(), RepositoryError> {
        self.insert_all(user_id, std::slice::from_ref(entity)).await
    }

    async fn insert_all(
        &self,
        user_id: &str,
        batch: &[CustomEntity],
    ) -> Result<(), RepositoryError> {
        let mut entities = self.entities.write().await;
        for (index, entity) in batch.iter().enumerate() {
            entity.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;
            let taken = entities.iter().any(|(_, existing)| existing.id == entity.id)
                || batch[..index].iter().any(|earlier| earlier.id == entity.id);
            if taken {
                return Err(RepositoryError::Decode(format!(
                    "entity `{}` already exists",
                    entity.id
                )));
            }
        }
        entities.extend(batch.iter().map(|entity| (user_id.to_string(), entity.clone())));
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<CustomEntity>, RepositoryError> {
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .rev()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, entity)| entity.clone())
            .collect())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let mut entities = self.entities.write().await;
        let before = entities.len();
        entities.retain(|(owner, entity)| !(owner == user_id && entity.id == id));
        Ok(entities.len() != before)
    }
}
