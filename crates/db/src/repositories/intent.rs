use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use tracing::debug;

use buddy_core::domain::entity::{EntitySpan, EntityTag};
use buddy_core::domain::intent::{
    Intent, IntentId, PhraseId, Response, ResponseId, TrainingPhrase,
};

use super::{decode_err, parse_timestamp, IntentFilter, IntentRepository, RepositoryError};
use crate::DbPool;

const INTENT_COLUMNS: &str = "SELECT id, display_name, description, language, category, \
     tags_json, negative_phrases_json, created_at, updated_at FROM intents";

pub struct SqlIntentRepository {
    pool: DbPool,
}

impl SqlIntentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: &SqliteRow) -> Result<Intent, RepositoryError> {
        let id: String = row.try_get("id").map_err(decode_err)?;
        let tags_json: String = row.try_get("tags_json").map_err(decode_err)?;
        let negatives_json: String = row.try_get("negative_phrases_json").map_err(decode_err)?;
        let created_at: String = row.try_get("created_at").map_err(decode_err)?;
        let updated_at: String = row.try_get("updated_at").map_err(decode_err)?;

        let mut entities = self.load_entities(&id).await?;
        let training_phrases = sqlx::query(
            "SELECT id, text, confidence FROM training_phrases
             WHERE intent_id = ? ORDER BY position ASC",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|phrase_row| -> Result<TrainingPhrase, RepositoryError> {
            let phrase_id: String = phrase_row.try_get("id").map_err(decode_err)?;
            Ok(TrainingPhrase {
                entities: entities.remove(&phrase_id).unwrap_or_default(),
                id: PhraseId(phrase_id),
                text: phrase_row.try_get("text").map_err(decode_err)?,
                confidence: phrase_row.try_get("confidence").map_err(decode_err)?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

        let responses = sqlx::query(
            "SELECT id, text FROM intent_responses WHERE intent_id = ? ORDER BY position ASC",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|response_row| -> Result<Response, RepositoryError> {
            Ok(Response {
                id: ResponseId(response_row.try_get("id").map_err(decode_err)?),
                text: response_row.try_get("text").map_err(decode_err)?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Intent {
            id: IntentId(id),
            display_name: row.try_get("display_name").map_err(decode_err)?,
            description: row.try_get("description").map_err(decode_err)?,
            training_phrases,
            responses,
            negative_phrases: serde_json::from_str(&negatives_json)?,
            language: row.try_get("language").map_err(decode_err)?,
            category: row.try_get("category").map_err(decode_err)?,
            tags: serde_json::from_str(&tags_json)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    async fn load_entities(
        &self,
        intent_id: &str,
    ) -> Result<HashMap<String, Vec<EntitySpan>>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT pe.phrase_id, pe.entity_type, pe.value, pe.start_offset, pe.end_offset,
                    pe.canonical
             FROM phrase_entities pe
             JOIN training_phrases tp ON tp.id = pe.phrase_id
             WHERE tp.intent_id = ?
             ORDER BY pe.phrase_id, pe.position ASC",
        )
        .bind(intent_id)
        .fetch_all(&self.pool)
        .await?;

        let mut spans: HashMap<String, Vec<EntitySpan>> = HashMap::new();
        for row in &rows {
            let phrase_id: String = row.try_get("phrase_id").map_err(decode_err)?;
            let entity_type: String = row.try_get("entity_type").map_err(decode_err)?;
            let start: i64 = row.try_get("start_offset").map_err(decode_err)?;
            let end: i64 = row.try_get("end_offset").map_err(decode_err)?;
            spans.entry(phrase_id).or_default().push(EntitySpan {
                entity_type: EntityTag::try_from(entity_type).map_err(decode_err)?,
                value: row.try_get("value").map_err(decode_err)?,
                start: usize::try_from(start).map_err(decode_err)?,
                end: usize::try_from(end).map_err(decode_err)?,
                canonical: row.try_get("canonical").map_err(decode_err)?,
            });
        }
        Ok(spans)
    }
}

async fn insert_children(
    conn: &mut SqliteConnection,
    intent: &Intent,
) -> Result<(), RepositoryError> {
    for (position, phrase) in intent.training_phrases.iter().enumerate() {
        sqlx::query(
            "INSERT INTO training_phrases (id, intent_id, position, text, confidence)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&phrase.id.0)
        .bind(&intent.id.0)
        .bind(position as i64)
        .bind(&phrase.text)
        .bind(phrase.confidence)
        .execute(&mut *conn)
        .await?;

        for (span_position, span) in phrase.entities.iter().enumerate() {
            sqlx::query(
                "INSERT INTO phrase_entities
                     (phrase_id, position, entity_type, value, start_offset, end_offset, canonical)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&phrase.id.0)
            .bind(span_position as i64)
            .bind(span.entity_type.to_string())
            .bind(&span.value)
            .bind(span.start as i64)
            .bind(span.end as i64)
            .bind(&span.canonical)
            .execute(&mut *conn)
            .await?;
        }
    }

    for (position, response) in intent.responses.iter().enumerate() {
        sqlx::query(
            "INSERT INTO intent_responses (id, intent_id, position, text) VALUES (?, ?, ?, ?)",
        )
        .bind(&response.id.0)
        .bind(&intent.id.0)
        .bind(position as i64)
        .bind(&response.text)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait::async_trait]
impl IntentRepository for SqlIntentRepository {
    async fn insert(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO intents (id, user_id, display_name, description, language, category,
                                  tags_json, negative_phrases_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&intent.id.0)
        .bind(user_id)
        .bind(&intent.display_name)
        .bind(&intent.description)
        .bind(&intent.language)
        .bind(&intent.category)
        .bind(serde_json::to_string(&intent.tags)?)
        .bind(serde_json::to_string(&intent.negative_phrases)?)
        .bind(intent.created_at.to_rfc3339())
        .bind(intent.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        insert_children(&mut *tx, intent).await?;
        tx.commit().await?;

        debug!(
            event_name = "db.intent.inserted",
            intent_id = %intent.id.0,
            phrase_count = intent.training_phrases.len(),
            "intent stored"
        );
        Ok(())
    }

    async fn list(
        &self,
        user_id: &str,
        filter: &IntentFilter,
    ) -> Result<Vec<Intent>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(INTENT_COLUMNS);
        builder.push(" WHERE user_id = ");
        builder.push_bind(user_id.to_string());
        if let Some(category) = &filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.clone());
        }
        builder.push(" ORDER BY created_at DESC, rowid DESC");
        // LIKE folds ASCII only; search terms are matched below, before the limit.
        if let (Some(limit), None) = (filter.limit, &filter.search) {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        let limit = filter.limit.map_or(usize::MAX, |limit| limit as usize);
        let mut intents = Vec::new();
        for row in &rows {
            if intents.len() >= limit {
                break;
            }
            let display_name: String = row.try_get("display_name").map_err(decode_err)?;
            if filter.matches_search(&display_name) {
                intents.push(self.hydrate(row).await?);
            }
        }
        Ok(intents)
    }

    async fn find(&self, user_id: &str, id: &IntentId) -> Result<Option<Intent>, RepositoryError> {
        let row = sqlx::query(&format!("{INTENT_COLUMNS} WHERE id = ? AND user_id = ?"))
            .bind(&id.0)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(self.hydrate(r).await?)),
            None => Ok(None),
        }
    }

    async fn update(&self, user_id: &str, intent: &Intent) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE intents
             SET display_name = ?, description = ?, language = ?, category = ?,
                 tags_json = ?, negative_phrases_json = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&intent.display_name)
        .bind(&intent.description)
        .bind(&intent.language)
        .bind(&intent.category)
        .bind(serde_json::to_string(&intent.tags)?)
        .bind(serde_json::to_string(&intent.negative_phrases)?)
        .bind(intent.updated_at.to_rfc3339())
        .bind(&intent.id.0)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { kind: "intent", id: intent.id.0.clone() });
        }

        sqlx::query("DELETE FROM training_phrases WHERE intent_id = ?")
            .bind(&intent.id.0)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM intent_responses WHERE intent_id = ?")
            .bind(&intent.id.0)
            .execute(&mut *tx)
            .await?;
        insert_children(&mut *tx, intent).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &IntentId) -> Result<bool, RepositoryError> {
        let deleted = sqlx::query("DELETE FROM intents WHERE id = ? AND user_id = ?")
            .bind(&id.0)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
}
