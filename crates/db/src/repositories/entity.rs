use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use buddy_core::domain::entity::{CustomEntity, EntityValue};

use super::{decode_err, EntityRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEntityRepository {
    pool: DbPool,
}

impl SqlEntityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_values(&self, entity_id: &str) -> Result<Vec<EntityValue>, RepositoryError> {
        let value_rows = sqlx::query(
            "SELECT position, value FROM entity_values WHERE entity_id = ? ORDER BY position ASC",
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        let synonym_rows = sqlx::query(
            "SELECT value_position, synonym FROM entity_synonyms
             WHERE entity_id = ? ORDER BY value_position ASC, position ASC",
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        let mut values = Vec::with_capacity(value_rows.len());
        for row in &value_rows {
            let position: i64 = row.try_get("position").map_err(decode_err)?;
            let mut synonyms = Vec::new();
            for synonym_row in &synonym_rows {
                let value_position: i64 =
                    synonym_row.try_get("value_position").map_err(decode_err)?;
                if value_position == position {
                    synonyms.push(synonym_row.try_get("synonym").map_err(decode_err)?);
                }
            }
            values.push(EntityValue { value: row.try_get("value").map_err(decode_err)?, synonyms });
        }
        Ok(values)
    }
}

async fn write_entity(
    conn: &mut SqliteConnection,
    user_id: &str,
    entity: &CustomEntity,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO entities (id, user_id, name, description, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&entity.id)
    .bind(user_id)
    .bind(&entity.name)
    .bind(&entity.description)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;

    for (position, value) in entity.values.iter().enumerate() {
        sqlx::query("INSERT INTO entity_values (entity_id, position, value) VALUES (?, ?, ?)")
            .bind(&entity.id)
            .bind(position as i64)
            .bind(&value.value)
            .execute(&mut *conn)
            .await?;

        for (synonym_position, synonym) in value.synonyms.iter().enumerate() {
            sqlx::query(
                "INSERT INTO entity_synonyms (entity_id, value_position, position, synonym)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&entity.id)
            .bind(position as i64)
            .bind(synonym_position as i64)
            .bind(synonym)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl EntityRepository for SqlEntityRepository {
    async fn insert(&self, user_id: &str, entity: &CustomEntity) -> Result<(), RepositoryError> {
        self.insert_all(user_id, std::slice::from_ref(entity)).await
    }

    async fn insert_all(
        &self,
        user_id: &str,
        entities: &[CustomEntity],
    ) -> Result<(), RepositoryError> {
        for entity in entities {
            entity.validate().map_err(decode_err)?;
        }

        let mut tx = self.pool.begin().await?;
        for entity in entities {
            write_entity(&mut *tx, user_id, entity).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<CustomEntity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, description FROM entities
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entities = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id").map_err(decode_err)?;
            let values = self.load_values(&id).await?;
            entities.push(CustomEntity {
                id,
                name: row.try_get("name").map_err(decode_err)?,
                description: row.try_get("description").map_err(decode_err)?,
                values,
            });
        }
        Ok(entities)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        let deleted = sqlx::query("DELETE FROM entities WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
}
