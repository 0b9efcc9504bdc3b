use sqlx::Row;

use buddy_core::domain::playbook::{PlaybookId, PlaybookInstruction};

use super::{decode_err, PlaybookRepository, RepositoryError};
use crate::DbPool;

/// Playbooks are stored whole as a JSON document; only the columns needed
/// for ownership and listing are broken out.
pub struct SqlPlaybookRepository {
    pool: DbPool,
}

impl SqlPlaybookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_playbook(row: &sqlx::sqlite::SqliteRow) -> Result<PlaybookInstruction, RepositoryError> {
    let document: String = row.try_get("document_json").map_err(decode_err)?;
    Ok(serde_json::from_str(&document)?)
}

#[async_trait::async_trait]
impl PlaybookRepository for SqlPlaybookRepository {
    async fn insert(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO playbooks (id, user_id, name, domain, document_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&playbook.id.0)
        .bind(user_id)
        .bind(&playbook.name)
        .bind(&playbook.domain)
        .bind(serde_json::to_string(playbook)?)
        .bind(playbook.created_at.to_rfc3339())
        .bind(playbook.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<PlaybookInstruction>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT document_json FROM playbooks
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_playbook).collect()
    }

    async fn find(
        &self,
        user_id: &str,
        id: &PlaybookId,
    ) -> Result<Option<PlaybookInstruction>, RepositoryError> {
        let row = sqlx::query("SELECT document_json FROM playbooks WHERE id = ? AND user_id = ?")
            .bind(&id.0)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_playbook).transpose()
    }

    async fn update(
        &self,
        user_id: &str,
        playbook: &PlaybookInstruction,
    ) -> Result<(), RepositoryError> {
        let updated = sqlx::query(
            "UPDATE playbooks SET name = ?, domain = ?, document_json = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&playbook.name)
        .bind(&playbook.domain)
        .bind(serde_json::to_string(playbook)?)
        .bind(playbook.updated_at.to_rfc3339())
        .bind(&playbook.id.0)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { kind: "playbook", id: playbook.id.0.clone() });
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &PlaybookId) -> Result<bool, RepositoryError> {
        let deleted = sqlx::query("DELETE FROM playbooks WHERE id = ? AND user_id = ?")
            .bind(&id.0)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
}
