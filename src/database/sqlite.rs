use crate::database::UserRepository;
use crate::domain::{UserDraft, UserRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>("SELECT id, name, statement FROM users")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query users")?;

        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let user =
            sqlx::query_as::<_, UserRecord>("SELECT id, name, statement FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to get user {}", id))?;

        Ok(user)
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord> {
        // storage assigns the id, everything else is echoed back
        let id: i64 =
            sqlx::query_scalar("INSERT INTO users (name, statement) VALUES (?, ?) RETURNING id")
                .bind(&draft.name)
                .bind(draft.statement)
                .fetch_one(&self.pool)
                .await
                .context("Failed to create user")?;

        Ok(draft.clone().into_record(id))
    }

    async fn update_user(&self, id: i64, draft: &UserDraft) -> Result<Option<UserRecord>> {
        // existence check, replacement and re-fetch share one transaction.
        // returning early drops `tx`, which rolls it back
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin update transaction")?;

        let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("Failed to check user {} exists", id))?;

        if exists == 0 {
            return Ok(None);
        }

        sqlx::query("UPDATE users SET name = ?, statement = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(draft.statement)
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update user {}", id))?;

        let updated =
            sqlx::query_as::<_, UserRecord>("SELECT id, name, statement FROM users WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Failed to retrieve updated user {}", id))?;

        tx.commit()
            .await
            .with_context(|| format!("Failed to commit update of user {}", id))?;

        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete user {}", id))?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;

        Ok(())
    }
}
