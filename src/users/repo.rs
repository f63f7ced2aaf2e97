use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{RowWrite, User, UserInput};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &UserInput) -> anyhow::Result<i64>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// Overwrites every column of the row.
    async fn update(&self, id: i64, user: &UserInput) -> anyhow::Result<RowWrite>;
    async fn delete(&self, id: i64) -> anyhow::Result<RowWrite>;
    /// Whether any row still points at this picture path.
    async fn picture_in_use(&self, path: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &UserInput) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, phone, profile_picture)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.profile_picture)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(id)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, profile_picture, registration_date
            FROM users
            ORDER BY registration_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, phone, profile_picture, registration_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn update(&self, id: i64, user: &UserInput) -> anyhow::Result<RowWrite> {
        // The locked sub-select hands back the picture being overwritten.
        let row = sqlx::query_as::<_, (Option<String>,)>(
            r#"
            UPDATE users AS u
               SET name = $1, email = $2, phone = $3, profile_picture = $4
              FROM (SELECT id, profile_picture FROM users WHERE id = $5 FOR UPDATE) AS prev
             WHERE u.id = prev.id
            RETURNING prev.profile_picture
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.profile_picture)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(match row {
            Some((previous_picture,)) => RowWrite::Applied { previous_picture },
            None => RowWrite::Missing,
        })
    }

    async fn delete(&self, id: i64) -> anyhow::Result<RowWrite> {
        let row = sqlx::query_as::<_, (Option<String>,)>(
            r#"
            DELETE FROM users
             WHERE id = $1
            RETURNING profile_picture
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete user")?;
        Ok(match row {
            Some((previous_picture,)) => RowWrite::Applied { previous_picture },
            None => RowWrite::Missing,
        })
    }

    async fn picture_in_use(&self, path: &str) -> anyhow::Result<bool> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE profile_picture = $1)",
        )
        .bind(path)
        .fetch_one(&self.db)
        .await
        .context("check picture references")?;
        Ok(in_use)
    }
}
