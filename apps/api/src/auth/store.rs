//! User profile persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::auth::identity::VerifiedIdentity;
use crate::db::ensure_schema;
use crate::errors::AppError;
use crate::models::user::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts or refreshes the profile for `identity`, keyed on its uid.
    async fn upsert(&self, identity: &VerifiedIdentity) -> Result<User, AppError>;
}

/// Postgres-backed store. The schema is created on first use.
pub struct PgUserStore {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert(&self, identity: &VerifiedIdentity) -> Result<User, AppError> {
        self.schema
            .get_or_try_init(|| ensure_schema(&self.pool))
            .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, external_id, email, display_name, email_verified)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (external_id) DO UPDATE
            SET email          = EXCLUDED.email,
                display_name   = COALESCE(EXCLUDED.display_name, users.display_name),
                email_verified = EXCLUDED.email_verified,
                updated_at     = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&identity.uid)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.email_verified)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
