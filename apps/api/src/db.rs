use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const USERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             UUID PRIMARY KEY,
    external_id    TEXT NOT NULL UNIQUE,
    email          TEXT,
    display_name   TEXT,
    email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Creates a PostgreSQL connection pool. Connections open on first use.
pub fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?;

    info!("PostgreSQL connection pool configured (lazy)");
    Ok(pool)
}

/// Creates the tables this service owns if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(USERS_SCHEMA).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
