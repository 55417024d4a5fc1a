//! Session-scoped database access.
//!
//! One pool per test run, with an isolated schema that datastores point at.
//! Isolation between runs relies on the schema drop at teardown, not on
//! transactional rollback: a failed test's rows persist until then.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::HarnessResult;
use crate::fixture::FixtureStack;

#[derive(Clone)]
pub struct DbSession {
    pool: PgPool,
    schema: String,
}

impl DbSession {
    /// Connect and create the isolated schema, deferring its forced drop.
    pub async fn connect(
        database_url: &str,
        schema: &str,
        stack: &FixtureStack,
    ) -> HarnessResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let session = Self {
            pool,
            schema: schema.to_string(),
        };

        session
            .execute(&format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                quote_ident(schema)
            ))
            .await?;

        let cleanup = session.clone();
        stack.defer(format!("schema {}", schema), move || async move {
            cleanup
                .execute(&format!(
                    "DROP SCHEMA IF EXISTS {} CASCADE",
                    quote_ident(&cleanup.schema)
                ))
                .await
        });

        Ok(session)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Execute a raw SQL statement against the session schema.
    ///
    /// The search path is pinned per statement so unqualified table names
    /// resolve to the isolated schema while PostGIS stays reachable.
    pub async fn execute(&self, sql: &str) -> HarnessResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(&format!(
            "SET search_path TO {}, public",
            quote_ident(&self.schema)
        ))
        .execute(&mut *conn)
        .await?;
        sqlx::query(sql).execute(&mut *conn).await?;
        Ok(())
    }

    /// Count rows in a table of the session schema.
    pub async fn count(&self, table: &str) -> HarnessResult<i64> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {}.{}",
            quote_ident(&self.schema),
            quote_ident(table)
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Quote an identifier for safe use in SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
