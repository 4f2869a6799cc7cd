//! PostgreSQL implementation of the directory store.
//!
//! Every unit of work runs in a `SERIALIZABLE` transaction. Uniqueness
//! violations (`23505`) and serialization failures (`40001`) both surface as
//! [`Error::ConstraintViolation`], which the service turns into a conflict.
//!
//! Trace events use the field names from [`lingodir_core::logging`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row, Transaction};
use tracing::{debug, trace};

use crate::escape_like;
use lingodir_core::{
    CompanyId, DirectoryStore, DirectoryTx, Error, Language, NameRecord, Result, TagId,
};

const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";

/// Map a driver error, folding races into [`Error::ConstraintViolation`].
pub(crate) fn map_db_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let name = db_err.constraint().unwrap_or("unique constraint");
                return Error::ConstraintViolation(format!("{} violated", name));
            }
            Some(SERIALIZATION_FAILURE) => {
                return Error::ConstraintViolation(
                    "concurrent update, transaction serialization failed".to_string(),
                );
            }
            _ => {}
        }
    }
    Error::Database(err)
}

fn name_record(row: &PgRow) -> Result<NameRecord> {
    let code: String = row.get("language_code");
    let language = Language::parse(&code)
        .ok_or_else(|| Error::Internal(format!("Unknown language code '{}' in store", code)))?;
    Ok(NameRecord::new(row.get("id"), language, row.get::<String, _>("name")))
}

/// Directory store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn DirectoryTx>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        trace!(subsystem = "database", component = "store", op = "begin", "Transaction opened");
        Ok(Box::new(PgTx { tx: Some(tx) }))
    }
}

/// One `SERIALIZABLE` transaction. Dropped without commit, it rolls back.
pub struct PgTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgTx {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| Error::Internal("Transaction already committed".to_string()))
    }

    async fn touch_company(&mut self, company_id: CompanyId) -> Result<()> {
        sqlx::query("UPDATE company SET updated_at = $2 WHERE id = $1")
            .bind(company_id)
            .bind(Utc::now())
            .execute(self.conn()?)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryTx for PgTx {
    async fn find_company_by_name(&mut self, name: &str) -> Result<Option<CompanyId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT company_id FROM company_name WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn insert_company(&mut self) -> Result<CompanyId> {
        sqlx::query_scalar::<_, i64>("INSERT INTO company DEFAULT VALUES RETURNING id")
            .fetch_one(self.conn()?)
            .await
            .map_err(map_db_error)
    }

    async fn insert_company_name(
        &mut self,
        company_id: CompanyId,
        language: Language,
        name: &str,
    ) -> Result<()> {
        sqlx::query("INSERT INTO company_name (company_id, language_code, name) VALUES ($1, $2, $3)")
            .bind(company_id)
            .bind(language.code())
            .bind(name)
            .execute(self.conn()?)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn company_names(&mut self, company_id: CompanyId) -> Result<Vec<NameRecord>> {
        let rows = sqlx::query(
            "SELECT id, language_code, name FROM company_name WHERE company_id = $1 ORDER BY id",
        )
        .bind(company_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(name_record).collect()
    }

    async fn search_company_names(
        &mut self,
        query: &str,
        language: Language,
    ) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM company_name
            WHERE language_code = $2
              AND name ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(escape_like(query))
        .bind(language.code())
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn find_tag_by_name(&mut self, name: &str) -> Result<Option<TagId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT tag_id FROM tag_name WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn insert_tag(&mut self) -> Result<TagId> {
        sqlx::query_scalar::<_, i64>("INSERT INTO tag DEFAULT VALUES RETURNING id")
            .fetch_one(self.conn()?)
            .await
            .map_err(map_db_error)
    }

    async fn insert_tag_name(
        &mut self,
        tag_id: TagId,
        language: Language,
        name: &str,
    ) -> Result<()> {
        sqlx::query("INSERT INTO tag_name (tag_id, language_code, name) VALUES ($1, $2, $3)")
            .bind(tag_id)
            .bind(language.code())
            .bind(name)
            .execute(self.conn()?)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn tag_names(&mut self, tag_id: TagId) -> Result<Vec<NameRecord>> {
        let rows = sqlx::query(
            "SELECT id, language_code, name FROM tag_name WHERE tag_id = $1 ORDER BY id",
        )
        .bind(tag_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(name_record).collect()
    }

    async fn search_tag_names(&mut self, query: &str) -> Result<Vec<TagId>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT tag_id FROM tag_name
            WHERE name LIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(escape_like(query))
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn link(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO company_tag (company_id, tag_id) VALUES ($1, $2)
            ON CONFLICT (company_id, tag_id) DO NOTHING
            "#,
        )
        .bind(company_id)
        .bind(tag_id)
        .execute(self.conn()?)
        .await
        .map_err(map_db_error)?;

        let created = result.rows_affected() > 0;
        if created {
            self.touch_company(company_id).await?;
        }
        Ok(created)
    }

    async fn unlink(&mut self, company_id: CompanyId, tag_id: TagId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM company_tag WHERE company_id = $1 AND tag_id = $2")
            .bind(company_id)
            .bind(tag_id)
            .execute(self.conn()?)
            .await
            .map_err(map_db_error)?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.touch_company(company_id).await?;
        }
        Ok(removed)
    }

    async fn linked_tags(&mut self, company_id: CompanyId) -> Result<Vec<TagId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT tag_id FROM company_tag WHERE company_id = $1 ORDER BY id",
        )
        .bind(company_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn linked_companies(&mut self, tag_id: TagId) -> Result<Vec<CompanyId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT company_id FROM company_tag WHERE tag_id = $1 ORDER BY id",
        )
        .bind(tag_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error)
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Internal("Transaction already committed".to_string()))?;
        tx.commit().await.map_err(map_db_error)?;
        debug!(subsystem = "database", component = "store", op = "commit", "Transaction committed");
        Ok(())
    }
}
