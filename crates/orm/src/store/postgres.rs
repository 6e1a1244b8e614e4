//! PostgreSQL store backed by a `sqlx` connection pool

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::QueryScalar;
use sqlx::{PgConnection, Postgres};
use tracing::{debug, info};

use super::Store;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::query::sql_generation::{column_ref, SqlParams, ROW_ALIAS};
use crate::query::QueryBuilder;
use crate::schema::{EntitySchema, FieldType};
use crate::security::escape_identifier;
use crate::snapshot::Snapshot;

type Params = Vec<Option<String>>;

/// Store executing rendered queries against PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> ModelResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn documents(sql: &str, params: Params) -> QueryScalar<'_, Postgres, Value, PgArguments> {
    params
        .into_iter()
        .fold(sqlx::query_scalar(sql), |query, param| query.bind(param))
}

fn scalar_i64(sql: &str, params: Params) -> QueryScalar<'_, Postgres, i64, PgArguments> {
    params
        .into_iter()
        .fold(sqlx::query_scalar(sql), |query, param| query.bind(param))
}

fn decode<M: Model>(documents: Vec<Value>) -> ModelResult<Vec<M>> {
    documents
        .into_iter()
        .map(|document| serde_json::from_value(document).map_err(ModelError::from))
        .collect()
}

fn by_id<M: Model>(id: i64) -> QueryBuilder<M> {
    M::query().where_eq(M::primary_key_name(), id).limit(1)
}

/// `INSERT ... RETURNING id`; null fields are left to column defaults
pub fn insert_sql(schema: &EntitySchema, snapshot: &Snapshot) -> (String, Params) {
    let mut params = SqlParams::new();
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for field in schema.fields {
        match snapshot.get(field.name) {
            None | Some(Value::Null) => {}
            Some(value) => {
                columns.push(escape_identifier(field.name));
                values.push(params.bind(value, field.ty));
            }
        }
    }

    let table = escape_identifier(schema.table);
    let returning = format!("{}::bigint", column_ref(ROW_ALIAS, schema.primary_key));
    let sql = if columns.is_empty() {
        format!("INSERT INTO {} AS {} DEFAULT VALUES RETURNING {}", table, ROW_ALIAS, returning)
    } else {
        format!(
            "INSERT INTO {} AS {} ({}) VALUES ({}) RETURNING {}",
            table,
            ROW_ALIAS,
            columns.join(", "),
            values.join(", "),
            returning
        )
    };
    (sql, params.into_inner())
}

/// `UPDATE ... RETURNING id` writing every non-key field
pub fn update_sql(schema: &EntitySchema, snapshot: &Snapshot, id: i64) -> (String, Params) {
    let mut params = SqlParams::new();
    let assignments: Vec<String> = schema
        .fields
        .iter()
        .filter(|field| field.name != schema.primary_key)
        .map(|field| {
            let value = snapshot.get(field.name).unwrap_or(&Value::Null);
            format!("{} = {}", escape_identifier(field.name), params.bind(value, field.ty))
        })
        .collect();
    let key = params.bind(&Value::from(id), FieldType::Integer);

    let sql = format!(
        "UPDATE {} AS {} SET {} WHERE {} = {} RETURNING {}::bigint",
        escape_identifier(schema.table),
        ROW_ALIAS,
        assignments.join(", "),
        column_ref(ROW_ALIAS, schema.primary_key),
        key,
        column_ref(ROW_ALIAS, schema.primary_key)
    );
    (sql, params.into_inner())
}

async fn fetch_on<M: Model>(conn: &mut PgConnection, query: &QueryBuilder<M>) -> ModelResult<Vec<M>> {
    let (sql, params) = query.to_sql_with_params()?;
    debug!(sql = %sql, params = params.len(), "Executing query");
    decode(documents(&sql, params).fetch_all(conn).await?)
}

#[async_trait]
impl<M: Model> Store<M> for PgStore {
    async fn fetch(&self, query: &QueryBuilder<M>) -> ModelResult<Vec<M>> {
        let (sql, params) = query.to_sql_with_params()?;
        debug!(sql = %sql, params = params.len(), "Executing query");
        decode(documents(&sql, params).fetch_all(&self.pool).await?)
    }

    async fn count(&self, query: &QueryBuilder<M>) -> ModelResult<u64> {
        let (sql, params) = query.to_count_sql_with_params()?;
        debug!(sql = %sql, params = params.len(), "Executing count");
        let total = scalar_i64(&sql, params).fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }

    async fn find(&self, id: i64) -> ModelResult<Option<M>> {
        let rows = self.fetch(&by_id::<M>(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, entity: M) -> ModelResult<M> {
        let schema = M::schema();
        let snapshot = Snapshot::of(&entity)?;
        let (sql, params) = insert_sql(schema, &snapshot);
        debug!(sql = %sql, params = params.len(), "Executing insert");

        let mut tx = self.pool.begin().await?;
        let id = scalar_i64(&sql, params).fetch_one(&mut *tx).await?;
        let stored = fetch_on(&mut tx, &by_id::<M>(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::NotFound(schema.table.to_string()))?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn save(&self, entity: &M) -> ModelResult<M> {
        let schema = M::schema();
        let id = entity.primary_key().ok_or(ModelError::MissingPrimaryKey)?;
        let snapshot = Snapshot::of(entity)?;
        let (sql, params) = update_sql(schema, &snapshot, id);
        debug!(sql = %sql, params = params.len(), "Executing update");

        let mut tx = self.pool.begin().await?;
        let updated = scalar_i64(&sql, params).fetch_optional(&mut *tx).await?;
        if updated.is_none() {
            tx.rollback().await?;
            return Err(ModelError::NotFound(schema.table.to_string()));
        }
        let stored = fetch_on(&mut tx, &by_id::<M>(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::NotFound(schema.table.to_string()))?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> ModelResult<bool> {
        let schema = M::schema();
        let sql = format!(
            "DELETE FROM {} AS {} WHERE {} = $1::numeric",
            escape_identifier(schema.table),
            ROW_ALIAS,
            column_ref(ROW_ALIAS, schema.primary_key)
        );
        let result = sqlx::query(&sql)
            .bind(Some(id.to_string()))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
