use async_trait::async_trait;
use sqlx::{PgPool, Row};

use datasmith_core::{ColumnSpec, Error, ForeignKeyEdge, RecordSet, Result, TableSchema};

use crate::source::SchemaSource;

/// Schema source backed by a Postgres connection pool, reading the
/// `information_schema` catalog for the `public` schema.
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaSource for PostgresSource {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            select table_name
            from information_schema.tables
            where table_schema = 'public'
              and table_type = 'BASE TABLE'
            order by table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn table_schema(&self, table: &str) -> Result<TableSchema> {
        let rows: Vec<(String, String, bool, Option<String>, bool)> = sqlx::query_as(
            r#"
            select
              col.column_name,
              col.data_type,
              (col.is_nullable = 'YES') as is_nullable,
              col.column_default,
              exists (
                select 1
                from information_schema.table_constraints tc
                join information_schema.key_column_usage kcu
                  on kcu.constraint_name = tc.constraint_name
                 and kcu.table_schema = tc.table_schema
                where tc.constraint_type = 'PRIMARY KEY'
                  and tc.table_schema = col.table_schema
                  and tc.table_name = col.table_name
                  and kcu.column_name = col.column_name
              ) as is_primary_key
            from information_schema.columns col
            where col.table_schema = 'public'
              and col.table_name = $1
            order by col.ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        if rows.is_empty() {
            return Err(Error::Source(format!("table '{table}' not found")));
        }

        Ok(TableSchema {
            name: table.to_string(),
            columns: rows
                .into_iter()
                .map(
                    |(name, data_type, is_nullable, default, is_primary_key)| ColumnSpec {
                        name,
                        data_type,
                        is_nullable,
                        default,
                        is_primary_key,
                    },
                )
                .collect(),
        })
    }

    async fn foreign_keys(&self, tables: &[String]) -> Result<Vec<ForeignKeyEdge>> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            select
              tc.table_name  as child_table,
              kcu.column_name as child_column,
              ccu.table_name  as parent_table,
              ccu.column_name as parent_column
            from information_schema.table_constraints tc
            join information_schema.key_column_usage kcu
              on kcu.constraint_name = tc.constraint_name
             and kcu.table_schema = tc.table_schema
            join information_schema.constraint_column_usage ccu
              on ccu.constraint_name = tc.constraint_name
             and ccu.table_schema = tc.table_schema
            where tc.constraint_type = 'FOREIGN KEY'
              and tc.table_schema = 'public'
              and tc.table_name = any($1)
            order by tc.table_name, kcu.column_name
            "#,
        )
        .bind(tables)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(
                |(child_table, child_column, parent_table, parent_column)| ForeignKeyEdge {
                    child_table,
                    child_column,
                    parent_table,
                    parent_column,
                },
            )
            .collect())
    }

    async fn sample_rows(&self, table: &str, limit: i64) -> Result<RecordSet> {
        ensure_identifier(table)?;
        let schema = self.table_schema(table).await?;

        // Columns are cast to text so an arbitrary table decodes uniformly.
        let select_list = schema
            .columns
            .iter()
            .map(|column| format!("\"{}\"::text", column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("select {select_list} from \"{table}\" limit $1");

        let rows = sqlx::query(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|column| column.name.clone())
            .collect();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value: Option<String> = row.try_get(index).map_err(db_error)?;
                record.push(value.unwrap_or_default());
            }
            records.push(record);
        }

        Ok(RecordSet {
            columns,
            rows: records,
        })
    }
}

fn db_error(err: sqlx::Error) -> Error {
    Error::Source(err.to_string())
}

/// Reject table names that cannot be safely interpolated into a query.
fn ensure_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::Source(format!("invalid table name '{name}'")))
    }
}
