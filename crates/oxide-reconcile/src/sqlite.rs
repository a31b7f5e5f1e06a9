//! Live SQLite support.
//!
//! [`introspect`] reads the structure of a SQLite database into [`Table`]
//! values; [`SqliteExecutor`] runs rendered statements against it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::constraints::{
    CheckConstraint, ColumnConstraint, ForeignKeyConstraint, TableConstraint,
};
use crate::error::Result;
use crate::inspector::SnapshotInspector;
use crate::plan::MigrationPlan;
use crate::schema::{Column, Table};

const TABLES_SQL: &str =
    "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

const COLUMNS_SQL: &str =
    "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid";

const INDEXES_SQL: &str = "SELECT name, \"unique\", origin FROM pragma_index_list(?1)";

const INDEX_COLUMNS_SQL: &str = "SELECT name FROM pragma_index_info(?1) ORDER BY seqno";

const FOREIGN_KEYS_SQL: &str =
    "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq";

/// Reads every user table of the database.
///
/// Column types, `NOT NULL`, `PRIMARY KEY` and `DEFAULT` come from
/// `pragma_table_info`; single-column `UNIQUE` constraints from the indexes
/// SQLite creates for them; foreign keys from `pragma_foreign_key_list`; and
/// `CHECK` clauses from the stored `CREATE TABLE` text.
pub async fn introspect(pool: &SqlitePool) -> Result<SnapshotInspector> {
    let tables: Vec<(String, Option<String>)> = sqlx::query_as(TABLES_SQL).fetch_all(pool).await?;

    let mut result = Vec::with_capacity(tables.len());
    for (name, sql) in tables {
        let table = read_table(pool, &name, sql.as_deref().unwrap_or_default()).await?;
        debug!(table = %name, columns = table.columns().len(), "Inspected table");
        result.push(table);
    }

    info!(tables = result.len(), "Inspected SQLite database");
    Ok(SnapshotInspector::new(result))
}

async fn read_table(pool: &SqlitePool, name: &str, create_sql: &str) -> Result<Table> {
    let unique_columns = unique_columns(pool, name).await?;

    let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(COLUMNS_SQL)
        .bind(name)
        .fetch_all(pool)
        .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for (column, data_type, not_null, default, pk) in rows {
        let mut constraints = Vec::new();
        if pk > 0 {
            constraints.push(ColumnConstraint::primary_key(name, &column));
        }
        if unique_columns.iter().any(|c| *c == column) {
            constraints.push(ColumnConstraint::unique(name, &column));
        }
        if not_null != 0 {
            constraints.push(ColumnConstraint::not_null(name, &column));
        }
        if let Some(value) = default {
            constraints.push(ColumnConstraint::default_value(name, &column, value));
        }
        columns.push(Column::with_constraints(column, data_type, constraints)?);
    }

    let mut table_constraints: Vec<TableConstraint> = foreign_keys(pool, name)
        .await?
        .into_iter()
        .map(TableConstraint::from)
        .collect();
    table_constraints.extend(
        check_conditions(create_sql)
            .into_iter()
            .map(|condition| CheckConstraint::new(name, condition).into()),
    );

    Table::new(name, columns, table_constraints)
}

/// Columns carrying a single-column `UNIQUE` constraint.
async fn unique_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let indexes: Vec<(String, i64, String)> = sqlx::query_as(INDEXES_SQL)
        .bind(table)
        .fetch_all(pool)
        .await?;

    let mut columns = Vec::new();
    for (index, unique, origin) in indexes {
        if unique == 0 || origin != "u" {
            continue;
        }
        let indexed: Vec<(Option<String>,)> = sqlx::query_as(INDEX_COLUMNS_SQL)
            .bind(&index)
            .fetch_all(pool)
            .await?;
        if let [(Some(column),)] = indexed.as_slice() {
            columns.push(column.clone());
        }
    }
    Ok(columns)
}

async fn foreign_keys(pool: &SqlitePool, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
    let rows: Vec<(i64, String, String, Option<String>)> = sqlx::query_as(FOREIGN_KEYS_SQL)
        .bind(table)
        .fetch_all(pool)
        .await?;

    let mut grouped: BTreeMap<i64, (String, Vec<(String, Option<String>)>)> = BTreeMap::new();
    for (id, referenced, from, to) in rows {
        grouped
            .entry(id)
            .or_insert_with(|| (referenced, Vec::new()))
            .1
            .push((from, to));
    }

    // SQLite numbers foreign keys starting from the last declared one.
    let mut keys = Vec::with_capacity(grouped.len());
    for (referenced, pairs) in grouped.into_values().rev() {
        let mut mapping = Vec::with_capacity(pairs.len());
        let mut referenced_pk: Option<Vec<String>> = None;
        for (position, (from, to)) in pairs.into_iter().enumerate() {
            let to = match to {
                Some(to) => to,
                None => {
                    if referenced_pk.is_none() {
                        referenced_pk = Some(primary_key_columns(pool, &referenced).await?);
                    }
                    referenced_pk
                        .as_ref()
                        .and_then(|pk| pk.get(position).cloned())
                        .unwrap_or_else(|| from.clone())
                }
            };
            mapping.push((from, to));
        }
        keys.push(ForeignKeyConstraint::new(table, referenced, mapping)?);
    }
    Ok(keys)
}

async fn primary_key_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(COLUMNS_SQL)
        .bind(table)
        .fetch_all(pool)
        .await?;
    let mut pk: Vec<(i64, String)> = rows
        .into_iter()
        .filter(|(_, _, _, _, pk)| *pk > 0)
        .map(|(name, _, _, _, pk)| (pk, name))
        .collect();
    pk.sort();
    Ok(pk.into_iter().map(|(_, name)| name).collect())
}

static CHECK_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCHECK\s*\(").expect("Invalid CHECK keyword regex"));

/// Extracts the condition of every `CHECK (...)` clause in a `CREATE TABLE`
/// statement, honoring nested parentheses and quoted strings.
fn check_conditions(create_sql: &str) -> Vec<String> {
    let mut conditions = Vec::new();
    for found in CHECK_KEYWORD.find_iter(create_sql) {
        let body = &create_sql[found.end()..];
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        let mut end = None;
        for (idx, ch) in body.char_indices() {
            match quote {
                Some(q) if ch == q => quote = None,
                Some(_) => {}
                None => match ch {
                    '\'' | '"' | '`' => quote = Some(ch),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(idx);
                            break;
                        }
                    }
                    _ => {}
                },
            }
        }
        if let Some(end) = end {
            conditions.push(body[..end].trim().to_string());
        }
    }
    conditions
}

/// Runs rendered statements against a SQLite database.
///
/// Statements run one after another on the pool, without a surrounding
/// transaction.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Creates an executor over a pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Executes statements in order. A statement may contain several SQL
    /// commands separated by semicolons.
    pub async fn apply(&self, statements: &[String]) -> Result<usize> {
        for sql in statements {
            debug!(sql = %sql, "Executing SQL");
            sqlx::raw_sql(sql).execute(&self.pool).await?;
        }
        info!(statements = statements.len(), "Applied statements");
        Ok(statements.len())
    }

    /// Executes every statement of a plan.
    pub async fn apply_plan(&self, plan: &MigrationPlan) -> Result<usize> {
        info!(description = %plan.description, "Applying migration plan");
        self.apply(&plan.statements).await
    }

    /// Reads the current structure of the database.
    pub async fn introspect(&self) -> Result<SnapshotInspector> {
        introspect(&self.pool).await
    }
}
