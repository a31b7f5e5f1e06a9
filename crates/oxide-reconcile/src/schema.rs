//! Schema representation types.
//!
//! [`Column`] and [`Table`] are immutable value objects shared by both sides
//! of a reconciliation: the live structure read from a database and the
//! declared target structure. Their constructors enforce that every attached
//! constraint names the table (and column) it belongs to.
//!
//! Declared schemas are usually written with [`TableBuilder`] and
//! [`ColumnDef`], which fill in those names automatically, and collected in a
//! [`SchemaRegistry`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DatabaseProvider;
use crate::constraints::{
    CheckConstraint, ColumnConstraint, ConstraintKind, ForeignKeyConstraint, TableConstraint,
};
use crate::error::{ReconcileError, Result};

/// A normalized SQL data type name (trimmed, upper-cased, single-spaced).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DataType(String);

impl DataType {
    /// Creates a data type from its SQL spelling.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        let normalized = name
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        Self(normalized)
    }

    /// Returns the normalized type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the type name without any parenthesized arguments
    /// (`VARCHAR(255)` becomes `VARCHAR`).
    #[must_use]
    pub fn base_name(&self) -> &str {
        match self.0.find('(') {
            Some(idx) => self.0[..idx].trim_end(),
            None => &self.0,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.0
    }
}

/// A table column: name, data type and column-wide constraints.
///
/// Constraints keep their declaration order for rendering, but equality
/// ignores that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawColumn")]
pub struct Column {
    name: String,
    data_type: DataType,
    constraints: Vec<ColumnConstraint>,
}

#[derive(Deserialize)]
struct RawColumn {
    name: String,
    data_type: DataType,
    #[serde(default)]
    constraints: Vec<ColumnConstraint>,
}

impl TryFrom<RawColumn> for Column {
    type Error = ReconcileError;

    fn try_from(raw: RawColumn) -> Result<Self> {
        Self::with_constraints(raw.name, raw.data_type, raw.constraints)
    }
}

impl Column {
    /// Creates a column without constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            constraints: Vec::new(),
        }
    }

    /// Creates a column with the given constraints.
    ///
    /// Every constraint must name this column. Repeated constraints are
    /// collapsed, keeping the first occurrence.
    pub fn with_constraints(
        name: impl Into<String>,
        data_type: impl Into<DataType>,
        constraints: impl IntoIterator<Item = ColumnConstraint>,
    ) -> Result<Self> {
        let mut column = Self::new(name, data_type);
        for constraint in constraints {
            column = column.constraint(constraint)?;
        }
        Ok(column)
    }

    /// Attaches one more constraint.
    pub fn constraint(mut self, constraint: ColumnConstraint) -> Result<Self> {
        if constraint.column_name() != self.name {
            return Err(ReconcileError::validation(format!(
                "{} constraint for column '{}' cannot be attached to column '{}'",
                constraint.kind(),
                constraint.column_name(),
                self.name
            )));
        }
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
        Ok(self)
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[ColumnConstraint] {
        &self.constraints
    }

    /// Returns true if the column carries a constraint of the given kind.
    #[must_use]
    pub fn has_constraint(&self, kind: ConstraintKind) -> bool {
        self.constraints.iter().any(|c| c.kind() == kind)
    }

    /// Returns true if the column is (part of) the primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.has_constraint(ConstraintKind::PrimaryKey)
    }

    /// Returns a copy under a new name, with constraints re-homed.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Self {
        Self {
            name: new_name.to_string(),
            data_type: self.data_type.clone(),
            constraints: self
                .constraints
                .iter()
                .map(|c| c.with_column_name(new_name))
                .collect(),
        }
    }

    /// Returns a copy with a different data type.
    #[must_use]
    pub fn with_data_type(&self, data_type: impl Into<DataType>) -> Self {
        Self {
            data_type: data_type.into(),
            ..self.clone()
        }
    }

    /// Returns a copy whose constraints belong to another table.
    #[must_use]
    pub fn with_table_name(&self, table_name: &str) -> Self {
        Self {
            constraints: self
                .constraints
                .iter()
                .map(|c| c.with_table_name(table_name))
                .collect(),
            ..self.clone()
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.constraints.len() == other.constraints.len()
            && self
                .constraints
                .iter()
                .all(|c| other.constraints.contains(c))
    }
}

impl Eq for Column {}

/// A table: name, ordered columns and table-wide constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    table_constraints: Vec<TableConstraint>,
}

#[derive(Deserialize)]
struct RawTable {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    table_constraints: Vec<TableConstraint>,
}

impl TryFrom<RawTable> for Table {
    type Error = ReconcileError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Self::new(raw.name, raw.columns, raw.table_constraints)
    }
}

impl Table {
    /// Creates a table.
    ///
    /// Fails if the table or a column is unnamed, a column name repeats, a
    /// constraint names another table, or a foreign key uses a column the
    /// table does not have. Repeated table-wide constraints are collapsed,
    /// keeping insertion order.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        table_constraints: impl IntoIterator<Item = TableConstraint>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ReconcileError::validation("Table name cannot be empty"));
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.name().is_empty() {
                return Err(ReconcileError::validation(format!(
                    "Table '{}' has a column without a name",
                    name
                )));
            }
            if !seen.insert(column.name()) {
                return Err(ReconcileError::validation(format!(
                    "Table '{}' declares column '{}' more than once",
                    name,
                    column.name()
                )));
            }
            if let Some(c) = column.constraints().iter().find(|c| c.table_name() != name) {
                return Err(ReconcileError::validation(format!(
                    "{} constraint on column '{}' belongs to table '{}', not '{}'",
                    c.kind(),
                    column.name(),
                    c.table_name(),
                    name
                )));
            }
        }

        let mut constraints: Vec<TableConstraint> = Vec::new();
        for constraint in table_constraints {
            if constraint.table_name() != name {
                return Err(ReconcileError::validation(format!(
                    "{} constraint belongs to table '{}', not '{}'",
                    constraint.kind(),
                    constraint.table_name(),
                    name
                )));
            }
            if let TableConstraint::ForeignKey(fk) = &constraint {
                if let Some(missing) = fk.columns().find(|col| !seen.contains(col)) {
                    return Err(ReconcileError::validation(format!(
                        "Foreign key on table '{}' uses unknown column '{}'",
                        name, missing
                    )));
                }
            }
            if !constraints.contains(&constraint) {
                constraints.push(constraint);
            }
        }

        Ok(Self {
            name,
            columns,
            table_constraints: constraints,
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the table-wide constraints in insertion order.
    #[must_use]
    pub fn table_constraints(&self) -> &[TableConstraint] {
        &self.table_constraints
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Returns the set of column names.
    #[must_use]
    pub fn column_name_set(&self) -> BTreeSet<&str> {
        self.column_names().collect()
    }

    /// Returns true if the table structurally contains `column`.
    #[must_use]
    pub fn contains_column(&self, column: &Column) -> bool {
        self.columns.contains(column)
    }

    /// Returns the foreign keys in insertion order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKeyConstraint> {
        self.table_constraints.iter().filter_map(|c| match c {
            TableConstraint::ForeignKey(fk) => Some(fk),
            TableConstraint::Check(_) => None,
        })
    }

    /// Returns the check constraints in insertion order.
    pub fn checks(&self) -> impl Iterator<Item = &CheckConstraint> {
        self.table_constraints.iter().filter_map(|c| match c {
            TableConstraint::Check(check) => Some(check),
            TableConstraint::ForeignKey(_) => None,
        })
    }

    /// Returns the primary key columns in declaration order.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(Column::name)
            .collect()
    }

    /// Returns a copy under a new name, with every constraint re-homed.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Self {
        Self {
            name: new_name.to_string(),
            columns: self
                .columns
                .iter()
                .map(|c| c.with_table_name(new_name))
                .collect(),
            table_constraints: self
                .table_constraints
                .iter()
                .map(|c| c.with_table_name(new_name))
                .collect(),
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.columns == other.columns
            && self.table_constraints.len() == other.table_constraints.len()
            && self
                .table_constraints
                .iter()
                .all(|c| other.table_constraints.contains(c))
    }
}

impl Eq for Table {}

#[derive(Debug, Clone, PartialEq)]
enum PendingConstraint {
    NotNull,
    Unique,
    PrimaryKey,
    Default(String),
}

/// Declaration of a column inside a [`TableBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    name: String,
    data_type: DataType,
    constraints: Vec<PendingConstraint>,
    references: Option<(String, String)>,
}

impl ColumnDef {
    /// Starts a column declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            constraints: Vec::new(),
            references: None,
        }
    }

    /// Adds `PRIMARY KEY`.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.constraints.push(PendingConstraint::PrimaryKey);
        self
    }

    /// Adds `UNIQUE`.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.constraints.push(PendingConstraint::Unique);
        self
    }

    /// Adds `NOT NULL`.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.constraints.push(PendingConstraint::NotNull);
        self
    }

    /// Adds `DEFAULT <value>`.
    #[must_use]
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.constraints.push(PendingConstraint::Default(value.into()));
        self
    }

    /// Declares a single-column foreign key to `table (column)`.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some((table.into(), column.into()));
        self
    }

    fn build(self, table_name: &str) -> Result<(Column, Option<ForeignKeyConstraint>)> {
        let constraints = self.constraints.into_iter().map(|pending| match pending {
            PendingConstraint::NotNull => ColumnConstraint::not_null(table_name, &self.name),
            PendingConstraint::Unique => ColumnConstraint::unique(table_name, &self.name),
            PendingConstraint::PrimaryKey => ColumnConstraint::primary_key(table_name, &self.name),
            PendingConstraint::Default(value) => {
                ColumnConstraint::default_value(table_name, &self.name, value)
            }
        });
        let column = Column::with_constraints(self.name.clone(), self.data_type, constraints)?;
        let fk = match self.references {
            Some((table, column)) => Some(ForeignKeyConstraint::new(
                table_name,
                table,
                [(self.name, column)],
            )?),
            None => None,
        };
        Ok((column, fk))
    }
}

/// Builder for declared tables.
///
/// ```
/// use oxide_reconcile::schema::{ColumnDef, TableBuilder};
///
/// let posts = TableBuilder::new("posts")
///     .column(ColumnDef::new("id", "INTEGER").primary_key())
///     .column(ColumnDef::new("author_id", "INTEGER").references("users", "id"))
///     .column(ColumnDef::new("body", "TEXT").not_null())
///     .check("length(body) > 0")
///     .build()
///     .unwrap();
///
/// assert_eq!(posts.foreign_keys().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<(String, Vec<(String, String)>)>,
    checks: Vec<String>,
}

impl TableBuilder {
    /// Starts a table declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a (possibly composite) foreign key.
    #[must_use]
    pub fn foreign_key<L, R>(
        mut self,
        referenced_table: impl Into<String>,
        column_mapping: impl IntoIterator<Item = (L, R)>,
    ) -> Self
    where
        L: Into<String>,
        R: Into<String>,
    {
        let mapping = column_mapping
            .into_iter()
            .map(|(local, remote)| (local.into(), remote.into()))
            .collect();
        self.foreign_keys.push((referenced_table.into(), mapping));
        self
    }

    /// Adds a `CHECK` constraint.
    #[must_use]
    pub fn check(mut self, condition: impl Into<String>) -> Self {
        self.checks.push(condition.into());
        self
    }

    /// Builds the table.
    ///
    /// Column-level `references` come first among the table constraints,
    /// followed by explicit foreign keys, then checks.
    pub fn build(self) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut constraints: Vec<TableConstraint> = Vec::new();

        for def in self.columns {
            let (column, fk) = def.build(&self.name)?;
            columns.push(column);
            if let Some(fk) = fk {
                constraints.push(fk.into());
            }
        }
        for (referenced_table, mapping) in self.foreign_keys {
            constraints.push(ForeignKeyConstraint::new(&self.name, referenced_table, mapping)?.into());
        }
        for condition in self.checks {
            constraints.push(CheckConstraint::new(&self.name, condition).into());
        }

        Table::new(self.name, columns, constraints)
    }
}

/// Ordered collection of declared tables for one database provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    provider: DatabaseProvider,
    tables: Vec<Table>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(provider: DatabaseProvider) -> Self {
        Self {
            provider,
            tables: Vec::new(),
        }
    }

    /// Registers a table.
    ///
    /// Fails if a table with the same name is already registered or a
    /// column uses a type the provider does not accept.
    pub fn register(mut self, table: Table) -> Result<Self> {
        if self.get(table.name()).is_some() {
            return Err(ReconcileError::validation(format!(
                "Table '{}' is registered more than once",
                table.name()
            )));
        }
        if let Some(column) = table
            .columns()
            .iter()
            .find(|c| !self.provider.accepts(c.data_type()))
        {
            return Err(ReconcileError::validation(format!(
                "Column '{}.{}' uses type {} which {} does not accept",
                table.name(),
                column.name(),
                column.data_type(),
                self.provider
            )));
        }
        debug!(table = table.name(), "Registered table");
        self.tables.push(table);
        Ok(self)
    }

    /// Registers several tables in order.
    pub fn register_all(self, tables: impl IntoIterator<Item = Table>) -> Result<Self> {
        tables.into_iter().try_fold(self, Self::register)
    }

    /// Loads a registry from a JSON array of tables.
    pub fn from_json(provider: DatabaseProvider, json: &str) -> Result<Self> {
        let tables: Vec<Table> = serde_json::from_str(json)?;
        Self::new(provider).register_all(tables)
    }

    /// Loads a registry from a JSON file.
    pub fn load(provider: DatabaseProvider, path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(provider, &json)
    }

    /// Gets a registered table by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Returns the registered tables in registration order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        TableBuilder::new("users")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("name", "TEXT").not_null())
            .build()
            .unwrap()
    }

    #[test]
    fn test_data_type_normalization() {
        let dtype = DataType::new("  double   precision ");
        assert_eq!(dtype.as_str(), "DOUBLE PRECISION");
        assert_eq!(DataType::new("varchar(255)").base_name(), "VARCHAR");
        assert_eq!(DataType::from("text"), DataType::from("TEXT"));
    }

    #[test]
    fn test_column_rejects_foreign_constraint() {
        let result = Column::with_constraints(
            "id",
            "INTEGER",
            [ColumnConstraint::primary_key("users", "name")],
        );
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_column_collapses_duplicates() {
        let column = Column::with_constraints(
            "id",
            "INTEGER",
            [
                ColumnConstraint::primary_key("users", "id"),
                ColumnConstraint::unique("users", "id"),
                ColumnConstraint::primary_key("users", "id"),
            ],
        )
        .unwrap();
        assert_eq!(column.constraints().len(), 2);
        assert_eq!(column.constraints()[0].kind(), ConstraintKind::PrimaryKey);
    }

    #[test]
    fn test_column_equality_ignores_constraint_order() {
        let a = Column::with_constraints(
            "id",
            "INTEGER",
            [
                ColumnConstraint::primary_key("users", "id"),
                ColumnConstraint::not_null("users", "id"),
            ],
        )
        .unwrap();
        let b = Column::with_constraints(
            "id",
            "INTEGER",
            [
                ColumnConstraint::not_null("users", "id"),
                ColumnConstraint::primary_key("users", "id"),
            ],
        )
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, a.with_data_type("TEXT"));
        assert_ne!(a, Column::new("id", "INTEGER"));
    }

    #[test]
    fn test_column_renamed_rehomes_constraints() {
        let column =
            Column::with_constraints("id", "INTEGER", [ColumnConstraint::unique("users", "id")])
                .unwrap();
        let renamed = column.renamed("user_id");
        assert_eq!(renamed.name(), "user_id");
        assert_eq!(renamed.constraints()[0].column_name(), "user_id");
    }

    #[test]
    fn test_table_rejects_duplicate_columns() {
        let result = Table::new(
            "users",
            vec![Column::new("id", "INTEGER"), Column::new("id", "TEXT")],
            Vec::new(),
        );
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_table_rejects_mismatched_constraint_table() {
        let column =
            Column::with_constraints("id", "INTEGER", [ColumnConstraint::unique("people", "id")])
                .unwrap();
        assert!(Table::new("users", vec![column], Vec::new()).is_err());

        let check = CheckConstraint::new("people", "id > 0");
        assert!(Table::new("users", vec![Column::new("id", "INTEGER")], [check.into()]).is_err());
    }

    #[test]
    fn test_table_rejects_unknown_foreign_key_column() {
        let fk = ForeignKeyConstraint::new("posts", "users", [("author_id", "id")]).unwrap();
        let result = Table::new("posts", vec![Column::new("id", "INTEGER")], [fk.into()]);
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_table_builder() {
        let posts = TableBuilder::new("posts")
            .column(ColumnDef::new("id", "integer").primary_key())
            .column(ColumnDef::new("author_id", "INTEGER").references("users", "id"))
            .column(ColumnDef::new("score", "INTEGER").default("0"))
            .check("score >= 0")
            .build()
            .unwrap();

        assert_eq!(posts.name(), "posts");
        assert_eq!(
            posts.column_names().collect::<Vec<_>>(),
            vec!["id", "author_id", "score"]
        );
        assert_eq!(posts.column("id").unwrap().data_type().as_str(), "INTEGER");
        assert_eq!(posts.primary_key_columns(), vec!["id"]);

        let fk = posts.foreign_keys().next().unwrap();
        assert_eq!(fk.referenced_table(), "users");
        assert_eq!(fk.referenced_column_for("author_id"), Some("id"));
        assert_eq!(posts.checks().next().unwrap().condition, "score >= 0");
    }

    #[test]
    fn test_table_renamed_rehomes_constraints() {
        let posts = TableBuilder::new("posts")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("author_id", "INTEGER").references("users", "id"))
            .build()
            .unwrap();
        let articles = posts.renamed("articles");

        assert_eq!(articles.name(), "articles");
        assert!(articles
            .columns()
            .iter()
            .flat_map(Column::constraints)
            .all(|c| c.table_name() == "articles"));
        assert!(articles
            .table_constraints()
            .iter()
            .all(|c| c.table_name() == "articles"));
    }

    #[test]
    fn test_table_equality_is_structural() {
        assert_eq!(users(), users());
        assert_ne!(users(), users().renamed("people"));
    }

    #[test]
    fn test_table_deserialization_validates() {
        let json = r#"{
            "name": "users",
            "columns": [
                {"name": "id", "data_type": "integer", "constraints": [
                    {"type": "primary_key", "table_name": "users", "column_name": "id"}
                ]},
                {"name": "name", "data_type": "TEXT"}
            ]
        }"#;
        let table: Table = serde_json::from_str(json).unwrap();
        assert_eq!(table.primary_key_columns(), vec!["id"]);

        let bad = json.replace(r#""table_name": "users""#, r#""table_name": "people""#);
        assert!(serde_json::from_str::<Table>(&bad).is_err());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let result = SchemaRegistry::new(DatabaseProvider::Sqlite3)
            .register(users())
            .unwrap()
            .register(users());
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_registry_checks_provider_types() {
        let table = TableBuilder::new("events")
            .column(ColumnDef::new("id", "UUID"))
            .build()
            .unwrap();

        assert!(SchemaRegistry::new(DatabaseProvider::Sqlite3)
            .register(table.clone())
            .is_err());
        let registry = SchemaRegistry::new(DatabaseProvider::Postgresql)
            .register(table)
            .unwrap();
        assert_eq!(registry.tables().len(), 1);
    }

    #[test]
    fn test_registry_from_json_keeps_order() {
        let json = serde_json::to_string(&vec![users(), users().renamed("people")]).unwrap();
        let registry = SchemaRegistry::from_json(DatabaseProvider::Sqlite3, &json).unwrap();
        let names: Vec<_> = registry.tables().iter().map(Table::name).collect();
        assert_eq!(names, vec!["users", "people"]);
        assert!(registry.get("people").is_some());
    }
}
