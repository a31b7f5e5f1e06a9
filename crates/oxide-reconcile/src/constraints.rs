//! Constraint model.
//!
//! Constraints come in two families:
//!
//! - **Column-wide** ([`ColumnConstraint`]): `NOT NULL`, `UNIQUE`, `PRIMARY KEY`
//!   and `DEFAULT`, each attached to exactly one column.
//! - **Table-wide** ([`TableConstraint`]): `FOREIGN KEY` and `CHECK`, which may
//!   span several columns and are rendered after the column definitions.
//!
//! Every constraint records the table (and, for column-wide constraints, the
//! column) it belongs to. [`crate::schema::Column`] and [`crate::schema::Table`]
//! reject constraints whose names do not match their owner.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

/// All supported constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `NOT NULL`.
    NotNull,
    /// `UNIQUE`.
    Unique,
    /// `PRIMARY KEY`.
    PrimaryKey,
    /// `FOREIGN KEY`.
    ForeignKey,
    /// `CHECK`.
    Check,
    /// `DEFAULT`.
    Default,
}

impl ConstraintKind {
    /// Returns the SQL keyword for this kind.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::NotNull => "NOT NULL",
            Self::Unique => "UNIQUE",
            Self::PrimaryKey => "PRIMARY KEY",
            Self::ForeignKey => "FOREIGN KEY",
            Self::Check => "CHECK",
            Self::Default => "DEFAULT",
        }
    }

    /// Returns the type name used to tie-break constraint ordering.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NotNull => "NotNullConstraint",
            Self::Unique => "UniqueConstraint",
            Self::PrimaryKey => "PrimaryKeyConstraint",
            Self::ForeignKey => "ForeignKeyConstraint",
            Self::Check => "CheckConstraint",
            Self::Default => "DefaultConstraint",
        }
    }

    /// Returns true for kinds that attach to a single column.
    #[must_use]
    pub fn is_column_wide(&self) -> bool {
        !matches!(self, Self::ForeignKey | Self::Check)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A constraint attached to exactly one column.
///
/// Column-wide constraints are totally ordered by column name, then by
/// constraint type name, then by their full attribute string, so a set of
/// them always renders in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnConstraint {
    /// `NOT NULL`.
    NotNull {
        /// Owning table.
        table_name: String,
        /// Owning column.
        column_name: String,
    },
    /// `UNIQUE`.
    Unique {
        /// Owning table.
        table_name: String,
        /// Owning column.
        column_name: String,
    },
    /// `PRIMARY KEY`.
    PrimaryKey {
        /// Owning table.
        table_name: String,
        /// Owning column.
        column_name: String,
    },
    /// `DEFAULT <value>`.
    Default {
        /// Owning table.
        table_name: String,
        /// Owning column.
        column_name: String,
        /// Default value, as SQL text.
        value: String,
    },
}

impl ColumnConstraint {
    /// Creates a `NOT NULL` constraint.
    #[must_use]
    pub fn not_null(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self::NotNull {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Creates a `UNIQUE` constraint.
    #[must_use]
    pub fn unique(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self::Unique {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Creates a `PRIMARY KEY` constraint.
    #[must_use]
    pub fn primary_key(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self::PrimaryKey {
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    /// Creates a `DEFAULT` constraint.
    #[must_use]
    pub fn default_value(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Default {
            table_name: table_name.into(),
            column_name: column_name.into(),
            value: value.into(),
        }
    }

    /// Returns the constraint kind.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::NotNull { .. } => ConstraintKind::NotNull,
            Self::Unique { .. } => ConstraintKind::Unique,
            Self::PrimaryKey { .. } => ConstraintKind::PrimaryKey,
            Self::Default { .. } => ConstraintKind::Default,
        }
    }

    /// Returns the owning table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::NotNull { table_name, .. }
            | Self::Unique { table_name, .. }
            | Self::PrimaryKey { table_name, .. }
            | Self::Default { table_name, .. } => table_name,
        }
    }

    /// Returns the owning column name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        match self {
            Self::NotNull { column_name, .. }
            | Self::Unique { column_name, .. }
            | Self::PrimaryKey { column_name, .. }
            | Self::Default { column_name, .. } => column_name,
        }
    }

    /// Returns a copy owned by another table.
    #[must_use]
    pub fn with_table_name(&self, name: &str) -> Self {
        let mut constraint = self.clone();
        match &mut constraint {
            Self::NotNull { table_name, .. }
            | Self::Unique { table_name, .. }
            | Self::PrimaryKey { table_name, .. }
            | Self::Default { table_name, .. } => *table_name = name.to_string(),
        }
        constraint
    }

    /// Returns a copy owned by another column.
    #[must_use]
    pub fn with_column_name(&self, name: &str) -> Self {
        let mut constraint = self.clone();
        match &mut constraint {
            Self::NotNull { column_name, .. }
            | Self::Unique { column_name, .. }
            | Self::PrimaryKey { column_name, .. }
            | Self::Default { column_name, .. } => *column_name = name.to_string(),
        }
        constraint
    }
}

impl PartialOrd for ColumnConstraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ColumnConstraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.column_name()
            .cmp(other.column_name())
            .then_with(|| self.kind().type_name().cmp(other.kind().type_name()))
            .then_with(|| format!("{:?}", self).cmp(&format!("{:?}", other)))
    }
}

/// A `FOREIGN KEY` constraint.
///
/// The column mapping keeps insertion order: local columns and referenced
/// columns render in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ForeignKeyDef")]
pub struct ForeignKeyConstraint {
    table_name: String,
    referenced_table: String,
    column_mapping: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct ForeignKeyDef {
    table_name: String,
    referenced_table: String,
    column_mapping: Vec<(String, String)>,
}

impl TryFrom<ForeignKeyDef> for ForeignKeyConstraint {
    type Error = ReconcileError;

    fn try_from(def: ForeignKeyDef) -> Result<Self> {
        Self::new(def.table_name, def.referenced_table, def.column_mapping)
    }
}

impl ForeignKeyConstraint {
    /// Creates a foreign key from `table_name` to `referenced_table`.
    ///
    /// `column_mapping` pairs each referencing column with the column it
    /// references. The mapping must be non-empty and must not repeat a
    /// referencing column.
    pub fn new<L, R>(
        table_name: impl Into<String>,
        referenced_table: impl Into<String>,
        column_mapping: impl IntoIterator<Item = (L, R)>,
    ) -> Result<Self>
    where
        L: Into<String>,
        R: Into<String>,
    {
        let table_name = table_name.into();
        let referenced_table = referenced_table.into();
        let mut mapping: Vec<(String, String)> = Vec::new();

        for (local, remote) in column_mapping {
            let local = local.into();
            if mapping.iter().any(|(existing, _)| *existing == local) {
                return Err(ReconcileError::validation(format!(
                    "Foreign key on '{}' maps column '{}' more than once",
                    table_name, local
                )));
            }
            mapping.push((local, remote.into()));
        }

        if mapping.is_empty() {
            return Err(ReconcileError::validation(format!(
                "Foreign key on '{}' referencing '{}' has an empty column mapping",
                table_name, referenced_table
            )));
        }
        if referenced_table.is_empty() {
            return Err(ReconcileError::validation(format!(
                "Foreign key on '{}' has no referenced table",
                table_name
            )));
        }

        Ok(Self {
            table_name,
            referenced_table,
            column_mapping: mapping,
        })
    }

    /// Returns the referencing table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the referenced table name.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        &self.referenced_table
    }

    /// Returns the `(referencing, referenced)` column pairs.
    #[must_use]
    pub fn column_mapping(&self) -> &[(String, String)] {
        &self.column_mapping
    }

    /// Returns the referencing columns in mapping order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.column_mapping.iter().map(|(local, _)| local.as_str())
    }

    /// Returns the referenced columns in mapping order.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.column_mapping.iter().map(|(_, remote)| remote.as_str())
    }

    /// Returns the column referenced by `column`, if it is mapped.
    #[must_use]
    pub fn referenced_column_for(&self, column: &str) -> Option<&str> {
        self.column_mapping
            .iter()
            .find(|(local, _)| local == column)
            .map(|(_, remote)| remote.as_str())
    }

    /// Returns true if the key spans more than one column.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.column_mapping.len() > 1
    }

    /// Returns a copy owned by another table.
    #[must_use]
    pub fn with_table_name(&self, name: &str) -> Self {
        Self {
            table_name: name.to_string(),
            ..self.clone()
        }
    }
}

/// A `CHECK` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Owning table.
    pub table_name: String,
    /// Boolean SQL expression, without the surrounding parentheses.
    pub condition: String,
}

impl CheckConstraint {
    /// Creates a check constraint.
    #[must_use]
    pub fn new(table_name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            condition: condition.into(),
        }
    }
}

/// A constraint spanning the whole table definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableConstraint {
    /// `FOREIGN KEY (...) REFERENCES ...`.
    ForeignKey(ForeignKeyConstraint),
    /// `CHECK (...)`.
    Check(CheckConstraint),
}

impl TableConstraint {
    /// Returns the constraint kind.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::ForeignKey(_) => ConstraintKind::ForeignKey,
            Self::Check(_) => ConstraintKind::Check,
        }
    }

    /// Returns the owning table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::ForeignKey(fk) => fk.table_name(),
            Self::Check(check) => &check.table_name,
        }
    }

    /// Returns a copy owned by another table.
    #[must_use]
    pub fn with_table_name(&self, name: &str) -> Self {
        match self {
            Self::ForeignKey(fk) => Self::ForeignKey(fk.with_table_name(name)),
            Self::Check(check) => Self::Check(CheckConstraint::new(name, check.condition.clone())),
        }
    }
}

impl From<ForeignKeyConstraint> for TableConstraint {
    fn from(fk: ForeignKeyConstraint) -> Self {
        Self::ForeignKey(fk)
    }
}

impl From<CheckConstraint> for TableConstraint {
    fn from(check: CheckConstraint) -> Self {
        Self::Check(check)
    }
}

/// Any constraint, column-wide or table-wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    /// A column-wide constraint.
    Column(ColumnConstraint),
    /// A table-wide constraint.
    Table(TableConstraint),
}

impl Constraint {
    /// Returns the constraint kind.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Column(c) => c.kind(),
            Self::Table(c) => c.kind(),
        }
    }

    /// Returns the owning table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::Column(c) => c.table_name(),
            Self::Table(c) => c.table_name(),
        }
    }
}

impl From<ColumnConstraint> for Constraint {
    fn from(c: ColumnConstraint) -> Self {
        Self::Column(c)
    }
}

impl From<TableConstraint> for Constraint {
    fn from(c: TableConstraint) -> Self {
        Self::Table(c)
    }
}

impl From<ForeignKeyConstraint> for Constraint {
    fn from(fk: ForeignKeyConstraint) -> Self {
        Self::Table(TableConstraint::ForeignKey(fk))
    }
}

impl From<CheckConstraint> for Constraint {
    fn from(check: CheckConstraint) -> Self {
        Self::Table(TableConstraint::Check(check))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_column_constraint_accessors() {
        let pk = ColumnConstraint::primary_key("users", "id");
        assert_eq!(pk.kind(), ConstraintKind::PrimaryKey);
        assert_eq!(pk.table_name(), "users");
        assert_eq!(pk.column_name(), "id");

        let moved = pk.with_table_name("people").with_column_name("person_id");
        assert_eq!(moved, ColumnConstraint::primary_key("people", "person_id"));
    }

    #[test]
    fn test_column_constraint_ordering() {
        let set: BTreeSet<ColumnConstraint> = [
            ColumnConstraint::unique("users", "email"),
            ColumnConstraint::primary_key("users", "age"),
            ColumnConstraint::not_null("users", "email"),
            ColumnConstraint::default_value("users", "age", "18"),
        ]
        .into_iter()
        .collect();

        let ordered: Vec<(&str, ConstraintKind)> =
            set.iter().map(|c| (c.column_name(), c.kind())).collect();
        assert_eq!(
            ordered,
            vec![
                ("age", ConstraintKind::Default),
                ("age", ConstraintKind::PrimaryKey),
                ("email", ConstraintKind::NotNull),
                ("email", ConstraintKind::Unique),
            ]
        );
    }

    #[test]
    fn test_ordering_tie_breaks_on_attributes() {
        let low = ColumnConstraint::default_value("users", "age", "1");
        let high = ColumnConstraint::default_value("users", "age", "2");
        assert!(low < high);
        assert_eq!(low.cmp(&low.clone()), Ordering::Equal);
    }

    #[test]
    fn test_foreign_key_keeps_mapping_order() {
        let fk = ForeignKeyConstraint::new(
            "admins",
            "users",
            [("user_id", "id"), ("address", "address"), ("group_id", "group")],
        )
        .unwrap();

        assert_eq!(
            fk.columns().collect::<Vec<_>>(),
            vec!["user_id", "address", "group_id"]
        );
        assert_eq!(
            fk.referenced_columns().collect::<Vec<_>>(),
            vec!["id", "address", "group"]
        );
        assert_eq!(fk.referenced_column_for("address"), Some("address"));
        assert!(fk.is_composite());
    }

    #[test]
    fn test_foreign_key_rejects_empty_mapping() {
        let result = ForeignKeyConstraint::new("posts", "users", Vec::<(&str, &str)>::new());
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_foreign_key_rejects_repeated_column() {
        let result =
            ForeignKeyConstraint::new("posts", "users", [("author", "id"), ("author", "name")]);
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }

    #[test]
    fn test_foreign_key_deserialization_validates() {
        let json = r#"{"table_name":"posts","referenced_table":"users","column_mapping":[]}"#;
        assert!(serde_json::from_str::<ForeignKeyConstraint>(json).is_err());

        let json =
            r#"{"table_name":"posts","referenced_table":"users","column_mapping":[["author","id"]]}"#;
        let fk: ForeignKeyConstraint = serde_json::from_str(json).unwrap();
        assert_eq!(fk.referenced_column_for("author"), Some("id"));
    }

    #[test]
    fn test_constraint_conversions() {
        let check: Constraint = CheckConstraint::new("users", "age > 18").into();
        assert_eq!(check.kind(), ConstraintKind::Check);
        assert_eq!(check.table_name(), "users");
        assert!(!check.kind().is_column_wide());

        let nn: Constraint = ColumnConstraint::not_null("users", "name").into();
        assert!(nn.kind().is_column_wide());
    }
}
