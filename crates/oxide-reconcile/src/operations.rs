//! Schema operations.
//!
//! Operations are the output of the diff engine and the input of the SQL
//! converters. Each one knows its [`OperationType`], whether it can be
//! reversed, and how to build its inverse.
//!
//! Reversal is structural and, wherever the inverse is itself reversible,
//! involutive: `op.reverse()?.reverse()? == op`. Creating a table or adding a
//! column reverses into a deletion, and deletions cannot be reversed because
//! the data they drop is gone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::{CheckConstraint, Constraint, ForeignKeyConstraint};
use crate::error::{ReconcileError, Result};
use crate::schema::{Column, DataType, Table};

/// Broad category of an operation, used by converters to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Create a table or add a column.
    Create,
    /// Delete a table or a column.
    Delete,
    /// Rename a table or a column.
    Rename,
    /// Change a column's data type.
    DtypeChange,
    /// Add or delete a constraint.
    ConstraintChange,
}

impl OperationType {
    /// Returns the upper-case name of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::Rename => "RENAME",
            Self::DtypeChange => "DTYPE_CHANGE",
            Self::ConstraintChange => "CONSTRAINT_CHANGE",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn irreversible(op: &impl fmt::Display) -> ReconcileError {
    ReconcileError::IrreversibleOperation(op.to_string())
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Create a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableOperation {
    /// Table to create.
    pub table: Table,
}

/// Delete a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTableOperation {
    /// Table to delete.
    pub table: Table,
}

/// Rename a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOperation {
    /// Table under its current name.
    pub table: Table,
    /// Name after the rename.
    pub new_name: String,
}

/// Add a column to an existing table.
///
/// An optional single-column foreign key and an optional check constraint
/// ride along with the column, since most dialects cannot add them later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAddColumn")]
pub struct AddColumnOperation {
    table: Table,
    column: Column,
    related_foreign_key: Option<ForeignKeyConstraint>,
    related_check_constraint: Option<CheckConstraint>,
}

#[derive(Deserialize)]
struct RawAddColumn {
    table: Table,
    column: Column,
    #[serde(default)]
    related_foreign_key: Option<ForeignKeyConstraint>,
    #[serde(default)]
    related_check_constraint: Option<CheckConstraint>,
}

impl TryFrom<RawAddColumn> for AddColumnOperation {
    type Error = ReconcileError;

    fn try_from(raw: RawAddColumn) -> Result<Self> {
        let mut op = Self::new(raw.table, raw.column);
        if let Some(fk) = raw.related_foreign_key {
            op = op.related_foreign_key(fk)?;
        }
        if let Some(check) = raw.related_check_constraint {
            op = op.related_check_constraint(check)?;
        }
        Ok(op)
    }
}

impl AddColumnOperation {
    /// Creates the operation without related constraints.
    #[must_use]
    pub fn new(table: Table, column: Column) -> Self {
        Self {
            table,
            column,
            related_foreign_key: None,
            related_check_constraint: None,
        }
    }

    /// Attaches a foreign key on the new column.
    ///
    /// The key must belong to this table, map exactly the new column, and
    /// reference another table.
    pub fn related_foreign_key(mut self, fk: ForeignKeyConstraint) -> Result<Self> {
        if fk.is_composite() {
            return Err(ReconcileError::validation(format!(
                "Composite foreign key cannot be added with column '{}'",
                self.column.name()
            )));
        }
        if fk.columns().next() != Some(self.column.name()) {
            return Err(ReconcileError::validation(format!(
                "Foreign key must reference column '{}', got '{}'",
                self.column.name(),
                join_names(fk.columns())
            )));
        }
        if fk.table_name() != self.table.name() {
            return Err(ReconcileError::validation(format!(
                "Foreign key belongs to table '{}', not '{}'",
                fk.table_name(),
                self.table.name()
            )));
        }
        if fk.referenced_table() == self.table.name() {
            return Err(ReconcileError::validation(format!(
                "Foreign key on new column '{}' must reference a table other than '{}'",
                self.column.name(),
                self.table.name()
            )));
        }
        self.related_foreign_key = Some(fk);
        Ok(self)
    }

    /// Attaches a check constraint to render with the new column.
    pub fn related_check_constraint(mut self, check: CheckConstraint) -> Result<Self> {
        if check.table_name != self.table.name() {
            return Err(ReconcileError::validation(format!(
                "Check constraint belongs to table '{}', not '{}'",
                check.table_name,
                self.table.name()
            )));
        }
        self.related_check_constraint = Some(check);
        Ok(self)
    }

    /// Returns the table receiving the column.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the column to add.
    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the foreign key added with the column.
    #[must_use]
    pub fn foreign_key(&self) -> Option<&ForeignKeyConstraint> {
        self.related_foreign_key.as_ref()
    }

    /// Returns the check constraint added with the column.
    #[must_use]
    pub fn check_constraint(&self) -> Option<&CheckConstraint> {
        self.related_check_constraint.as_ref()
    }
}

/// Delete a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteColumnOperation {
    /// Table owning the column.
    pub table: Table,
    /// Column to delete.
    pub column: Column,
}

/// Rename a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOperation {
    /// Table owning the column.
    pub table: Table,
    /// Column under its current name.
    pub column: Column,
    /// Name after the rename.
    pub new_name: String,
}

/// Change a column's data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDataTypeOperation {
    /// Table owning the column.
    pub table: Table,
    /// Column with its current data type.
    pub column: Column,
    /// Data type after the change.
    pub new_dtype: DataType,
}

/// Add a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddConstraintOperation {
    /// Table receiving the constraint.
    pub table: Table,
    /// Column the constraint is about.
    pub column: Column,
    /// Constraint to add.
    pub constraint: Constraint,
}

/// Delete a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConstraintOperation {
    /// Table owning the constraint.
    pub table: Table,
    /// Column the constraint is about.
    pub column: Column,
    /// Constraint to delete.
    pub constraint: Constraint,
}

/// Operations on whole tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum TableOperation {
    /// `CREATE TABLE`.
    Create(CreateTableOperation),
    /// `DROP TABLE`.
    Delete(DeleteTableOperation),
    /// Table rename.
    Rename(RenameTableOperation),
}

impl TableOperation {
    /// Returns the operation type.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Create(_) => OperationType::Create,
            Self::Delete(_) => OperationType::Delete,
            Self::Rename(_) => OperationType::Rename,
        }
    }

    /// Returns true if [`reverse`](Self::reverse) succeeds.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Delete(_))
    }

    /// Builds the inverse operation.
    pub fn reverse(&self) -> Result<Self> {
        match self {
            Self::Create(op) => Ok(Self::Delete(DeleteTableOperation {
                table: op.table.clone(),
            })),
            Self::Delete(_) => Err(irreversible(self)),
            Self::Rename(op) => Ok(Self::Rename(RenameTableOperation {
                table: op.table.renamed(&op.new_name),
                new_name: op.table.name().to_string(),
            })),
        }
    }

    /// Returns the table the operation starts from.
    #[must_use]
    pub fn table(&self) -> &Table {
        match self {
            Self::Create(op) => &op.table,
            Self::Delete(op) => &op.table,
            Self::Rename(op) => &op.table,
        }
    }
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(op) => write!(
                f,
                "Create Table {} with columns: {}",
                op.table.name(),
                join_names(op.table.column_names())
            ),
            Self::Delete(op) => write!(f, "Delete Table {}", op.table.name()),
            Self::Rename(op) => {
                write!(f, "Rename Table {} to {}", op.table.name(), op.new_name)
            }
        }
    }
}

/// Operations on the columns of an existing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ColumnOperation {
    /// `ADD COLUMN`.
    Add(AddColumnOperation),
    /// `DROP COLUMN`.
    Delete(DeleteColumnOperation),
    /// `RENAME COLUMN`.
    Rename(RenameColumnOperation),
    /// Data type change.
    ChangeDataType(ChangeDataTypeOperation),
    /// Constraint addition.
    AddConstraint(AddConstraintOperation),
    /// Constraint removal.
    DeleteConstraint(DeleteConstraintOperation),
}

impl ColumnOperation {
    /// Returns the operation type.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Add(_) => OperationType::Create,
            Self::Delete(_) => OperationType::Delete,
            Self::Rename(_) => OperationType::Rename,
            Self::ChangeDataType(_) => OperationType::DtypeChange,
            Self::AddConstraint(_) | Self::DeleteConstraint(_) => OperationType::ConstraintChange,
        }
    }

    /// Returns true if [`reverse`](Self::reverse) succeeds.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Delete(_))
    }

    /// Builds the inverse operation.
    pub fn reverse(&self) -> Result<Self> {
        match self {
            Self::Add(op) => Ok(Self::Delete(DeleteColumnOperation {
                table: op.table.clone(),
                column: op.column.clone(),
            })),
            Self::Delete(_) => Err(irreversible(self)),
            Self::Rename(op) => Ok(Self::Rename(RenameColumnOperation {
                table: op.table.clone(),
                column: op.column.renamed(&op.new_name),
                new_name: op.column.name().to_string(),
            })),
            Self::ChangeDataType(op) => Ok(Self::ChangeDataType(ChangeDataTypeOperation {
                table: op.table.clone(),
                column: op.column.with_data_type(op.new_dtype.clone()),
                new_dtype: op.column.data_type().clone(),
            })),
            Self::AddConstraint(op) => Ok(Self::DeleteConstraint(DeleteConstraintOperation {
                table: op.table.clone(),
                column: op.column.clone(),
                constraint: op.constraint.clone(),
            })),
            Self::DeleteConstraint(op) => Ok(Self::AddConstraint(AddConstraintOperation {
                table: op.table.clone(),
                column: op.column.clone(),
                constraint: op.constraint.clone(),
            })),
        }
    }

    /// Returns the table owning the column.
    #[must_use]
    pub fn table(&self) -> &Table {
        match self {
            Self::Add(op) => op.table(),
            Self::Delete(op) => &op.table,
            Self::Rename(op) => &op.table,
            Self::ChangeDataType(op) => &op.table,
            Self::AddConstraint(op) => &op.table,
            Self::DeleteConstraint(op) => &op.table,
        }
    }

    /// Returns the column the operation is about.
    #[must_use]
    pub fn column(&self) -> &Column {
        match self {
            Self::Add(op) => op.column(),
            Self::Delete(op) => &op.column,
            Self::Rename(op) => &op.column,
            Self::ChangeDataType(op) => &op.column,
            Self::AddConstraint(op) => &op.column,
            Self::DeleteConstraint(op) => &op.column,
        }
    }
}

impl fmt::Display for ColumnOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table().name();
        match self {
            Self::Add(op) => write!(f, "Add Column {} to {}", op.column().name(), table),
            Self::Delete(op) => write!(f, "Delete Column {} from {}", op.column.name(), table),
            Self::Rename(op) => write!(
                f,
                "Rename Column {} to {} in {}",
                op.column.name(),
                op.new_name,
                table
            ),
            Self::ChangeDataType(op) => write!(
                f,
                "Change data type of {}.{} from {} to {}",
                table,
                op.column.name(),
                op.column.data_type(),
                op.new_dtype
            ),
            Self::AddConstraint(op) => write!(
                f,
                "Add {} constraint on {}.{}",
                op.constraint.kind(),
                table,
                op.column.name()
            ),
            Self::DeleteConstraint(op) => write!(
                f,
                "Delete {} constraint on {}.{}",
                op.constraint.kind(),
                table,
                op.column.name()
            ),
        }
    }
}

/// Any schema operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Operation {
    /// Operation on a whole table.
    Table(TableOperation),
    /// Operation on a column.
    Column(ColumnOperation),
}

impl Operation {
    /// Creates a table.
    #[must_use]
    pub fn create_table(table: Table) -> Self {
        CreateTableOperation { table }.into()
    }

    /// Deletes a table.
    #[must_use]
    pub fn delete_table(table: Table) -> Self {
        DeleteTableOperation { table }.into()
    }

    /// Renames a table.
    #[must_use]
    pub fn rename_table(table: Table, new_name: impl Into<String>) -> Self {
        RenameTableOperation {
            table,
            new_name: new_name.into(),
        }
        .into()
    }

    /// Adds a column without related constraints.
    #[must_use]
    pub fn add_column(table: Table, column: Column) -> Self {
        AddColumnOperation::new(table, column).into()
    }

    /// Deletes a column.
    #[must_use]
    pub fn delete_column(table: Table, column: Column) -> Self {
        DeleteColumnOperation { table, column }.into()
    }

    /// Renames a column.
    #[must_use]
    pub fn rename_column(table: Table, column: Column, new_name: impl Into<String>) -> Self {
        RenameColumnOperation {
            table,
            column,
            new_name: new_name.into(),
        }
        .into()
    }

    /// Changes a column's data type.
    #[must_use]
    pub fn change_data_type(table: Table, column: Column, new_dtype: impl Into<DataType>) -> Self {
        ChangeDataTypeOperation {
            table,
            column,
            new_dtype: new_dtype.into(),
        }
        .into()
    }

    /// Adds a constraint.
    #[must_use]
    pub fn add_constraint(table: Table, column: Column, constraint: impl Into<Constraint>) -> Self {
        AddConstraintOperation {
            table,
            column,
            constraint: constraint.into(),
        }
        .into()
    }

    /// Deletes a constraint.
    #[must_use]
    pub fn delete_constraint(
        table: Table,
        column: Column,
        constraint: impl Into<Constraint>,
    ) -> Self {
        DeleteConstraintOperation {
            table,
            column,
            constraint: constraint.into(),
        }
        .into()
    }

    /// Returns the operation type.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Table(op) => op.operation_type(),
            Self::Column(op) => op.operation_type(),
        }
    }

    /// Returns true if [`reverse`](Self::reverse) succeeds.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        match self {
            Self::Table(op) => op.is_reversible(),
            Self::Column(op) => op.is_reversible(),
        }
    }

    /// Builds the inverse operation.
    ///
    /// Fails with [`ReconcileError::IrreversibleOperation`] for deletions.
    pub fn reverse(&self) -> Result<Self> {
        match self {
            Self::Table(op) => op.reverse().map(Self::Table),
            Self::Column(op) => op.reverse().map(Self::Column),
        }
    }

    /// Returns the table the operation acts on.
    #[must_use]
    pub fn table(&self) -> &Table {
        match self {
            Self::Table(op) => op.table(),
            Self::Column(op) => op.table(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(op) => fmt::Display::fmt(op, f),
            Self::Column(op) => fmt::Display::fmt(op, f),
        }
    }
}

impl From<TableOperation> for Operation {
    fn from(op: TableOperation) -> Self {
        Self::Table(op)
    }
}

impl From<ColumnOperation> for Operation {
    fn from(op: ColumnOperation) -> Self {
        Self::Column(op)
    }
}

macro_rules! impl_into_operation {
    ($($ty:ty => $outer:ident :: $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for $outer {
                fn from(op: $ty) -> Self {
                    Self::$variant(op)
                }
            }

            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    $outer::$variant(op).into()
                }
            }
        )*
    };
}

impl_into_operation! {
    CreateTableOperation => TableOperation::Create,
    DeleteTableOperation => TableOperation::Delete,
    RenameTableOperation => TableOperation::Rename,
    AddColumnOperation => ColumnOperation::Add,
    DeleteColumnOperation => ColumnOperation::Delete,
    RenameColumnOperation => ColumnOperation::Rename,
    ChangeDataTypeOperation => ColumnOperation::ChangeDataType,
    AddConstraintOperation => ColumnOperation::AddConstraint,
    DeleteConstraintOperation => ColumnOperation::DeleteConstraint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ColumnConstraint;
    use crate::schema::{ColumnDef, TableBuilder};

    fn users() -> Table {
        TableBuilder::new("users")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("name", "TEXT"))
            .build()
            .unwrap()
    }

    fn email() -> Column {
        Column::with_constraints("email", "TEXT", [ColumnConstraint::unique("users", "email")])
            .unwrap()
    }

    fn assert_involution(op: Operation) {
        let back = op.reverse().unwrap().reverse().unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_create_table_reverse() {
        let op = Operation::create_table(users());
        assert!(op.is_reversible());
        assert_eq!(op.operation_type(), OperationType::Create);

        match op.reverse().unwrap() {
            Operation::Table(TableOperation::Delete(delete)) => {
                assert_eq!(delete.table, users());
            }
            _ => panic!("Expected DeleteTable"),
        }
    }

    #[test]
    fn test_deletes_are_irreversible() {
        let drop_table = Operation::delete_table(users());
        let drop_column = Operation::delete_column(users(), Column::new("name", "TEXT"));

        for op in [drop_table, drop_column] {
            assert!(!op.is_reversible());
            assert!(matches!(
                op.reverse(),
                Err(ReconcileError::IrreversibleOperation(_))
            ));
        }
    }

    #[test]
    fn test_rename_table_reverse() {
        let op = Operation::rename_table(users(), "people");
        match op.reverse().unwrap() {
            Operation::Table(TableOperation::Rename(rename)) => {
                assert_eq!(rename.table.name(), "people");
                assert_eq!(rename.new_name, "users");
                assert!(rename
                    .table
                    .columns()
                    .iter()
                    .flat_map(Column::constraints)
                    .all(|c| c.table_name() == "people"));
            }
            _ => panic!("Expected RenameTable"),
        }
        assert_involution(op);
    }

    #[test]
    fn test_add_column_reverse() {
        let op = Operation::add_column(users(), email());
        match op.reverse().unwrap() {
            Operation::Column(ColumnOperation::Delete(delete)) => {
                assert_eq!(delete.column, email());
                assert_eq!(delete.table.name(), "users");
            }
            _ => panic!("Expected DeleteColumn"),
        }
    }

    #[test]
    fn test_column_reversals_are_involutions() {
        assert_involution(Operation::rename_column(users(), email(), "mail"));
        assert_involution(Operation::change_data_type(
            users(),
            Column::new("name", "TEXT"),
            "BLOB",
        ));
        assert_involution(Operation::add_constraint(
            users(),
            email(),
            ColumnConstraint::not_null("users", "email"),
        ));
        assert_involution(Operation::delete_constraint(
            users(),
            email(),
            ColumnConstraint::unique("users", "email"),
        ));
    }

    #[test]
    fn test_change_data_type_reverse_restores_type() {
        let op = Operation::change_data_type(users(), Column::new("name", "TEXT"), "blob");
        match op.reverse().unwrap() {
            Operation::Column(ColumnOperation::ChangeDataType(change)) => {
                assert_eq!(change.column.data_type().as_str(), "BLOB");
                assert_eq!(change.new_dtype.as_str(), "TEXT");
            }
            _ => panic!("Expected ChangeDataType"),
        }
    }

    #[test]
    fn test_constraint_operations_swap() {
        let op = Operation::add_constraint(
            users(),
            email(),
            ColumnConstraint::not_null("users", "email"),
        );
        assert_eq!(op.operation_type(), OperationType::ConstraintChange);
        assert!(matches!(
            op.reverse().unwrap(),
            Operation::Column(ColumnOperation::DeleteConstraint(_))
        ));
    }

    #[test]
    fn test_related_foreign_key_validation() {
        let column = Column::new("user_id", "INTEGER");
        let posts = Table::new("posts", vec![Column::new("id", "INTEGER")], Vec::new()).unwrap();

        let ok = ForeignKeyConstraint::new("posts", "users", [("user_id", "id")]).unwrap();
        assert!(AddColumnOperation::new(posts.clone(), column.clone())
            .related_foreign_key(ok)
            .is_ok());

        let composite = ForeignKeyConstraint::new(
            "posts",
            "users",
            [("user_id", "id"), ("id", "other")],
        )
        .unwrap();
        let wrong_column = ForeignKeyConstraint::new("posts", "users", [("id", "id")]).unwrap();
        let wrong_table = ForeignKeyConstraint::new("comments", "users", [("user_id", "id")]).unwrap();
        let self_reference = ForeignKeyConstraint::new("posts", "posts", [("user_id", "id")]).unwrap();

        for fk in [composite, wrong_column, wrong_table, self_reference] {
            let result = AddColumnOperation::new(posts.clone(), column.clone()).related_foreign_key(fk);
            assert!(matches!(result, Err(ReconcileError::Validation(_))));
        }
    }

    #[test]
    fn test_related_check_validation() {
        let op = AddColumnOperation::new(users(), Column::new("age", "INTEGER"));
        assert!(op
            .clone()
            .related_check_constraint(CheckConstraint::new("people", "age > 18"))
            .is_err());
        let op = op
            .related_check_constraint(CheckConstraint::new("users", "age > 18"))
            .unwrap();
        assert_eq!(op.check_constraint().unwrap().condition, "age > 18");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Operation::create_table(users()).to_string(),
            "Create Table users with columns: id, name"
        );
        assert_eq!(
            Operation::rename_table(users(), "people").to_string(),
            "Rename Table users to people"
        );
        assert_eq!(
            Operation::delete_column(users(), Column::new("name", "TEXT")).to_string(),
            "Delete Column name from users"
        );
    }

    #[test]
    fn test_operation_json() {
        let fk = ForeignKeyConstraint::new("users", "groups", [("group_id", "id")]).unwrap();
        let add = AddColumnOperation::new(users(), Column::new("group_id", "INTEGER"))
            .related_foreign_key(fk)
            .unwrap();
        let ops = vec![Operation::create_table(users()), add.into()];

        let json = serde_json::to_string(&ops).unwrap();
        let parsed: Vec<Operation> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ops);
    }
}
