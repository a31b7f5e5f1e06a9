//! Schema diff engine.
//!
//! [`StateManager`] compares the tables found in a live database with the
//! declared tables and produces the ordered operations that turn the former
//! into the latter. The comparison runs in four phases:
//!
//! 1. tables missing from the declaration are renamed (when a declared,
//!    not yet existing table has exactly the same column names) or deleted;
//! 2. declared tables missing from the database are created;
//! 3. columns declared on existing tables but absent from the database are
//!    added;
//! 4. database columns absent from the declaration are deleted.
//!
//! A table handled by phase 1 or 2 is "serviced" and skipped by later phases.
//! Within a phase, operations follow the order of the input lists.
//!
//! Column renames and type changes are not detected: a changed column shows
//! up as an addition plus a deletion. A table that is renamed and altered at
//! once shows up as a deletion plus a creation. An added column carries its
//! declared single-column foreign key, but a composite or self-referencing
//! key declared on it is not added (a warning is logged).

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{ReconcileError, Result};
use crate::operations::{AddColumnOperation, Operation};
use crate::schema::{Column, Table};

/// Computes the operations reconciling a database with a declared schema.
#[derive(Debug, Clone)]
pub struct StateManager {
    operations: Vec<Operation>,
}

impl StateManager {
    /// Diffs `db_tables` (live structure) against `schema_tables` (target).
    ///
    /// Fails with [`ReconcileError::Validation`] if a table name appears
    /// twice in either list.
    pub fn new(db_tables: &[Table], schema_tables: &[Table]) -> Result<Self> {
        ensure_unique_names("database", db_tables)?;
        ensure_unique_names("schema", schema_tables)?;

        let mut diff = Diff::new(db_tables, schema_tables);
        diff.delete_or_rename_tables();
        diff.create_tables();
        diff.add_columns()?;
        diff.delete_columns();

        let operations = diff.operations;
        info!(
            db_tables = db_tables.len(),
            schema_tables = schema_tables.len(),
            operations = operations.len(),
            "Computed schema diff"
        );
        Ok(Self { operations })
    }

    /// Returns the operations in application order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Consumes the manager, yielding the operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Returns true if the database already matches the schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn ensure_unique_names(side: &str, tables: &[Table]) -> Result<()> {
    let mut seen = HashSet::new();
    for table in tables {
        if !seen.insert(table.name()) {
            return Err(ReconcileError::validation(format!(
                "Duplicate table '{}' in {} tables",
                table.name(),
                side
            )));
        }
    }
    Ok(())
}

struct Diff<'a> {
    db_tables: &'a [Table],
    schema_tables: &'a [Table],
    db_names: HashSet<&'a str>,
    schema_names: HashSet<&'a str>,
    serviced_db: HashSet<&'a str>,
    serviced_schema: HashSet<&'a str>,
    operations: Vec<Operation>,
}

impl<'a> Diff<'a> {
    fn new(db_tables: &'a [Table], schema_tables: &'a [Table]) -> Self {
        Self {
            db_tables,
            schema_tables,
            db_names: db_tables.iter().map(Table::name).collect(),
            schema_names: schema_tables.iter().map(Table::name).collect(),
            serviced_db: HashSet::new(),
            serviced_schema: HashSet::new(),
            operations: Vec::new(),
        }
    }

    fn push(&mut self, op: Operation) {
        debug!(operation = %op, "Detected operation");
        self.operations.push(op);
    }

    fn delete_or_rename_tables(&mut self) {
        for db_table in self.db_tables {
            if self.schema_names.contains(db_table.name()) {
                continue;
            }
            let columns = db_table.column_name_set();
            let target = self.schema_tables.iter().find(|s| {
                !self.db_names.contains(s.name())
                    && !self.serviced_schema.contains(s.name())
                    && s.column_name_set() == columns
            });

            match target {
                Some(target) => {
                    self.serviced_schema.insert(target.name());
                    self.push(Operation::rename_table(db_table.clone(), target.name()));
                }
                None => self.push(Operation::delete_table(db_table.clone())),
            }
            self.serviced_db.insert(db_table.name());
        }
    }

    fn create_tables(&mut self) {
        for schema_table in self.schema_tables {
            if self.db_names.contains(schema_table.name())
                || self.serviced_schema.contains(schema_table.name())
            {
                continue;
            }
            self.serviced_schema.insert(schema_table.name());
            self.push(Operation::create_table(schema_table.clone()));
        }
    }

    fn add_columns(&mut self) -> Result<()> {
        for schema_table in self.schema_tables {
            if self.serviced_schema.contains(schema_table.name()) {
                continue;
            }
            let Some(db_table) = self.find_db_table(schema_table.name()) else {
                continue;
            };
            for column in schema_table.columns() {
                if !db_table.contains_column(column) {
                    let op = added_column(db_table, schema_table, column)?;
                    self.push(op);
                }
            }
        }
        Ok(())
    }

    fn delete_columns(&mut self) {
        for db_table in self.db_tables {
            if self.serviced_db.contains(db_table.name()) {
                continue;
            }
            let Some(schema_table) = self
                .schema_tables
                .iter()
                .find(|s| s.name() == db_table.name())
            else {
                continue;
            };
            for column in db_table.columns() {
                if !schema_table.contains_column(column) {
                    self.push(Operation::delete_column(db_table.clone(), column.clone()));
                }
            }
        }
    }

    fn find_db_table(&self, name: &str) -> Option<&'a Table> {
        self.db_tables.iter().find(|t| t.name() == name)
    }
}

/// Builds the addition of `column`, carrying the declared single-column
/// foreign key on it when there is one.
///
/// Composite and self-referencing keys cannot be attached to an added column;
/// they are left out with a warning.
fn added_column(db_table: &Table, schema_table: &Table, column: &Column) -> Result<Operation> {
    let mut op = AddColumnOperation::new(db_table.clone(), column.clone());
    for fk in schema_table
        .foreign_keys()
        .filter(|fk| fk.columns().any(|c| c == column.name()))
    {
        if fk.is_composite() || fk.referenced_table() == schema_table.name() {
            warn!(
                table = schema_table.name(),
                column = column.name(),
                referenced_table = fk.referenced_table(),
                "Foreign key cannot be added with the column and is left out"
            );
        } else if op.foreign_key().is_none() {
            op = op.related_foreign_key(fk.clone())?;
        }
    }
    Ok(op.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{ColumnOperation, TableOperation};
    use crate::schema::{ColumnDef, TableBuilder};

    fn user() -> Table {
        TableBuilder::new("User")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("name", "TEXT"))
            .build()
            .unwrap()
    }

    fn post() -> Table {
        TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .build()
            .unwrap()
    }

    fn comment() -> Table {
        TableBuilder::new("Comment")
            .column(ColumnDef::new("comment_id", "INTEGER").primary_key())
            .column(ColumnDef::new("content", "TEXT"))
            .build()
            .unwrap()
    }

    fn diff(db: &[Table], schema: &[Table]) -> Vec<Operation> {
        StateManager::new(db, schema).unwrap().into_operations()
    }

    #[test]
    fn test_identical_schemas_produce_nothing() {
        let tables = vec![user(), post()];
        assert!(StateManager::new(&tables, &tables).unwrap().is_empty());
    }

    #[test]
    fn test_rename_detected_by_column_names() {
        let ops = diff(&[user()], &[user().renamed("Person")]);
        assert_eq!(ops, vec![Operation::rename_table(user(), "Person")]);
    }

    #[test]
    fn test_create_table() {
        let ops = diff(&[user(), post()], &[user(), post(), comment()]);
        assert_eq!(ops, vec![Operation::create_table(comment())]);
    }

    #[test]
    fn test_delete_table() {
        let ops = diff(&[user(), post()], &[user()]);
        assert_eq!(ops, vec![Operation::delete_table(post())]);
    }

    #[test]
    fn test_renamed_and_altered_table_is_delete_plus_create() {
        let altered = TableBuilder::new("Person")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("full_name", "TEXT"))
            .build()
            .unwrap();
        let ops = diff(&[user()], &[altered.clone()]);
        assert_eq!(
            ops,
            vec![
                Operation::delete_table(user()),
                Operation::create_table(altered)
            ]
        );
    }

    #[test]
    fn test_rename_first_match_wins() {
        let ops = diff(&[user()], &[user().renamed("A"), user().renamed("B")]);
        assert_eq!(
            ops,
            vec![
                Operation::rename_table(user(), "A"),
                Operation::create_table(user().renamed("B")),
            ]
        );
    }

    #[test]
    fn test_rename_target_cannot_already_exist() {
        // "Post" exists in both lists, so "User" cannot be renamed onto it
        // even though the column names match.
        let same_columns_as_user = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("name", "TEXT"))
            .build()
            .unwrap();
        let ops = diff(&[user(), post()], &[same_columns_as_user.clone()]);

        assert_eq!(ops[0], Operation::delete_table(user()));
        assert!(ops[1..]
            .iter()
            .all(|op| matches!(op, Operation::Column(_))));
    }

    #[test]
    fn test_add_column() {
        let with_content = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .column(ColumnDef::new("post_content", "TEXT").not_null())
            .build()
            .unwrap();
        let ops = diff(&[post()], &[with_content.clone()]);

        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Operation::Column(ColumnOperation::Add(add)) => {
                assert_eq!(add.table(), &post());
                assert_eq!(add.column(), with_content.column("post_content").unwrap());
                assert!(add.foreign_key().is_none());
            }
            _ => panic!("Expected AddColumn"),
        }
    }

    #[test]
    fn test_delete_column() {
        let with_content = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .column(ColumnDef::new("post_content", "TEXT").not_null())
            .build()
            .unwrap();
        let ops = diff(&[with_content.clone()], &[post()]);

        assert_eq!(
            ops,
            vec![Operation::delete_column(
                with_content.clone(),
                with_content.column("post_content").unwrap().clone()
            )]
        );
    }

    #[test]
    fn test_changed_column_is_add_plus_delete() {
        let retyped = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "BLOB"))
            .build()
            .unwrap();
        let ops = diff(&[post()], &[retyped]);

        let types: Vec<_> = ops.iter().map(Operation::operation_type).collect();
        assert_eq!(
            types,
            vec![
                crate::operations::OperationType::Create,
                crate::operations::OperationType::Delete
            ]
        );
    }

    #[test]
    fn test_added_column_carries_foreign_key() {
        let with_author = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .column(ColumnDef::new("author_id", "INTEGER").references("User", "id"))
            .build()
            .unwrap();
        let ops = diff(&[user(), post()], &[user(), with_author]);

        match &ops[..] {
            [Operation::Column(ColumnOperation::Add(add))] => {
                let fk = add.foreign_key().unwrap();
                assert_eq!(fk.referenced_table(), "User");
                assert_eq!(fk.referenced_column_for("author_id"), Some("id"));
            }
            _ => panic!("Expected a single AddColumn"),
        }
    }

    #[test]
    fn test_added_column_skips_self_reference() {
        let nodes = TableBuilder::new("nodes")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .build()
            .unwrap();
        let with_parent = TableBuilder::new("nodes")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("parent_id", "INTEGER").references("nodes", "id"))
            .build()
            .unwrap();
        let ops = diff(&[nodes], &[with_parent]);

        match &ops[..] {
            [Operation::Column(ColumnOperation::Add(add))] => {
                assert_eq!(add.column().name(), "parent_id");
                assert!(add.foreign_key().is_none());
            }
            _ => panic!("Expected a single AddColumn"),
        }
    }

    #[test]
    fn test_added_column_skips_composite_key() {
        let with_owner = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .column(ColumnDef::new("owner_id", "INTEGER"))
            .foreign_key("User", [("owner_id", "id"), ("title", "name")])
            .build()
            .unwrap();
        let ops = diff(&[user(), post()], &[user(), with_owner]);

        match &ops[..] {
            [Operation::Column(ColumnOperation::Add(add))] => {
                assert_eq!(add.column().name(), "owner_id");
                assert!(add.foreign_key().is_none());
            }
            _ => panic!("Expected a single AddColumn"),
        }
    }

    #[test]
    fn test_table_operations_come_first() {
        let with_content = TableBuilder::new("Post")
            .column(ColumnDef::new("id", "INTEGER").primary_key())
            .column(ColumnDef::new("title", "TEXT"))
            .column(ColumnDef::new("post_content", "TEXT"))
            .build()
            .unwrap();
        let ops = diff(&[post(), user()], &[with_content, comment()]);

        assert!(matches!(
            ops[0],
            Operation::Table(TableOperation::Delete(_))
        ));
        assert!(matches!(
            ops[1],
            Operation::Table(TableOperation::Create(_))
        ));
        assert!(matches!(ops[2], Operation::Column(ColumnOperation::Add(_))));
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = StateManager::new(&[user(), user()], &[]);
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
        let result = StateManager::new(&[], &[post(), post()]);
        assert!(matches!(result, Err(ReconcileError::Validation(_))));
    }
}
