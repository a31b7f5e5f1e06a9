//! Migration plans.
//!
//! A [`MigrationPlan`] ties the diff engine and a converter together: it
//! holds the operations that reconcile a database with a declared schema and
//! the SQL statements rendering them, ready to be reviewed, stored as JSON or
//! handed to an executor.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DatabaseProvider, ReconcileConfig};
use crate::error::Result;
use crate::operations::{ColumnOperation, Operation};
use crate::schema::Table;
use crate::state::StateManager;

/// Operations and SQL reconciling a database with a declared schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Human readable description.
    pub description: String,
    /// When the plan was built.
    pub created_at: DateTime<Utc>,
    /// Provider the statements were rendered for.
    pub provider: DatabaseProvider,
    /// Operations in application order.
    pub operations: Vec<Operation>,
    /// One SQL statement per operation, in the same order.
    pub statements: Vec<String>,
}

impl MigrationPlan {
    /// Diffs `db_tables` against `schema_tables` and renders the result.
    ///
    /// A column that changed shows up in the diff as an addition followed by
    /// a deletion under the same name. The plan drops the old column right
    /// before adding the new one, so the statements run in order.
    ///
    /// Fails on the first operation the configured converter cannot render.
    pub fn build(
        config: &ReconcileConfig,
        description: impl Into<String>,
        db_tables: &[Table],
        schema_tables: &[Table],
    ) -> Result<Self> {
        let operations =
            execution_order(StateManager::new(db_tables, schema_tables)?.into_operations());
        let converter = config.converter();
        let statements = operations
            .iter()
            .map(|op| converter.convert_operation_to_sql(op))
            .collect::<Result<Vec<_>>>()?;

        let plan = Self {
            description: description.into(),
            created_at: Utc::now(),
            provider: config.provider,
            operations,
            statements,
        };
        info!(
            description = %plan.description,
            provider = %plan.provider,
            statements = plan.statements.len(),
            "Built migration plan"
        );
        Ok(plan)
    }

    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns true if every operation can be reversed.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.operations.iter().all(Operation::is_reversible)
    }

    /// Renders the statements undoing this plan: the reverse of each
    /// operation, last operation first.
    ///
    /// Fails on the first irreversible operation.
    pub fn reverse_statements(&self, config: &ReconcileConfig) -> Result<Vec<String>> {
        let converter = config.converter();
        self.operations
            .iter()
            .rev()
            .map(|op| converter.convert_operation_to_sql(&op.reverse()?))
            .collect()
    }

    /// Serializes the plan as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn column_key(op: &ColumnOperation) -> (String, String) {
    (op.table().name().to_string(), op.column().name().to_string())
}

/// Moves each column deletion ahead of the addition of a column with the
/// same name in the same table. Everything else keeps its place.
fn execution_order(operations: Vec<Operation>) -> Vec<Operation> {
    let added: HashSet<(String, String)> = operations
        .iter()
        .filter_map(|op| match op {
            Operation::Column(op @ ColumnOperation::Add(_)) => Some(column_key(op)),
            _ => None,
        })
        .collect();

    let mut replaced: HashMap<(String, String), Operation> = HashMap::new();
    let mut remaining = Vec::with_capacity(operations.len());
    for op in operations {
        match &op {
            Operation::Column(column_op @ ColumnOperation::Delete(_))
                if added.contains(&column_key(column_op)) =>
            {
                replaced.insert(column_key(column_op), op);
            }
            _ => remaining.push(op),
        }
    }

    let mut ordered = Vec::with_capacity(remaining.len() + replaced.len());
    for op in remaining {
        if let Operation::Column(column_op @ ColumnOperation::Add(_)) = &op {
            if let Some(delete) = replaced.remove(&column_key(column_op)) {
                debug!(operation = %delete, "Dropping column before re-adding it");
                ordered.push(delete);
            }
        }
        ordered.push(op);
    }
    ordered
}
