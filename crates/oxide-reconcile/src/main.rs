//! oxide-reconcile CLI
//!
//! Command-line tool for reconciling a database with a declared schema.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_reconcile::prelude::*;

/// Diff a declared schema against a database and render the SQL.
#[derive(Parser)]
#[command(name = "oxide-reconcile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structure of a SQLite database as JSON.
    Inspect {
        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// Show the SQL reconciling a database with a schema file.
    Plan {
        /// JSON file with the declared tables.
        #[arg(short, long)]
        schema: PathBuf,

        #[command(flatten)]
        source: Source,

        /// Target database provider.
        #[arg(short, long, value_enum, default_value_t = DatabaseProvider::Sqlite3)]
        provider: DatabaseProvider,

        #[command(flatten)]
        converter: ConverterArgs,

        /// Show rollback SQL instead of forward SQL.
        #[arg(short, long, conflicts_with = "json")]
        reverse: bool,

        /// Print the whole plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Reconcile a SQLite database with a schema file.
    Apply {
        /// JSON file with the declared tables.
        #[arg(short, long)]
        schema: PathBuf,

        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        #[command(flatten)]
        converter: ConverterArgs,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

/// Where the current structure comes from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Read the current structure from a live SQLite database.
    #[arg(short, long)]
    database: Option<String>,

    /// Read the current structure from a JSON snapshot.
    #[arg(short, long)]
    current: Option<PathBuf>,
}

#[derive(Args)]
struct ConverterArgs {
    /// How to render a column type change.
    #[arg(long, value_enum, default_value_t = TypeChangeStrategy::Unsupported)]
    type_change: TypeChangeStrategy,

    /// How to render a table rename.
    #[arg(long, value_enum, default_value_t = TableRenameStrategy::Recreate)]
    table_rename: TableRenameStrategy,
}

impl ConverterArgs {
    fn config(&self) -> ConverterConfig {
        ConverterConfig::default()
            .type_change(self.type_change)
            .table_rename(self.table_rename)
    }
}

async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?)
}

fn print_statements(statements: &[String]) {
    for sql in statements {
        println!("{}", sql);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Inspect { database } => {
            let pool = connect(&database).await?;
            let snapshot = oxide_reconcile::sqlite::introspect(&pool).await?;
            println!("{}", snapshot.to_json()?);
        }

        Commands::Plan {
            schema,
            source,
            provider,
            converter,
            reverse,
            json,
        } => {
            let declared = SchemaRegistry::load(provider, &schema)?;
            let current = match (source.database, source.current) {
                (Some(url), _) => {
                    if provider != DatabaseProvider::Sqlite3 {
                        warn!(%provider, "Inspecting a SQLite database for another provider");
                    }
                    oxide_reconcile::sqlite::introspect(&connect(&url).await?).await?
                }
                (None, Some(path)) => SnapshotInspector::load(&path)?,
                (None, None) => anyhow::bail!("Either --database or --current is required"),
            };

            let config = ReconcileConfig::new(provider).with_converter(converter.config());
            let plan = MigrationPlan::build(
                &config,
                format!("Reconcile with {}", schema.display()),
                &current.get_tables()?,
                declared.tables(),
            )?;

            if plan.is_empty() {
                info!("Database already matches the schema.");
            } else if json {
                println!("{}", plan.to_json()?);
            } else if reverse {
                print_statements(&plan.reverse_statements(&config)?);
            } else {
                print_statements(&plan.statements);
            }
        }

        Commands::Apply {
            schema,
            database,
            converter,
            dry_run,
        } => {
            let declared = SchemaRegistry::load(DatabaseProvider::Sqlite3, &schema)?;
            let executor = SqliteExecutor::new(connect(&database).await?);
            let current = executor.introspect().await?;

            let config =
                ReconcileConfig::new(DatabaseProvider::Sqlite3).with_converter(converter.config());
            let plan = MigrationPlan::build(
                &config,
                format!("Reconcile {} with {}", database, schema.display()),
                current.tables(),
                declared.tables(),
            )?;

            if plan.is_empty() {
                info!("Database already matches the schema.");
            } else if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                print_statements(&plan.statements);
            } else {
                let applied = executor.apply_plan(&plan).await?;
                info!("Applied {} statement(s).", applied);
            }
        }
    }

    Ok(())
}
