use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::fs;

pub const MIGRATIONS_DIR: &str = "migrations";

pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url)
        .await
        .context("failed to connect to the database")?;
    Ok(conn)
}

/// Applies every `*.sql` file under [`MIGRATIONS_DIR`] in filename order.
///
/// Files run on every start, so their DDL must be idempotent (`IF NOT EXISTS`).
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let files = migration_files(Path::new(MIGRATIONS_DIR)).await?;
    let backend = conn.get_database_backend();

    for file in &files {
        let sql = fs::read_to_string(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        let statements = split_statements(&sql);
        tracing::debug!(file = %file.display(), statements = statements.len(), "applying migration");

        // Postgres prepared statements cannot hold several commands.
        for statement in statements {
            conn.execute(Statement::from_string(backend, statement))
                .await
                .with_context(|| format!("executing {}", file.display()))?;
        }
    }

    tracing::info!(files = files.len(), "migrations applied");
    Ok(())
}

async fn migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("reading {}", dir.display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Splits a script on `;`, dropping `--` comment lines and empty statements.
fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}
