//! Migration framework for the score-card database

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

pub mod manager;

pub use manager::MigrationManager;

/// Represents a single migration with up and down SQL
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub down_sql: String,
}

/// Migration status in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// Direction for migration operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Load all available migrations from the embedded files
/// Migrations are auto-discovered from files/ directory using include_dir!
pub fn load_migrations() -> Result<BTreeMap<i64, Migration>> {
    use include_dir::{Dir, include_dir};

    static MIGRATIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/store/migrations/files");

    let mut migrations = BTreeMap::new();

    // Each migration lives in its own directory, named NNN_name
    for entry in MIGRATIONS_DIR.dirs() {
        let name_only = entry
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .context("Invalid migration directory name")?;

        let parts: Vec<&str> = name_only.splitn(2, '_').collect();
        if parts.len() != 2 {
            anyhow::bail!(
                "Invalid migration directory format: {}. Expected format: NNN_name",
                name_only
            );
        }

        let version: i64 = parts[0]
            .parse()
            .with_context(|| format!("Invalid migration version in directory: {}", name_only))?;
        let name = parts[1].to_string();

        // Files are stored with full paths like "001_initial/up.sql"
        let up_path = format!("{}/up.sql", name_only);
        let down_path = format!("{}/down.sql", name_only);

        let up_sql = MIGRATIONS_DIR
            .get_file(&up_path)
            .with_context(|| format!("Missing up.sql in migration {}", name_only))?
            .contents_utf8()
            .with_context(|| format!("up.sql is not valid UTF-8 in migration {}", name_only))?
            .to_string();

        let down_sql = MIGRATIONS_DIR
            .get_file(&down_path)
            .with_context(|| format!("Missing down.sql in migration {}", name_only))?
            .contents_utf8()
            .with_context(|| format!("down.sql is not valid UTF-8 in migration {}", name_only))?
            .to_string();

        migrations.insert(
            version,
            Migration {
                version,
                name,
                up_sql,
                down_sql,
            },
        );
    }

    if migrations.is_empty() {
        anyhow::bail!("No migrations found in files directory");
    }

    Ok(migrations)
}

/// Initialize the migration tracking table
pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

/// Get list of applied migrations
pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    let migrations = sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")?;

    Ok(migrations)
}

/// Calculate checksum for migration SQL
/// Normalizes line endings to LF before hashing so Windows and Unix agree
pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let normalized = sql.replace("\r\n", "\n").replace('\r', "\n");

    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Validate that applied migrations match available ones
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations()?;
    let applied = get_applied_migrations(pool).await?;

    for applied_migration in applied {
        if let Some(available_migration) = available.get(&applied_migration.version) {
            let expected_checksum = calculate_checksum(&available_migration.up_sql);

            if applied_migration.checksum != expected_checksum {
                anyhow::bail!(
                    "Migration {} checksum mismatch! Applied: {}, Expected: {}. \
                    This indicates the migration file has been modified after being applied.",
                    applied_migration.version,
                    applied_migration.checksum,
                    expected_checksum
                );
            }
        } else {
            anyhow::bail!(
                "Applied migration {} '{}' not found in available migrations",
                applied_migration.version,
                applied_migration.name
            );
        }
    }

    Ok(())
}

/// Get pending migrations (available but not applied)
pub async fn get_pending_migrations(pool: &SqlitePool) -> Result<Vec<Migration>> {
    let available = load_migrations()?;
    let applied = get_applied_migrations(pool).await?;

    let applied_versions: std::collections::HashSet<i64> =
        applied.into_iter().map(|m| m.version).collect();

    let mut pending = Vec::new();
    for (version, migration) in available {
        if !applied_versions.contains(&version) {
            pending.push(migration);
        }
    }

    Ok(pending)
}

/// Get the current schema version (highest applied migration)
pub async fn get_current_version(pool: &SqlitePool) -> Result<Option<i64>> {
    // MAX() over an empty table yields one row holding NULL
    let version: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT MAX(version) FROM schema_migrations")
            .fetch_optional(pool)
            .await
            .context("Failed to get current schema version")?;

    Ok(version.and_then(|(v,)| v))
}
