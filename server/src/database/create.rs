use sqlx::SqlitePool;
use tracing::info;

/// Current schema version, stored in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Initialize the database schema.  Safe to call on every start.
pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS companies (
            handle        TEXT    PRIMARY KEY,
            name          TEXT    NOT NULL UNIQUE,
            num_employees INTEGER CHECK (num_employees >= 0),
            description   TEXT    NOT NULL,
            logo_url      TEXT
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS jobs (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            title          TEXT    NOT NULL,
            salary         INTEGER CHECK (salary >= 0),
            equity         REAL    CHECK (equity >= 0 AND equity <= 1.0),
            company_handle TEXT    NOT NULL
                REFERENCES companies(handle) ON DELETE CASCADE
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            username   TEXT    PRIMARY KEY,
            password   TEXT    NOT NULL,
            first_name TEXT    NOT NULL,
            last_name  TEXT    NOT NULL,
            email      TEXT    NOT NULL CHECK (instr(email, '@') > 1),
            is_admin   INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS applications (
            username TEXT    NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            job_id   INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            PRIMARY KEY (username, job_id)
        )",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company_handle)")
        .execute(&mut *tx)
        .await?;

    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Database schema initialized at version {}", SCHEMA_VERSION);
    Ok(())
}
