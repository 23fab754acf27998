use anyhow::Context;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, instrument};

use shared::types::{NewUser, User, UserDetail, UserUpdate};

use super::DbError;
use super::sql::{ColumnAliases, UpdateFieldMap, bind_all, build_partial_update};
use super::utils::hash_password;
use crate::auth::{CredentialStore, StoredCredential};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    username: String,
    password: String,
    is_admin: bool,
}

fn user_aliases() -> ColumnAliases {
    ColumnAliases::from([
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ])
}

fn not_found(username: &str) -> DbError {
    DbError::NotFound(format!("No user: {}", username))
}

impl CredentialStore for SqlitePool {
    async fn find_credential_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<StoredCredential>> {
        let row: Option<CredentialRow> =
            sqlx::query_as("SELECT username, password, is_admin FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(self)
                .await
                .context("Failed to fetch credentials")?;

        Ok(row.map(|r| StoredCredential {
            username: r.username,
            password_hash: r.password,
            is_admin: r.is_admin,
        }))
    }
}

/// Create an account with a freshly hashed password.
#[instrument(skip(pool, data), fields(username = %data.username))]
pub async fn register(pool: &SqlitePool, data: &NewUser) -> Result<User, DbError> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(DbError::BadRequest(format!(
            "Duplicate username: {}",
            data.username
        )));
    }

    let hash = hash_password(&data.password).map_err(DbError::Hash)?;

    let sql = format!(
        "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        USER_COLUMNS
    );
    let row: UserRow = sqlx::query_as(&sql)
        .bind(&data.username)
        .bind(&hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

    info!("Registered user {} (admin: {})", row.username, row.is_admin);
    Ok(row.into())
}

#[instrument(skip(pool))]
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<User>, DbError> {
    let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
    let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(User::from).collect())
}

/// One user with the ids of the jobs they applied to.
#[instrument(skip(pool))]
pub async fn get(pool: &SqlitePool, username: &str) -> Result<UserDetail, DbError> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    let row: UserRow = sqlx::query_as(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(username))?;

    let applications: Vec<(i64,)> =
        sqlx::query_as("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
            .bind(username)
            .fetch_all(pool)
            .await?;

    Ok(UserDetail {
        user: row.into(),
        applications: applications.into_iter().map(|(id,)| id).collect(),
    })
}

/// Change only the supplied fields.  A new password is hashed before it is
/// stored.
#[instrument(skip(pool, data))]
pub async fn update(pool: &SqlitePool, username: &str, data: &UserUpdate) -> Result<User, DbError> {
    let mut fields = UpdateFieldMap::new();
    fields.set_if_some("firstName", data.first_name.clone());
    fields.set_if_some("lastName", data.last_name.clone());
    if let Some(password) = &data.password {
        fields.set("password", hash_password(password).map_err(DbError::Hash)?);
    }
    fields.set_if_some("email", data.email.clone());
    fields.set_if_some("isAdmin", data.is_admin);

    let update = build_partial_update(fields, &user_aliases())?;

    let sql = format!(
        "UPDATE users SET {} WHERE username = ${} RETURNING {}",
        update.set_clause,
        update.next_placeholder(),
        USER_COLUMNS
    );
    let mut values = update.values;
    values.push(username.into());

    let row: Option<UserRow> = bind_all(sqlx::query_as(&sql), values)
        .fetch_optional(pool)
        .await?;

    debug!("Updated user {}", username);
    row.map(User::from).ok_or_else(|| not_found(username))
}

#[instrument(skip(pool))]
pub async fn remove(pool: &SqlitePool, username: &str) -> Result<(), DbError> {
    let deleted: Option<(String,)> =
        sqlx::query_as("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    deleted.map(|_| ()).ok_or_else(|| not_found(username))
}

/// Record that `username` applied to job `job_id`.  Applying twice is a
/// no-op.
#[instrument(skip(pool))]
pub async fn apply_to_job(pool: &SqlitePool, username: &str, job_id: i64) -> Result<(), DbError> {
    let job: Option<(i64,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    if job.is_none() {
        return Err(DbError::NotFound(format!("No job: {}", job_id)));
    }

    let user: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if user.is_none() {
        return Err(not_found(username));
    }

    sqlx::query("INSERT OR IGNORE INTO applications (username, job_id) VALUES ($1, $2)")
        .bind(username)
        .bind(job_id)
        .execute(pool)
        .await?;

    debug!("{} applied to job {}", username, job_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, verify_credentials};
    use crate::database::{companies, connect_in_memory, jobs};
    use shared::types::{NewCompany, NewJob};

    fn new_user(username: &str, is_admin: bool) -> NewUser {
        NewUser {
            username: username.into(),
            password: "password1".into(),
            first_name: "F".into(),
            last_name: "L".into(),
            email: format!("{}@email.com", username),
            is_admin,
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let pool = connect_in_memory().await.unwrap();
        let user = register(&pool, &new_user("u1", true)).await.unwrap();
        assert!(user.is_admin);

        let identity = verify_credentials(&pool, "u1", "password1").await.unwrap();
        assert_eq!(identity.username, "u1");
        assert!(identity.is_admin);

        assert!(matches!(
            verify_credentials(&pool, "u1", "nope").await,
            Err(AuthError::Authentication)
        ));
        assert!(matches!(
            verify_credentials(&pool, "ghost", "password1").await,
            Err(AuthError::Authentication)
        ));
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let pool = connect_in_memory().await.unwrap();
        register(&pool, &new_user("u1", false)).await.unwrap();
        let stored = pool.find_credential_by_username("u1").await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn register_rejects_duplicate() {
        let pool = connect_in_memory().await.unwrap();
        register(&pool, &new_user("u1", false)).await.unwrap();
        let err = register(&pool, &new_user("u1", false)).await.unwrap_err();
        assert!(matches!(err, DbError::BadRequest(ref m) if m == "Duplicate username: u1"));
    }

    #[tokio::test]
    async fn update_rehashes_password() {
        let pool = connect_in_memory().await.unwrap();
        register(&pool, &new_user("u1", false)).await.unwrap();

        let data = UserUpdate {
            first_name: Some("New".into()),
            password: Some("newpassword".into()),
            ..Default::default()
        };
        let user = update(&pool, "u1", &data).await.unwrap();
        assert_eq!(user.first_name, "New");
        assert_eq!(user.last_name, "L");

        assert!(verify_credentials(&pool, "u1", "newpassword").await.is_ok());
        assert!(verify_credentials(&pool, "u1", "password1").await.is_err());
    }

    #[tokio::test]
    async fn apply_to_job_records_application() {
        let pool = connect_in_memory().await.unwrap();
        register(&pool, &new_user("u1", false)).await.unwrap();
        companies::create(
            &pool,
            &NewCompany {
                handle: "c1".into(),
                name: "C1".into(),
                description: "D".into(),
                num_employees: None,
                logo_url: None,
            },
        )
        .await
        .unwrap();
        let job = jobs::create(
            &pool,
            &NewJob {
                title: "J1".into(),
                salary: None,
                equity: None,
                company_handle: "c1".into(),
            },
        )
        .await
        .unwrap();

        apply_to_job(&pool, "u1", job.id).await.unwrap();
        apply_to_job(&pool, "u1", job.id).await.unwrap();
        assert_eq!(get(&pool, "u1").await.unwrap().applications, vec![job.id]);

        assert!(matches!(
            apply_to_job(&pool, "u1", job.id + 100).await,
            Err(DbError::NotFound(_))
        ));
        assert!(matches!(
            apply_to_job(&pool, "ghost", job.id).await,
            Err(DbError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_user() {
        let pool = connect_in_memory().await.unwrap();
        register(&pool, &new_user("u1", false)).await.unwrap();
        remove(&pool, "u1").await.unwrap();
        assert!(matches!(get(&pool, "u1").await, Err(DbError::NotFound(_))));
        assert!(find_all(&pool).await.unwrap().is_empty());
    }
}
