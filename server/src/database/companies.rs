use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument};

use shared::types::{Company, CompanyDetail, CompanyFilter, CompanyUpdate, JobSummary, NewCompany};

use super::DbError;
use super::sql::{ColumnAliases, SqlValue, UpdateFieldMap, bind_all, build_partial_update};
use super::utils::contains_pattern;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, FromRow)]
struct CompanyRow {
    handle: String,
    name: String,
    description: String,
    num_employees: Option<i64>,
    logo_url: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            handle: row.handle,
            name: row.name,
            description: row.description,
            num_employees: row.num_employees,
            logo_url: row.logo_url,
        }
    }
}

#[derive(Debug, FromRow)]
struct JobSummaryRow {
    id: i64,
    title: String,
    salary: Option<i64>,
    equity: Option<f64>,
}

/// Client field names that differ from their column.
fn company_aliases() -> ColumnAliases {
    ColumnAliases::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
}

impl From<&CompanyUpdate> for UpdateFieldMap {
    fn from(update: &CompanyUpdate) -> Self {
        let mut fields = UpdateFieldMap::new();
        fields.set_if_some("name", update.name.clone());
        fields.set_if_some("description", update.description.clone());
        fields.set_if_some("numEmployees", update.num_employees);
        fields.set_if_some("logoUrl", update.logo_url.clone());
        fields
    }
}

/// Translate a UNIQUE violation on `companies` into a client error.
fn unique_violation(e: sqlx::Error, handle: &str, name: Option<&str>) -> DbError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return match name {
                Some(name) if db.message().contains("companies.name") => {
                    DbError::BadRequest(format!("Duplicate company name: {}", name))
                }
                _ => DbError::BadRequest(format!("Duplicate company: {}", handle)),
            };
        }
    }
    DbError::Sqlx(e)
}

/// Insert a company.  Neither the handle nor the name may already be taken.
#[instrument(skip(pool, data), fields(handle = %data.handle))]
pub async fn create(pool: &SqlitePool, data: &NewCompany) -> Result<Company, DbError> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(DbError::BadRequest(format!(
            "Duplicate company: {}",
            data.handle
        )));
    }

    let sql = format!(
        "INSERT INTO companies ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
        cols = COMPANY_COLUMNS
    );
    let row: CompanyRow = sqlx::query_as(&sql)
        .bind(&data.handle)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.num_employees)
        .bind(&data.logo_url)
        .fetch_one(pool)
        .await
        .map_err(|e| unique_violation(e, &data.handle, Some(&data.name)))?;

    debug!("Created company {}", row.handle);
    Ok(row.into())
}

/// All companies matching `filter`, ordered by name.
#[instrument(skip(pool))]
pub async fn find_all(pool: &SqlitePool, filter: &CompanyFilter) -> Result<Vec<Company>, DbError> {
    if let Err(errors) = filter.validate() {
        return Err(DbError::BadRequest(errors.join("; ")));
    }

    let mut clauses = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(min) = filter.min_employees {
        values.push(min.into());
        clauses.push(format!("num_employees >= ${}", values.len()));
    }
    if let Some(max) = filter.max_employees {
        values.push(max.into());
        clauses.push(format!("num_employees <= ${}", values.len()));
    }
    if let Some(name) = &filter.name {
        values.push(contains_pattern(name).into());
        clauses.push(format!("name LIKE ${} ESCAPE '\\'", values.len()));
    }

    let mut sql = format!("SELECT {} FROM companies", COMPANY_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY name");

    let rows: Vec<CompanyRow> = bind_all(sqlx::query_as(&sql), values)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Company::from).collect())
}

/// One company with its jobs.
#[instrument(skip(pool))]
pub async fn get(pool: &SqlitePool, handle: &str) -> Result<CompanyDetail, DbError> {
    let company = get_company(pool, handle).await?;

    let jobs: Vec<JobSummaryRow> = sqlx::query_as(
        "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
    )
    .bind(handle)
    .fetch_all(pool)
    .await?;

    Ok(CompanyDetail {
        company,
        jobs: jobs
            .into_iter()
            .map(|j| JobSummary {
                id: j.id,
                title: j.title,
                salary: j.salary,
                equity: j.equity,
            })
            .collect(),
    })
}

/// The bare company row, without jobs.
pub(crate) async fn get_company(pool: &SqlitePool, handle: &str) -> Result<Company, DbError> {
    let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
    let row: Option<CompanyRow> = sqlx::query_as(&sql)
        .bind(handle)
        .fetch_optional(pool)
        .await?;

    row.map(Company::from)
        .ok_or_else(|| DbError::NotFound(format!("No company: {}", handle)))
}

/// Change only the supplied fields of a company.
#[instrument(skip(pool, data))]
pub async fn update(
    pool: &SqlitePool,
    handle: &str,
    data: &CompanyUpdate,
) -> Result<Company, DbError> {
    let update = build_partial_update(UpdateFieldMap::from(data), &company_aliases())?;

    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
        update.set_clause,
        update.next_placeholder(),
        COMPANY_COLUMNS
    );
    let mut values = update.values;
    values.push(handle.into());

    let row: Option<CompanyRow> = bind_all(sqlx::query_as(&sql), values)
        .fetch_optional(pool)
        .await
        .map_err(|e| unique_violation(e, handle, data.name.as_deref()))?;

    row.map(Company::from)
        .ok_or_else(|| DbError::NotFound(format!("No company: {}", handle)))
}

/// Delete a company and, by cascade, its jobs.
#[instrument(skip(pool))]
pub async fn remove(pool: &SqlitePool, handle: &str) -> Result<(), DbError> {
    let deleted: Option<(String,)> =
        sqlx::query_as("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?;

    match deleted {
        Some(_) => Ok(()),
        None => Err(DbError::NotFound(format!("No company: {}", handle))),
    }
}
