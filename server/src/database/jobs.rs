use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument};

use shared::types::{Job, JobDetail, JobFilter, JobUpdate, NewJob};

use super::DbError;
use super::companies::get_company;
use super::sql::{ColumnAliases, SqlValue, UpdateFieldMap, bind_all, build_partial_update};
use super::utils::contains_pattern;

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    title: String,
    salary: Option<i64>,
    equity: Option<f64>,
    company_handle: String,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            salary: row.salary,
            equity: row.equity,
            company_handle: row.company_handle,
        }
    }
}

impl From<&JobUpdate> for UpdateFieldMap {
    fn from(update: &JobUpdate) -> Self {
        let mut fields = UpdateFieldMap::new();
        fields.set_if_some("title", update.title.clone());
        fields.set_if_some("salary", update.salary);
        fields.set_if_some("equity", update.equity);
        fields
    }
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound(format!("No job: {}", id))
}

/// Insert a job for an existing company.
#[instrument(skip(pool, data), fields(company = %data.company_handle))]
pub async fn create(pool: &SqlitePool, data: &NewJob) -> Result<Job, DbError> {
    let company: Option<(String,)> =
        sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.company_handle)
            .fetch_optional(pool)
            .await?;

    if company.is_none() {
        return Err(DbError::BadRequest(format!(
            "No company: {}",
            data.company_handle
        )));
    }

    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
        JOB_COLUMNS
    );
    let row: JobRow = sqlx::query_as(&sql)
        .bind(&data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(&data.company_handle)
        .fetch_one(pool)
        .await?;

    debug!("Created job {} at {}", row.id, row.company_handle);
    Ok(row.into())
}

/// All jobs matching `filter`, ordered by title then id.
#[instrument(skip(pool))]
pub async fn find_all(pool: &SqlitePool, filter: &JobFilter) -> Result<Vec<Job>, DbError> {
    let mut clauses = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(min) = filter.min_salary {
        values.push(min.into());
        clauses.push(format!("salary >= ${}", values.len()));
    }
    if filter.has_equity {
        clauses.push("equity > 0".to_string());
    }
    if let Some(title) = &filter.title {
        values.push(contains_pattern(title).into());
        clauses.push(format!("title LIKE ${} ESCAPE '\\'", values.len()));
    }

    let mut sql = format!("SELECT {} FROM jobs", JOB_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY title, id");

    let rows: Vec<JobRow> = bind_all(sqlx::query_as(&sql), values)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Job::from).collect())
}

/// One job with its company.
#[instrument(skip(pool))]
pub async fn get(pool: &SqlitePool, id: i64) -> Result<JobDetail, DbError> {
    let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
    let row: JobRow = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))?;

    let company = get_company(pool, &row.company_handle).await?;

    Ok(JobDetail {
        id: row.id,
        title: row.title,
        salary: row.salary,
        equity: row.equity,
        company,
    })
}

/// Change only the supplied fields of a job.
#[instrument(skip(pool, data))]
pub async fn update(pool: &SqlitePool, id: i64, data: &JobUpdate) -> Result<Job, DbError> {
    let update = build_partial_update(UpdateFieldMap::from(data), &ColumnAliases::new())?;

    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
        update.set_clause,
        update.next_placeholder(),
        JOB_COLUMNS
    );
    let mut values = update.values;
    values.push(id.into());

    let row: Option<JobRow> = bind_all(sqlx::query_as(&sql), values)
        .fetch_optional(pool)
        .await?;

    row.map(Job::from).ok_or_else(|| not_found(id))
}

#[instrument(skip(pool))]
pub async fn remove(pool: &SqlitePool, id: i64) -> Result<(), DbError> {
    let deleted: Option<(i64,)> = sqlx::query_as("DELETE FROM jobs WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    deleted.map(|_| ()).ok_or_else(|| not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{companies, connect_in_memory};
    use shared::types::NewCompany;

    async fn seeded() -> (SqlitePool, Vec<Job>) {
        let pool = connect_in_memory().await.unwrap();
        companies::create(
            &pool,
            &NewCompany {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
        )
        .await
        .unwrap();

        let mut jobs = Vec::new();
        for (title, salary, equity) in [
            ("Job1", Some(100), Some(0.1)),
            ("Job2", Some(200), Some(0.0)),
            ("Job3", Some(300), None),
        ] {
            let job = create(
                &pool,
                &NewJob {
                    title: title.into(),
                    salary,
                    equity,
                    company_handle: "c1".into(),
                },
            )
            .await
            .unwrap();
            jobs.push(job);
        }
        (pool, jobs)
    }

    #[tokio::test]
    async fn create_requires_company() {
        let (pool, _) = seeded().await;
        let data = NewJob {
            title: "Orphan".into(),
            salary: None,
            equity: None,
            company_handle: "nope".into(),
        };
        assert!(matches!(
            create(&pool, &data).await,
            Err(DbError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn find_all_filters() {
        let (pool, _) = seeded().await;

        let all = find_all(&pool, &JobFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let equity = JobFilter {
            has_equity: true,
            ..Default::default()
        };
        let found = find_all(&pool, &equity).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Job1");

        let combined = JobFilter {
            title: Some("job".into()),
            min_salary: Some(150),
            has_equity: false,
        };
        let titles: Vec<_> = find_all(&pool, &combined)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.title)
            .collect();
        assert_eq!(titles, ["Job2", "Job3"]);
    }

    #[tokio::test]
    async fn get_includes_company() {
        let (pool, jobs) = seeded().await;
        let detail = get(&pool, jobs[0].id).await.unwrap();
        assert_eq!(detail.title, "Job1");
        assert_eq!(detail.company.handle, "c1");
        assert!(matches!(get(&pool, 9999).await, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_and_remove() {
        let (pool, jobs) = seeded().await;
        let data = JobUpdate {
            salary: Some(500),
            ..Default::default()
        };
        let job = update(&pool, jobs[0].id, &data).await.unwrap();
        assert_eq!(job.salary, Some(500));
        assert_eq!(job.title, "Job1");
        assert_eq!(job.equity, Some(0.1));

        remove(&pool, jobs[0].id).await.unwrap();
        assert!(matches!(
            remove(&pool, jobs[0].id).await,
            Err(DbError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_company_cascades_to_jobs() {
        let (pool, jobs) = seeded().await;
        companies::remove(&pool, "c1").await.unwrap();
        assert!(matches!(get(&pool, jobs[1].id).await, Err(DbError::NotFound(_))));
    }
}
