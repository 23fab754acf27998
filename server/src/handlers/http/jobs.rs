use std::collections::HashMap;

use bytes::Bytes;
use hyper::{Request, StatusCode};
use serde_json::json;
use tracing::info;

use shared::types::{JobFilter, JobUpdate, NewJob};

use crate::AppState;
use crate::database::jobs;
use crate::error::ApiError;
use crate::handlers::http::routes::{HandlerResult, RequestContext};
use crate::handlers::http::utils::{deliver_serialized_json, parse_json_body, query_params};

/// Build a [`JobFilter`] from `title`, `minSalary` and `hasEquity`.
pub fn job_filter(query: &HashMap<String, String>) -> Result<JobFilter, ApiError> {
    let mut filter = JobFilter::default();
    let mut errors = Vec::new();

    for (key, value) in query {
        match key.as_str() {
            "title" => filter.title = Some(value.clone()),
            "minSalary" => match value.parse::<i64>() {
                Ok(n) if n >= 0 => filter.min_salary = Some(n),
                _ => errors.push("minSalary must be a non-negative integer".to_string()),
            },
            "hasEquity" => match value.as_str() {
                "true" => filter.has_equity = true,
                "false" => filter.has_equity = false,
                _ => errors.push("hasEquity must be true or false".to_string()),
            },
            other => errors.push(format!("Unknown filter: {}", other)),
        }
    }

    if errors.is_empty() {
        Ok(filter)
    } else {
        errors.sort();
        Err(ApiError::Validation(errors))
    }
}

pub(crate) fn job_id(ctx: &RequestContext) -> Result<i64, ApiError> {
    let raw = ctx.param("id")?;
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid job id: {}", raw)))
}

/// GET /jobs
pub async fn handle_list(req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let filter = job_filter(&query_params(req.uri()))?;
    let jobs = jobs::find_all(&state.db, &filter).await?;
    Ok(deliver_serialized_json(&json!({ "jobs": jobs }), StatusCode::OK)?)
}

/// GET /jobs/:id
pub async fn handle_get(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let job = jobs::get(&state.db, job_id(&ctx)?).await?;
    Ok(deliver_serialized_json(&json!({ "job": job }), StatusCode::OK)?)
}

/// POST /jobs (admin)
pub async fn handle_create(req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let data: NewJob = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let job = jobs::create(&state.db, &data).await?;
    info!("Job {} created for {}", job.id, job.company_handle);
    Ok(deliver_serialized_json(&json!({ "job": job }), StatusCode::CREATED)?)
}

/// PATCH /jobs/:id (admin)
pub async fn handle_update(req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let data: JobUpdate = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let job = jobs::update(&state.db, job_id(&ctx)?, &data).await?;
    Ok(deliver_serialized_json(&json!({ "job": job }), StatusCode::OK)?)
}

/// DELETE /jobs/:id (admin)
pub async fn handle_delete(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let id = job_id(&ctx)?;
    jobs::remove(&state.db, id).await?;
    info!("Job {} deleted", id);
    Ok(deliver_serialized_json(&json!({ "deleted": id }), StatusCode::OK)?)
}
