use std::collections::HashMap;

use bytes::Bytes;
use hyper::{Request, StatusCode};
use serde_json::json;
use tracing::info;

use shared::types::{CompanyFilter, CompanyUpdate, NewCompany};

use crate::AppState;
use crate::database::companies;
use crate::error::ApiError;
use crate::handlers::http::routes::{HandlerResult, RequestContext};
use crate::handlers::http::utils::{deliver_serialized_json, parse_json_body, query_params};

/// Build a [`CompanyFilter`] from `name`, `minEmployees` and `maxEmployees`.
/// Any other key, or a non-integer bound, is a validation error.
pub fn company_filter(query: &HashMap<String, String>) -> Result<CompanyFilter, ApiError> {
    let mut filter = CompanyFilter::default();
    let mut errors = Vec::new();

    for (key, value) in query {
        match key.as_str() {
            "name" => filter.name = Some(value.clone()),
            "minEmployees" => match value.parse() {
                Ok(n) => filter.min_employees = Some(n),
                Err(_) => errors.push("minEmployees must be an integer".to_string()),
            },
            "maxEmployees" => match value.parse() {
                Ok(n) => filter.max_employees = Some(n),
                Err(_) => errors.push("maxEmployees must be an integer".to_string()),
            },
            other => errors.push(format!("Unknown filter: {}", other)),
        }
    }

    if !errors.is_empty() {
        errors.sort();
        return Err(ApiError::Validation(errors));
    }
    filter.validate().map_err(ApiError::Validation)?;
    Ok(filter)
}

/// GET /companies
pub async fn handle_list(req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let filter = company_filter(&query_params(req.uri()))?;
    let companies = companies::find_all(&state.db, &filter).await?;
    Ok(deliver_serialized_json(&json!({ "companies": companies }), StatusCode::OK)?)
}

/// GET /companies/:handle
pub async fn handle_get(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let company = companies::get(&state.db, ctx.param("handle")?).await?;
    Ok(deliver_serialized_json(&json!({ "company": company }), StatusCode::OK)?)
}

/// POST /companies (admin)
pub async fn handle_create(req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let data: NewCompany = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let company = companies::create(&state.db, &data).await?;
    info!("Company {} created", company.handle);
    Ok(deliver_serialized_json(&json!({ "company": company }), StatusCode::CREATED)?)
}

/// PATCH /companies/:handle (admin)
pub async fn handle_update(req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let data: CompanyUpdate = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let company = companies::update(&state.db, ctx.param("handle")?, &data).await?;
    Ok(deliver_serialized_json(&json!({ "company": company }), StatusCode::OK)?)
}

/// DELETE /companies/:handle (admin)
pub async fn handle_delete(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let handle = ctx.param("handle")?;
    companies::remove(&state.db, handle).await?;
    info!("Company {} deleted", handle);
    Ok(deliver_serialized_json(&json!({ "deleted": handle }), StatusCode::OK)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_all_filters() {
        let filter = company_filter(&query(&[
            ("name", "net"),
            ("minEmployees", "2"),
            ("maxEmployees", "10"),
        ]))
        .unwrap();
        assert_eq!(filter.name.as_deref(), Some("net"));
        assert_eq!(filter.min_employees, Some(2));
        assert_eq!(filter.max_employees, Some(10));
    }

    #[test]
    fn rejects_bad_values_and_unknown_keys() {
        assert!(company_filter(&query(&[("minEmployees", "lots")])).is_err());
        assert!(company_filter(&query(&[("handle", "c1")])).is_err());
        assert!(company_filter(&query(&[("minEmployees", "5"), ("maxEmployees", "1")])).is_err());
    }
}
