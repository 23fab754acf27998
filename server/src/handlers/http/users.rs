use bytes::Bytes;
use hyper::{Request, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use shared::types::{NewUser, UserUpdate};

use crate::AppState;
use crate::auth::{AuthError, UserIdentity, require_logged_in};
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::http::jobs::job_id;
use crate::handlers::http::routes::{HandlerResult, RequestContext};
use crate::handlers::http::utils::{deliver_serialized_json, parse_json_body};

/// POST /users (admin): create any account, admins included, and return it
/// with a token.
pub async fn handle_create(req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let data: NewUser = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let user = users::register(&state.db, &data).await?;
    let token = state
        .tokens
        .issue(&UserIdentity::new(user.username.clone(), user.is_admin))?;

    Ok(deliver_serialized_json(
        &json!({ "user": user, "token": token }),
        StatusCode::CREATED,
    )?)
}

/// GET /users (admin)
pub async fn handle_list(_req: Request<Bytes>, state: AppState, _ctx: RequestContext) -> HandlerResult {
    let users = users::find_all(&state.db).await?;
    Ok(deliver_serialized_json(&json!({ "users": users }), StatusCode::OK)?)
}

/// GET /users/:username (admin or self)
pub async fn handle_get(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let user = users::get(&state.db, ctx.param("username")?).await?;
    Ok(deliver_serialized_json(&json!({ "user": user }), StatusCode::OK)?)
}

/// PATCH /users/:username (admin or self).  Only an admin may change
/// `isAdmin`.
pub async fn handle_update(req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let data: UserUpdate = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let caller = require_logged_in(&ctx.identity)?;
    if data.is_admin.is_some() && !caller.is_admin {
        warn!("{} tried to change their own admin flag", caller.username);
        return Err(AuthError::Unauthorized.into());
    }

    let user = users::update(&state.db, ctx.param("username")?, &data).await?;
    Ok(deliver_serialized_json(&json!({ "user": user }), StatusCode::OK)?)
}

/// DELETE /users/:username (admin or self)
pub async fn handle_delete(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let username = ctx.param("username")?;
    users::remove(&state.db, username).await?;
    info!("User {} deleted", username);
    Ok(deliver_serialized_json(&json!({ "deleted": username }), StatusCode::OK)?)
}

/// POST /users/:username/jobs/:id (admin or self)
pub async fn handle_apply(_req: Request<Bytes>, state: AppState, ctx: RequestContext) -> HandlerResult {
    let username = ctx.param("username")?;
    let id = job_id(&ctx)?;
    users::apply_to_job(&state.db, username, id).await?;
    Ok(deliver_serialized_json(&json!({ "applied": id }), StatusCode::OK)?)
}
