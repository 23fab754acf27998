use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::info;

use shared::types::{NewUser, RegistrationData, TokenResponse};

use crate::AppState;
use crate::auth::UserIdentity;
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::http::routes::{HandlerResult, RequestContext};
use crate::handlers::http::utils::{deliver_serialized_json, parse_json_body};

/// POST /auth/register: create a regular (never admin) account and return a
/// token for it.
pub async fn handle_register(
    req: Request<Bytes>,
    state: AppState,
    _ctx: RequestContext,
) -> HandlerResult {
    let data: RegistrationData = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let new_user = NewUser {
        username: data.username,
        password: data.password,
        first_name: data.first_name,
        last_name: data.last_name,
        email: data.email,
        is_admin: false,
    };
    let user = users::register(&state.db, &new_user).await?;
    let token = state
        .tokens
        .issue(&UserIdentity::new(user.username.clone(), user.is_admin))?;

    info!("New registration: {}", user.username);
    Ok(deliver_serialized_json(&TokenResponse { token }, StatusCode::CREATED)?)
}
