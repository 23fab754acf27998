use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::info;

use shared::types::{LoginData, TokenResponse};

use crate::AppState;
use crate::auth::verify_credentials;
use crate::error::ApiError;
use crate::handlers::http::routes::{HandlerResult, RequestContext};
use crate::handlers::http::utils::{deliver_serialized_json, parse_json_body};

/// POST /auth/token: `{username, password}` -> `{token}`.
pub async fn handle_token(
    req: Request<Bytes>,
    state: AppState,
    _ctx: RequestContext,
) -> HandlerResult {
    let data: LoginData = parse_json_body(req.headers(), req.body())?;
    data.validate().map_err(ApiError::Validation)?;

    let identity = verify_credentials(&state.db, &data.username, &data.password).await?;
    let token = state.tokens.issue(&identity)?;

    info!("Issued token for {}", identity.username);
    Ok(deliver_serialized_json(&TokenResponse { token }, StatusCode::OK)?)
}
