use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use tracing::{debug, warn};

use crate::AppState;
use crate::auth::gates::check_all;
use crate::auth::{Gate, Identity, attach_identity};
use crate::error::ApiError;
use crate::handlers::http::utils::{HttpResponse, deliver_serialized_json, read_body};
use crate::handlers::http::{auth, companies, jobs, users};

// ---------------------------------------------------------------------------
// Handler type
// ---------------------------------------------------------------------------
//
// Every route runs the same pipeline:
//
//   1. identity middleware: the bearer token (if any) becomes an `Identity`
//      stored in the request extensions; bad tokens become `Anonymous`.
//   2. the route's gates, in order.  A failure answers 401 and the body is
//      never read.
//   3. the body is collected and the handler gets
//      (Request<Bytes>, AppState, RequestContext).

pub type HandlerResult = Result<HttpResponse, ApiError>;

/// What the router already worked out for the handler.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Identity,
    /// `:name` path segments, e.g. `{"username": "bob"}` for `/users/:username`.
    pub params: HashMap<String, String>,
}

impl RequestContext {
    pub fn param(&self, name: &str) -> Result<&str, ApiError> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing path parameter: {}", name)))
    }
}

type RouteHandler = Box<
    dyn Fn(Request<Bytes>, AppState, RequestContext) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>>
        + Send
        + Sync,
>;

struct Route {
    method: Method,
    path: String,
    gates: Vec<Gate>,
    handler: RouteHandler,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `handler` for `method path`, guarded by `gates`.
    pub fn route<F, Fut>(mut self, method: Method, path: &str, gates: &[Gate], handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            gates: gates.to_vec(),
            handler: Box::new(move |req, state, ctx| Box::pin(handler(req, state, ctx))),
        });
        self
    }

    // ── Open (no gate) ────────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::GET, path, &[], handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::POST, path, &[], handler)
    }

    // ── Gated ─────────────────────────────────────────────────────────────────

    pub fn get_gated<F, Fut>(self, path: &str, gates: &[Gate], handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::GET, path, gates, handler)
    }

    pub fn post_gated<F, Fut>(self, path: &str, gates: &[Gate], handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::POST, path, gates, handler)
    }

    pub fn patch_gated<F, Fut>(self, path: &str, gates: &[Gate], handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::PATCH, path, gates, handler)
    }

    pub fn delete_gated<F, Fut>(self, path: &str, gates: &[Gate], handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(Method::DELETE, path, gates, handler)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Answer one request.  Never fails: every error becomes a JSON error
    /// response.
    pub async fn dispatch<B>(&self, mut req: Request<B>, state: AppState) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let identity = attach_identity(&mut req, &state.tokens);
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for route in &self.routes {
            if route.method != method {
                continue;
            }
            let Some(params) = Self::path_params(&route.path, &path) else {
                continue;
            };

            if let Err(e) = check_all(&route.gates, &identity, &params) {
                warn!("Gate rejected {} {}", method, path);
                return ApiError::from(e).into_response();
            }

            let (parts, body) = req.into_parts();
            let body = match read_body(body).await {
                Ok(bytes) => bytes,
                Err(e) => return e.into_response(),
            };
            let req = Request::from_parts(parts, body);

            debug!("Dispatching {} {}", method, path);
            let ctx = RequestContext { identity, params };
            return match (route.handler)(req, state, ctx).await {
                Ok(response) => response,
                Err(e) => e.into_response(),
            };
        }

        ApiError::NotFound("Endpoint not found".to_string()).into_response()
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        Self::path_params(route_path, request_path).is_some()
    }

    /// Match `request_path` against `route_path`, capturing `:param`
    /// segments.  A parameter never matches an empty segment.
    pub fn path_params(route_path: &str, request_path: &str) -> Option<HashMap<String, String>> {
        // Strip query string from incoming request path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);

        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (r, p) in route_segs.iter().zip(path_segs.iter()) {
            match r.strip_prefix(':') {
                Some(name) if !p.is_empty() => {
                    params.insert(name.to_string(), p.to_string());
                }
                Some(_) => return None,
                None if r == p => {}
                None => return None,
            }
        }
        Some(params)
    }
}

async fn health(_req: Request<Bytes>, _state: AppState, _ctx: RequestContext) -> HandlerResult {
    Ok(deliver_serialized_json(
        &serde_json::json!({"status": "success", "health": "ok"}),
        StatusCode::OK,
    )?)
}

// ---------------------------------------------------------------------------
// API router
//
// Authorization is enforced here at the routing level; handlers never repeat
// a gate check.
// ---------------------------------------------------------------------------

pub fn build_api_router() -> Router {
    const ADMIN: &[Gate] = &[Gate::Admin];
    const ADMIN_OR_SELF: &[Gate] = &[Gate::AdminOrSelf("username")];

    Router::new()
        // ── Public ───────────────────────────────────────────────────────────
        .get("/health", health)
        .post("/auth/token", auth::login::handle_token)
        .post("/auth/register", auth::register::handle_register)
        .get("/companies", companies::handle_list)
        .get("/companies/:handle", companies::handle_get)
        .get("/jobs", jobs::handle_list)
        .get("/jobs/:id", jobs::handle_get)
        // ── Admin ────────────────────────────────────────────────────────────
        .post_gated("/companies", ADMIN, companies::handle_create)
        .patch_gated("/companies/:handle", ADMIN, companies::handle_update)
        .delete_gated("/companies/:handle", ADMIN, companies::handle_delete)
        .post_gated("/jobs", ADMIN, jobs::handle_create)
        .patch_gated("/jobs/:id", ADMIN, jobs::handle_update)
        .delete_gated("/jobs/:id", ADMIN, jobs::handle_delete)
        .post_gated("/users", ADMIN, users::handle_create)
        .get_gated("/users", ADMIN, users::handle_list)
        // ── Admin or the user named in the path ──────────────────────────────
        .get_gated("/users/:username", ADMIN_OR_SELF, users::handle_get)
        .patch_gated("/users/:username", ADMIN_OR_SELF, users::handle_update)
        .delete_gated("/users/:username", ADMIN_OR_SELF, users::handle_delete)
        .post_gated("/users/:username/jobs/:id", ADMIN_OR_SELF, users::handle_apply)
}
