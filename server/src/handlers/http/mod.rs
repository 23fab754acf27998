pub mod auth;
pub mod companies;
pub mod jobs;
pub mod routes;
pub mod users;
pub mod utils;

pub use routes::{HandlerResult, RequestContext, Router, build_api_router};
