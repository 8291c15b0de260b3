//! Fallback for unmatched paths.

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use crate::domain::Error;

use super::ApiResult;

/// Answer `404` with the requested path in `details`.
///
/// Mounted with `App::default_service(web::to(not_found))`.
pub async fn not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::not_found(format!("no page at {}", req.path()))
        .with_details(json!({ "path": req.path() })))
}
