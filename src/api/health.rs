//! Health check endpoints for Kubernetes liveness and readiness probes

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{SymptomMatcher, UpstreamCache};

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    /// Number of disease patterns loaded
    pub catalog_size: usize,
    pub cache: String,
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe endpoint
///
/// Ready once the disease catalog is loaded. Upstream APIs are not probed:
/// every route degrades when they are down. The cache is reported but
/// never blocks readiness.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus),
        (status = 503, description = "Service is not ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(
    matcher: web::Data<SymptomMatcher>,
    cache: web::Data<Option<UpstreamCache>>,
) -> impl Responder {
    let catalog_size = matcher.catalog().len();

    let cache_status = match cache.as_ref() {
        Some(cache) => match cache.ping().await {
            Ok(()) => "healthy",
            Err(e) => {
                tracing::warn!(error = %e, "Cache health check failed");
                "unhealthy"
            }
        },
        None => "disabled",
    };

    let ready = catalog_size > 0;

    let status = ReadinessStatus {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            catalog_size,
            cache: cache_status.to_string(),
        },
    };

    if ready {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    use crate::model::MatchStrictness;

    fn app_data(catalog: Vec<crate::model::DiseasePattern>) -> (web::Data<SymptomMatcher>, web::Data<Option<UpstreamCache>>) {
        (
            web::Data::new(SymptomMatcher::new(catalog, MatchStrictness::Substring)),
            web::Data::new(None),
        )
    }

    #[actix_web::test]
    async fn test_liveness() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health/live").to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_ready_with_builtin_catalog() {
        let (matcher, cache) = app_data(crate::service::symptoms::builtin_catalog());
        let app = test::init_service(
            App::new()
                .app_data(matcher)
                .app_data(cache)
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/health/ready").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["dependencies"]["catalog_size"], 8);
        assert_eq!(body["dependencies"]["cache"], "disabled");
    }

    #[actix_web::test]
    async fn test_not_ready_with_empty_catalog() {
        let (matcher, cache) = app_data(vec![]);
        let app = test::init_service(
            App::new()
                .app_data(matcher)
                .app_data(cache)
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/health/ready").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
