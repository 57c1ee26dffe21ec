//! REST API endpoints for environmental signals

use actix_web::{HttpResponse, get, web};

use crate::api::care::{LocationQuery, require_location};
use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{AirQualityReport, UvIndexReport, WeatherReport};
use crate::service::EnvironmentService;

/// Current weather conditions
#[utoipa::path(
    get,
    path = "/v1/environment/weather",
    params(LocationQuery),
    responses(
        (status = 200, description = "Current weather", body = WeatherReport),
        (status = 400, description = "Blank location", body = ErrorResponse),
        (status = 404, description = "Location could not be geocoded", body = ErrorResponse),
        (status = 502, description = "Upstream error", body = ErrorResponse)
    ),
    tag = "environment"
)]
#[get("/v1/environment/weather")]
pub async fn get_weather(
    service: web::Data<EnvironmentService>,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    Ok(HttpResponse::Ok().json(service.weather(location).await?))
}

/// Hourly UV index forecast
#[utoipa::path(
    get,
    path = "/v1/environment/uv",
    params(LocationQuery),
    responses(
        (status = 200, description = "Hourly UV index", body = UvIndexReport),
        (status = 400, description = "Blank location", body = ErrorResponse),
        (status = 404, description = "Location could not be geocoded", body = ErrorResponse),
        (status = 502, description = "Upstream error", body = ErrorResponse)
    ),
    tag = "environment"
)]
#[get("/v1/environment/uv")]
pub async fn get_uv_index(
    service: web::Data<EnvironmentService>,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    Ok(HttpResponse::Ok().json(service.uv_index(location).await?))
}

/// Latest readings from the nearest air-quality monitoring station
#[utoipa::path(
    get,
    path = "/v1/environment/air-quality",
    params(LocationQuery),
    responses(
        (status = 200, description = "Latest pollutant readings", body = AirQualityReport),
        (status = 400, description = "Blank location", body = ErrorResponse),
        (status = 404, description = "Location could not be geocoded", body = ErrorResponse),
        (status = 503, description = "No API key configured or no station nearby", body = ErrorResponse)
    ),
    tag = "environment"
)]
#[get("/v1/environment/air-quality")]
pub async fn get_air_quality(
    service: web::Data<EnvironmentService>,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    Ok(HttpResponse::Ok().json(service.air_quality(location).await?))
}

/// Configure environment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_weather)
        .service(get_uv_index)
        .service(get_air_quality);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::service::facility::tests::FixedGeocoder;
    use crate::service::open_meteo::OpenMeteoClient;
    use crate::service::openaq::OpenAqClient;

    fn service() -> web::Data<EnvironmentService> {
        let timeout = Duration::from_secs(1);
        web::Data::new(EnvironmentService::new(
            Arc::new(FixedGeocoder(None)),
            OpenMeteoClient::new(timeout),
            OpenAqClient::with_api_key(timeout, None),
        ))
    }

    #[actix_web::test]
    async fn test_weather_unknown_location() {
        let app = test::init_service(App::new().app_data(service()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/v1/environment/weather?location=Atlantis")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_air_quality_without_key() {
        let app = test::init_service(App::new().app_data(service()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/v1/environment/air-quality?location=Denver")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "service_unavailable");
    }

    #[actix_web::test]
    async fn test_uv_blank_location() {
        let app = test::init_service(App::new().app_data(service()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/v1/environment/uv?location=%20")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
