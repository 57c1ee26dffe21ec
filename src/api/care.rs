//! REST API endpoints for symptom analysis, outbreak context, facilities and care routing

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{
    CareRequest, DiseaseMatchResult, FacilityResult, OutbreakResult, OutbreakSearchHints,
    TieredCareResponse,
};
use crate::service::outbreak::search_hints;
use crate::service::{CareRouter, FacilityLocator, OutbreakAggregator, SymptomMatcher};

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_symptoms,
        get_outbreaks,
        search_outbreaks,
        find_facilities,
        route_care,
        crate::api::environment::get_weather,
        crate::api::environment::get_uv_index,
        crate::api::environment::get_air_quality,
        crate::api::health::liveness,
        crate::api::health::readiness,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "care", description = "Symptom triage and care routing"),
        (name = "outbreaks", description = "Disease outbreak context"),
        (name = "facilities", description = "Nearby healthcare facilities"),
        (name = "environment", description = "Weather, UV and air quality"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    info(
        title = "Eco Guardian Care API",
        description = "Symptom-to-care routing with outbreak and facility context"
    )
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeSymptomsRequest {
    /// Free-text symptoms, one per entry
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub location: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationQuery {
    /// Place name, e.g. "Boston, US"
    pub location: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OutbreakSearchQuery {
    pub location: String,
    /// Disease to focus the search on
    pub disease: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FacilityQuery {
    pub location: String,
    /// "emergency" for hospitals only, or a medical speciality
    pub specialty: Option<String>,
}

/// Reject blank locations, returning the trimmed value
pub(crate) fn require_location(location: &str) -> Result<&str, ApiError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("location must not be blank".to_string()));
    }
    Ok(trimmed)
}

/// Match symptoms against the disease catalog
#[utoipa::path(
    post,
    path = "/v1/symptoms/analyze",
    request_body = AnalyzeSymptomsRequest,
    responses(
        (status = 200, description = "Ranked candidate diseases", body = DiseaseMatchResult),
        (status = 400, description = "Blank location", body = ErrorResponse)
    ),
    tag = "care"
)]
#[post("/v1/symptoms/analyze")]
pub async fn analyze_symptoms(
    matcher: web::Data<SymptomMatcher>,
    body: web::Json<AnalyzeSymptomsRequest>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&body.location)?;
    Ok(HttpResponse::Ok().json(matcher.analyze(&body.symptoms, location)))
}

/// Aggregate outbreak reports for a location
#[utoipa::path(
    get,
    path = "/v1/outbreaks",
    params(LocationQuery),
    responses(
        (status = 200, description = "Outbreak context, possibly empty", body = OutbreakResult),
        (status = 400, description = "Blank location", body = ErrorResponse)
    ),
    tag = "outbreaks"
)]
#[get("/v1/outbreaks")]
pub async fn get_outbreaks(
    aggregator: web::Data<OutbreakAggregator>,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    Ok(HttpResponse::Ok().json(aggregator.aggregate(location).await))
}

/// Web search hints for outbreak reports
#[utoipa::path(
    get,
    path = "/v1/outbreaks/search",
    params(OutbreakSearchQuery),
    responses(
        (status = 200, description = "Search query and recommended sources", body = OutbreakSearchHints),
        (status = 400, description = "Blank location", body = ErrorResponse)
    ),
    tag = "outbreaks"
)]
#[get("/v1/outbreaks/search")]
pub async fn search_outbreaks(query: web::Query<OutbreakSearchQuery>) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    Ok(HttpResponse::Ok().json(search_hints(location, query.disease.as_deref())))
}

/// Nearest healthcare facilities
#[utoipa::path(
    get,
    path = "/v1/facilities",
    params(FacilityQuery),
    responses(
        (status = 200, description = "Facilities ranked by distance", body = FacilityResult),
        (status = 400, description = "Blank location", body = ErrorResponse),
        (status = 404, description = "Location could not be geocoded", body = ErrorResponse)
    ),
    tag = "facilities"
)]
#[get("/v1/facilities")]
pub async fn find_facilities(
    locator: web::Data<FacilityLocator>,
    query: web::Query<FacilityQuery>,
) -> Result<HttpResponse, ApiError> {
    let location = require_location(&query.location)?;
    let result = locator.locate(location, query.specialty.as_deref()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Triage symptoms and compose a tiered care recommendation
///
/// An empty symptom list returns an outbreak briefing instead.
#[utoipa::path(
    post,
    path = "/v1/care/route",
    request_body = CareRequest,
    responses(
        (status = 200, description = "Care recommendation with disclaimer", body = TieredCareResponse),
        (status = 400, description = "Blank location", body = ErrorResponse)
    ),
    tag = "care"
)]
#[post("/v1/care/route")]
pub async fn route_care(
    router: web::Data<CareRouter>,
    body: web::Json<CareRequest>,
) -> Result<HttpResponse, ApiError> {
    require_location(&body.location)?;
    let request = body.into_inner();
    Ok(HttpResponse::Ok().json(router.route(&request).await))
}

/// Configure care routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_symptoms)
        .service(get_outbreaks)
        .service(search_outbreaks)
        .service(find_facilities)
        .service(route_care);
}
