use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers, extract_user_agent, AuditEvent, AuditOutcome, UuidPath, ValidatedJson,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::LocationResult;
use crate::models::{
    CreateDistrict, CreateRegion, CreateStreet, CreateWard, District, Region, Street, Ward,
};
use crate::repository::LocationRepository;
use crate::service::LocationService;

const TAG: &str = "locations";

/// OpenAPI documentation for the Locations API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_regions,
        create_region,
        get_region,
        delete_region,
        list_districts,
        create_district,
        get_district,
        delete_district,
        list_wards,
        create_ward,
        get_ward,
        delete_ward,
        list_streets,
        create_street,
        get_street,
        delete_street,
    ),
    components(
        schemas(Region, District, Ward, Street, CreateRegion, CreateDistrict, CreateWard, CreateStreet),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Region, district, ward and street reference data")
    )
)]
pub struct ApiDoc;

/// Create the locations router
pub fn router<R: LocationRepository + 'static>(service: LocationService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/regions", get(list_regions).post(create_region))
        .route("/regions/{id}", get(get_region).delete(delete_region))
        .route(
            "/regions/{id}/districts",
            get(list_districts).post(create_district),
        )
        .route("/districts/{id}", get(get_district).delete(delete_district))
        .route("/districts/{id}/wards", get(list_wards).post(create_ward))
        .route("/wards/{id}", get(get_ward).delete(delete_ward))
        .route("/wards/{id}/streets", get(list_streets).post(create_street))
        .route("/streets/{id}", get(get_street).delete(delete_street))
        .with_state(shared_service)
}

fn audit(headers: &HeaderMap, action: &str, resource: String, details: serde_json::Value) {
    AuditEvent::new(None, action, Some(resource), AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(headers))
        .with_user_agent(extract_user_agent(headers))
        .with_details(details)
        .log();
}

// ============================================================================
// Regions
// ============================================================================

/// List all regions ordered by English name
#[utoipa::path(
    get,
    path = "/regions",
    tag = TAG,
    responses(
        (status = 200, description = "List of regions", body = Vec<Region>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_regions<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
) -> LocationResult<Json<Vec<Region>>> {
    Ok(Json(service.list_regions().await?))
}

#[utoipa::path(
    post,
    path = "/regions",
    tag = TAG,
    request_body = CreateRegion,
    responses(
        (status = 201, description = "Region created", body = Region),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_region<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateRegion>,
) -> LocationResult<impl IntoResponse> {
    let region = service.create_region(input).await?;

    audit(
        &headers,
        "region.create",
        format!("region:{}", region.id),
        json!({ "code": region.code }),
    );

    Ok((StatusCode::CREATED, Json(region)))
}

#[utoipa::path(
    get,
    path = "/regions/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Region found", body = Region),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_region<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(id): UuidPath,
) -> LocationResult<Json<Region>> {
    Ok(Json(service.get_region(id).await?))
}

/// Delete a region together with its districts, wards and streets
#[utoipa::path(
    delete,
    path = "/regions/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Region ID")),
    responses(
        (status = 204, description = "Region deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_region<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> LocationResult<impl IntoResponse> {
    service.delete_region(id).await?;
    audit(&headers, "region.delete", format!("region:{}", id), json!({}));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Districts
// ============================================================================

#[utoipa::path(
    get,
    path = "/regions/{id}/districts",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Districts of the region", body = Vec<District>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_districts<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(region_id): UuidPath,
) -> LocationResult<Json<Vec<District>>> {
    Ok(Json(service.list_districts(region_id).await?))
}

#[utoipa::path(
    post,
    path = "/regions/{id}/districts",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Region ID")),
    request_body = CreateDistrict,
    responses(
        (status = 201, description = "District created", body = District),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_district<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(region_id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateDistrict>,
) -> LocationResult<impl IntoResponse> {
    let district = service.create_district(region_id, input).await?;

    audit(
        &headers,
        "district.create",
        format!("district:{}", district.id),
        json!({ "code": district.code, "region_id": region_id }),
    );

    Ok((StatusCode::CREATED, Json(district)))
}

#[utoipa::path(
    get,
    path = "/districts/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "District ID")),
    responses(
        (status = 200, description = "District found", body = District),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_district<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(id): UuidPath,
) -> LocationResult<Json<District>> {
    Ok(Json(service.get_district(id).await?))
}

#[utoipa::path(
    delete,
    path = "/districts/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "District ID")),
    responses(
        (status = 204, description = "District deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_district<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> LocationResult<impl IntoResponse> {
    service.delete_district(id).await?;
    audit(&headers, "district.delete", format!("district:{}", id), json!({}));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Wards
// ============================================================================

#[utoipa::path(
    get,
    path = "/districts/{id}/wards",
    tag = TAG,
    params(("id" = Uuid, Path, description = "District ID")),
    responses(
        (status = 200, description = "Wards of the district", body = Vec<Ward>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_wards<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(district_id): UuidPath,
) -> LocationResult<Json<Vec<Ward>>> {
    Ok(Json(service.list_wards(district_id).await?))
}

#[utoipa::path(
    post,
    path = "/districts/{id}/wards",
    tag = TAG,
    params(("id" = Uuid, Path, description = "District ID")),
    request_body = CreateWard,
    responses(
        (status = 201, description = "Ward created", body = Ward),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_ward<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(district_id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateWard>,
) -> LocationResult<impl IntoResponse> {
    let ward = service.create_ward(district_id, input).await?;

    audit(
        &headers,
        "ward.create",
        format!("ward:{}", ward.id),
        json!({ "code": ward.code, "district_id": district_id }),
    );

    Ok((StatusCode::CREATED, Json(ward)))
}

#[utoipa::path(
    get,
    path = "/wards/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Ward ID")),
    responses(
        (status = 200, description = "Ward found", body = Ward),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_ward<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(id): UuidPath,
) -> LocationResult<Json<Ward>> {
    Ok(Json(service.get_ward(id).await?))
}

/// Delete a ward and its streets. Users assigned to it become unassigned.
#[utoipa::path(
    delete,
    path = "/wards/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Ward ID")),
    responses(
        (status = 204, description = "Ward deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_ward<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> LocationResult<impl IntoResponse> {
    service.delete_ward(id).await?;
    audit(&headers, "ward.delete", format!("ward:{}", id), json!({}));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Streets
// ============================================================================

#[utoipa::path(
    get,
    path = "/wards/{id}/streets",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Ward ID")),
    responses(
        (status = 200, description = "Streets of the ward", body = Vec<Street>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_streets<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(ward_id): UuidPath,
) -> LocationResult<Json<Vec<Street>>> {
    Ok(Json(service.list_streets(ward_id).await?))
}

#[utoipa::path(
    post,
    path = "/wards/{id}/streets",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Ward ID")),
    request_body = CreateStreet,
    responses(
        (status = 201, description = "Street created", body = Street),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_street<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(ward_id): UuidPath,
    ValidatedJson(input): ValidatedJson<CreateStreet>,
) -> LocationResult<impl IntoResponse> {
    let street = service.create_street(ward_id, input).await?;

    audit(
        &headers,
        "street.create",
        format!("street:{}", street.id),
        json!({ "ward_id": ward_id }),
    );

    Ok((StatusCode::CREATED, Json(street)))
}

#[utoipa::path(
    get,
    path = "/streets/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Street ID")),
    responses(
        (status = 200, description = "Street found", body = Street),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_street<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    UuidPath(id): UuidPath,
) -> LocationResult<Json<Street>> {
    Ok(Json(service.get_street(id).await?))
}

#[utoipa::path(
    delete,
    path = "/streets/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Street ID")),
    responses(
        (status = 204, description = "Street deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_street<R: LocationRepository>(
    State(service): State<Arc<LocationService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> LocationResult<impl IntoResponse> {
    service.delete_street(id).await?;
    audit(&headers, "street.delete", format!("street:{}", id), json!({}));
    Ok(StatusCode::NO_CONTENT)
}
