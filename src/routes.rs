use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::errors::{ApiError, Operation};
use crate::filtering::{QueryParams, apply_predicate, build_filter};
use crate::pagination::{PaginationResult, assemble, plan};
use crate::resources::{book, character, poi, species};
use crate::response::ApiResponse;
use crate::traits::CRUDResource;
use crate::validation::Validatable;

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Upper bound applied to `limit` on list endpoints, `None` for unbounded.
    pub max_page_size: Option<u64>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, max_page_size: Option<u64>) -> Self {
        Self { db, max_page_size }
    }
}

/// Parse a path identifier, answering `Invalid <resource> ID` when it is not
/// a UUID.
///
/// # Errors
///
/// [`ApiError::InvalidId`] for anything `Uuid::parse_str` rejects.
pub fn parse_id<T: CRUDResource>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_id(T::RESOURCE_NAME_SINGULAR))
}

/// Filter, plan and fetch one page of `T`, counting matches concurrently.
///
/// # Errors
///
/// The first database error from either query.
pub async fn fetch_page<T: CRUDResource>(
    state: &AppState,
    params: Vec<(String, String)>,
) -> Result<PaginationResult<T>, DbErr> {
    let params = QueryParams::from_pairs(params);
    let predicate = build_filter(&params, &T::filters());
    let options = plan(params.get_str("page"), params.get_str("limit"))
        .with_max_limit(state.max_page_size);
    let condition = apply_predicate(&predicate, &T::filterable_columns());

    tracing::debug!(
        resource = T::RESOURCE_NAME_PLURAL,
        ?predicate,
        page = options.page,
        limit = options.limit,
        "Listing"
    );

    let (total, items) = tokio::try_join!(
        T::total_count(&state.db, &condition),
        T::get_all(&state.db, &condition, options.skip, options.limit),
    )?;

    Ok(assemble(items, total, &options))
}

pub async fn get_all<T: CRUDResource>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<PaginationResult<T>>>, ApiError> {
    let page = fetch_page::<T>(&state, params)
        .await
        .map_err(|err| ApiError::operation(Operation::FetchAll, T::RESOURCE_NAME_PLURAL, err))?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_one<T: CRUDResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<T>>, ApiError> {
    let id = parse_id::<T>(&id)?;
    let item = T::get_one(&state.db, id)
        .await
        .map_err(|err| ApiError::operation(Operation::FetchOne, T::RESOURCE_NAME_SINGULAR, err))?;
    Ok(Json(ApiResponse::ok(item)))
}

pub async fn create_one<T: CRUDResource>(
    State(state): State<AppState>,
    payload: Result<Json<T::CreateModel>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<T>>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let created = T::create(&state.db, payload)
        .await
        .map_err(|err| ApiError::operation(Operation::Create, T::RESOURCE_NAME_SINGULAR, err))?;
    tracing::info!(resource = T::RESOURCE_NAME_SINGULAR, "Created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            created,
            format!("{} created successfully", T::RESOURCE_LABEL),
        )),
    ))
}

pub async fn update_one<T: CRUDResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<T::UpdateModel>, JsonRejection>,
) -> Result<Json<ApiResponse<T>>, ApiError> {
    let id = parse_id::<T>(&id)?;
    let Json(payload) = payload?;
    payload.validate()?;

    let updated = T::update(&state.db, id, payload)
        .await
        .map_err(|err| ApiError::operation(Operation::Update, T::RESOURCE_NAME_SINGULAR, err))?;
    tracing::info!(resource = T::RESOURCE_NAME_SINGULAR, %id, "Updated");

    Ok(Json(ApiResponse::with_message(
        updated,
        format!("{} updated successfully", T::RESOURCE_LABEL),
    )))
}

pub async fn delete_one<T: CRUDResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id::<T>(&id)?;
    T::delete(&state.db, id)
        .await
        .map_err(|err| ApiError::operation(Operation::Delete, T::RESOURCE_NAME_SINGULAR, err))?;
    tracing::info!(resource = T::RESOURCE_NAME_SINGULAR, %id, "Deleted");

    Ok(Json(ApiResponse::message_only(format!(
        "{} deleted successfully",
        T::RESOURCE_LABEL
    ))))
}

/// `GET /` + `POST /` and `GET|PUT|DELETE /{id}` for `T`.
pub fn crud_router<T: CRUDResource>() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all::<T>).post(create_one::<T>))
        .route(
            "/{id}",
            get(get_one::<T>).put(update_one::<T>).delete(delete_one::<T>),
        )
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(err) => {
            tracing::warn!(error = %err, "Database ping failed");
            "disconnected"
        }
    };

    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        database,
    })
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

/// The full application: resource routers under `/api`, health check,
/// 404 fallback and the middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/books", book::router())
        .nest("/api/characters", character::router())
        .nest("/api/pois", poi::router())
        .nest("/api/species", species::router())
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
