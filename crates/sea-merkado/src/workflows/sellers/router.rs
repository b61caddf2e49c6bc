use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::{
    FileUpload, NewSeller, RequirementKind, RequirementsUpdate, SellerId, StatusUpdate,
};
use super::store::{SellerStore, StoreError};
use crate::workflows::notifications::{NotificationFeed, NotificationSource};

/// Router exposing the seller store endpoints over any store implementation.
pub fn seller_router<S>(store: Arc<S>) -> Router
where
    S: SellerStore + NotificationSource + 'static,
{
    Router::new()
        .route(
            "/api/sellers",
            get(list_handler::<S>).post(register_handler::<S>),
        )
        .route("/api/sellers/:seller_id", get(fetch_handler::<S>))
        .route("/api/sellers/:seller_id/status", put(status_handler::<S>))
        .route(
            "/api/sellers/:seller_id/check-requirements",
            put(check_requirements_handler::<S>),
        )
        .route(
            "/api/sellers/:seller_id/requirements",
            put(requirements_handler::<S>),
        )
        .route(
            "/api/sellers/:seller_id/files/:requirement",
            post(upload_handler::<S>).delete(delete_file_handler::<S>),
        )
        .route(
            "/api/notifications/:feed",
            get(notifications_handler::<S>),
        )
        .with_state(store)
}

fn error_response(error: StoreError) -> Response {
    let status = match &error {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::Unavailable(_) | StoreError::Server { .. } | StoreError::Decode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(success: StatusCode, result: Result<T, StoreError>) -> Response {
    match result {
        Ok(body) => (success, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn parse_requirement(raw: &str) -> Result<RequirementKind, Response> {
    raw.parse::<RequirementKind>()
        .map_err(|err| error_response(StoreError::Invalid(err.to_string())))
}

pub(crate) async fn list_handler<S>(State(store): State<Arc<S>>) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    respond(StatusCode::OK, store.list().await)
}

pub(crate) async fn fetch_handler<S>(
    State(store): State<Arc<S>>,
    Path(seller_id): Path<String>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    let result = store
        .fetch(&SellerId(seller_id))
        .await
        .and_then(|record| record.ok_or(StoreError::NotFound));
    respond(StatusCode::OK, result)
}

pub(crate) async fn register_handler<S>(
    State(store): State<Arc<S>>,
    axum::Json(seller): axum::Json<NewSeller>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    respond(StatusCode::CREATED, store.register(seller).await)
}

pub(crate) async fn status_handler<S>(
    State(store): State<Arc<S>>,
    Path(seller_id): Path<String>,
    axum::Json(update): axum::Json<StatusUpdate>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    respond(
        StatusCode::OK,
        store.update_status(&SellerId(seller_id), update.status).await,
    )
}

pub(crate) async fn check_requirements_handler<S>(
    State(store): State<Arc<S>>,
    Path(seller_id): Path<String>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    respond(
        StatusCode::OK,
        store.check_requirements(&SellerId(seller_id)).await,
    )
}

pub(crate) async fn requirements_handler<S>(
    State(store): State<Arc<S>>,
    Path(seller_id): Path<String>,
    axum::Json(update): axum::Json<RequirementsUpdate>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    respond(
        StatusCode::OK,
        store
            .save_requirements(&SellerId(seller_id), update.requirements)
            .await,
    )
}

pub(crate) async fn upload_handler<S>(
    State(store): State<Arc<S>>,
    Path((seller_id, requirement)): Path<(String, String)>,
    axum::Json(upload): axum::Json<FileUpload>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    let requirement = match parse_requirement(&requirement) {
        Ok(requirement) => requirement,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        store
            .attach_file(&SellerId(seller_id), requirement, upload)
            .await,
    )
}

pub(crate) async fn delete_file_handler<S>(
    State(store): State<Arc<S>>,
    Path((seller_id, requirement)): Path<(String, String)>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    let requirement = match parse_requirement(&requirement) {
        Ok(requirement) => requirement,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        store.detach_file(&SellerId(seller_id), requirement).await,
    )
}

pub(crate) async fn notifications_handler<S>(
    State(store): State<Arc<S>>,
    Path(feed): Path<String>,
) -> Response
where
    S: SellerStore + NotificationSource + 'static,
{
    let Some(feed) = NotificationFeed::ALL
        .into_iter()
        .find(|candidate| candidate.key() == feed)
    else {
        return error_response(StoreError::NotFound);
    };
    respond(StatusCode::OK, store.notifications(feed).await)
}
