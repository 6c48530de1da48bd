//! `/cats` handlers.

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;
use spycat_core::{Cat, CatDraft, CatId, CatPatch, CatService, SqliteCatRepository};

fn cat_service(conn: &Connection) -> Result<CatService<SqliteCatRepository<'_>>, ApiError> {
    Ok(CatService::new(SqliteCatRepository::try_new(conn)?))
}

pub async fn list_cats(State(state): State<AppState>) -> Result<Json<Vec<Cat>>, ApiError> {
    state
        .with_conn(|conn| Ok(cat_service(conn)?.list_cats()?))
        .await
        .map(Json)
}

pub async fn create_cat(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<CatDraft>,
) -> Result<(StatusCode, Json<Cat>), ApiError> {
    let breeds = state.breeds().lookup().await;
    let cat = state
        .with_conn(|conn| Ok(cat_service(conn)?.create_cat(&draft, &breeds)?))
        .await?;
    Ok((StatusCode::CREATED, Json(cat)))
}

pub async fn get_cat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CatId>,
) -> Result<Json<Cat>, ApiError> {
    state
        .with_conn(|conn| Ok(cat_service(conn)?.get_cat(id)?))
        .await
        .map(Json)
}

pub async fn replace_cat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CatId>,
    ApiJson(draft): ApiJson<CatDraft>,
) -> Result<Json<Cat>, ApiError> {
    let breeds = state.breeds().lookup().await;
    state
        .with_conn(|conn| Ok(cat_service(conn)?.replace_cat(id, &draft, &breeds)?))
        .await
        .map(Json)
}

pub async fn patch_cat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CatId>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Cat>, ApiError> {
    let patch = cat_patch_from_json(body)?;
    state
        .with_conn(|conn| Ok(cat_service(conn)?.patch_cat(id, &patch)?))
        .await
        .map(Json)
}

pub async fn delete_cat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CatId>,
) -> Result<StatusCode, ApiError> {
    state
        .with_conn(|conn| Ok(cat_service(conn)?.delete_cat(id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Keeps every supplied key so the salary-only guard sees extra fields.
fn cat_patch_from_json(body: Value) -> Result<CatPatch, ApiError> {
    let Value::Object(object) = body else {
        return Err(ApiError::validation("expected a JSON object", None));
    };

    let salary = object
        .get("salary")
        .cloned()
        .map(serde_json::from_value::<Decimal>)
        .transpose()
        .map_err(|err| ApiError::validation(format!("invalid salary: {err}"), Some("salary")))?;

    Ok(CatPatch {
        fields: object.keys().cloned().collect(),
        salary,
    })
}
