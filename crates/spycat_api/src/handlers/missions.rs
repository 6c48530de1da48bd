//! `/missions` handlers.

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::Deserialize;
use spycat_core::{
    CatId, Mission, MissionChanges, MissionDraft, MissionId, MissionService,
    SqliteMissionRepository,
};

#[derive(Debug, Deserialize)]
pub struct AssignCatRequest {
    pub cat_id: CatId,
}

fn mission_service(
    conn: &mut Connection,
) -> Result<MissionService<SqliteMissionRepository<'_>>, ApiError> {
    Ok(MissionService::new(SqliteMissionRepository::try_new(conn)?))
}

pub async fn list_missions(State(state): State<AppState>) -> Result<Json<Vec<Mission>>, ApiError> {
    state
        .with_conn(|conn| Ok(mission_service(conn)?.list_missions()?))
        .await
        .map(Json)
}

pub async fn create_mission(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<MissionDraft>,
) -> Result<(StatusCode, Json<Mission>), ApiError> {
    let mission = state
        .with_conn(|conn| Ok(mission_service(conn)?.create_mission(&draft)?))
        .await?;
    Ok((StatusCode::CREATED, Json(mission)))
}

pub async fn get_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MissionId>,
) -> Result<Json<Mission>, ApiError> {
    state
        .with_conn(|conn| Ok(mission_service(conn)?.get_mission(id)?))
        .await
        .map(Json)
}

/// PUT: `targets` is required and becomes the complete target set.
pub async fn replace_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MissionId>,
    ApiJson(changes): ApiJson<MissionChanges>,
) -> Result<Json<Mission>, ApiError> {
    update(state, id, changes, false).await
}

pub async fn patch_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MissionId>,
    ApiJson(changes): ApiJson<MissionChanges>,
) -> Result<Json<Mission>, ApiError> {
    update(state, id, changes, true).await
}

async fn update(
    state: AppState,
    id: MissionId,
    changes: MissionChanges,
    partial: bool,
) -> Result<Json<Mission>, ApiError> {
    state
        .with_conn(|conn| Ok(mission_service(conn)?.update_mission(id, &changes, partial)?))
        .await
        .map(Json)
}

pub async fn delete_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MissionId>,
) -> Result<StatusCode, ApiError> {
    state
        .with_conn(|conn| Ok(mission_service(conn)?.delete_mission(id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_cat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<MissionId>,
    ApiJson(request): ApiJson<AssignCatRequest>,
) -> Result<Json<Mission>, ApiError> {
    state
        .with_conn(|conn| Ok(mission_service(conn)?.assign_cat(id, request.cat_id)?))
        .await
        .map(Json)
}
