//! `/targets` handlers. Targets are created and pruned through their
//! mission; here they are only read and updated.

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use rusqlite::Connection;
use spycat_core::{SqliteMissionRepository, Target, TargetChanges, TargetId, TargetService};

fn target_service(
    conn: &mut Connection,
) -> Result<TargetService<SqliteMissionRepository<'_>>, ApiError> {
    Ok(TargetService::new(SqliteMissionRepository::try_new(conn)?))
}

pub async fn get_target(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TargetId>,
) -> Result<Json<Target>, ApiError> {
    state
        .with_conn(|conn| Ok(target_service(conn)?.get_target(id)?))
        .await
        .map(Json)
}

pub async fn replace_target(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TargetId>,
    ApiJson(changes): ApiJson<TargetChanges>,
) -> Result<Json<Target>, ApiError> {
    update(state, id, changes, false).await
}

pub async fn patch_target(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TargetId>,
    ApiJson(changes): ApiJson<TargetChanges>,
) -> Result<Json<Target>, ApiError> {
    update(state, id, changes, true).await
}

async fn update(
    state: AppState,
    id: TargetId,
    changes: TargetChanges,
    partial: bool,
) -> Result<Json<Target>, ApiError> {
    state
        .with_conn(|conn| Ok(target_service(conn)?.update_target(id, &changes, partial)?))
        .await
        .map(Json)
}
