use axum::extract::{Path, Query, State};
use axum::Json;

use backend_application::dtos::{
    BattleLogResponse, EnemiesResponse, LoadoutsResponse, MarchesResponse, PairingTrendsResponse,
    PairingsResponse,
};
use backend_application::queries::{
    battle_log_queries, enemy_queries, loadout_queries, march_queries, pairing_queries,
    trend_queries,
};
use backend_application::AppState;
use backend_domain::{PairingQuery, PeriodQuery};

use crate::error::HttpError;

pub async fn list_pairings(
    State(state): State<AppState>,
    Path(governor): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<PairingsResponse>, HttpError> {
    let response = pairing_queries::list_pairings(&state, &governor, query).await?;
    Ok(Json(response))
}

pub async fn pairing_trends(
    State(state): State<AppState>,
    Path(governor): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<PairingTrendsResponse>, HttpError> {
    let response = trend_queries::pairing_trends(&state, &governor, query).await?;
    Ok(Json(response))
}

pub async fn list_enemies(
    State(state): State<AppState>,
    Path(governor): Path<String>,
    Query(query): Query<PairingQuery>,
) -> Result<Json<EnemiesResponse>, HttpError> {
    let response = enemy_queries::list_enemies(&state, &governor, query).await?;
    Ok(Json(response))
}

pub async fn list_loadouts(
    State(state): State<AppState>,
    Path(governor): Path<String>,
    Query(query): Query<PairingQuery>,
) -> Result<Json<LoadoutsResponse>, HttpError> {
    let response = loadout_queries::list_loadouts(&state, &governor, query).await?;
    Ok(Json(response))
}

pub async fn list_marches(
    State(state): State<AppState>,
    Path(governor): Path<String>,
) -> Result<Json<MarchesResponse>, HttpError> {
    let response = march_queries::list_marches(&state, &governor).await?;
    Ok(Json(response))
}

pub async fn battle_log(
    State(state): State<AppState>,
    Path(governor): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<BattleLogResponse>, HttpError> {
    let response = battle_log_queries::battle_log(&state, &governor, query).await?;
    Ok(Json(response))
}
