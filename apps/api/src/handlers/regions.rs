use axum::Json;
use axum::extract::{Path, State};
use butik_application::ports::Region;

use crate::dto::RegionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn provinces_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RegionResponse>>> {
    let regions = state.region_directory.provinces().await?;

    Ok(Json(to_responses(regions)))
}

pub async fn regencies_handler(
    State(state): State<AppState>,
    Path(province_id): Path<String>,
) -> ApiResult<Json<Vec<RegionResponse>>> {
    let regions = state.region_directory.regencies(&province_id).await?;

    Ok(Json(to_responses(regions)))
}

pub async fn districts_handler(
    State(state): State<AppState>,
    Path(regency_id): Path<String>,
) -> ApiResult<Json<Vec<RegionResponse>>> {
    let regions = state.region_directory.districts(&regency_id).await?;

    Ok(Json(to_responses(regions)))
}

pub async fn villages_handler(
    State(state): State<AppState>,
    Path(district_id): Path<String>,
) -> ApiResult<Json<Vec<RegionResponse>>> {
    let regions = state.region_directory.villages(&district_id).await?;

    Ok(Json(to_responses(regions)))
}

fn to_responses(regions: Vec<Region>) -> Vec<RegionResponse> {
    regions
        .into_iter()
        .map(|region| RegionResponse {
            id: region.id,
            name: region.name,
        })
        .collect()
}
