use axum::{
    extract::{Query, State},
    response::Redirect,
};

use crate::{
    dto::media::MediaQuery,
    error::{AppError, AppResult},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/media",
    params(
        ("name" = String, Query, description = "Stored image URL")
    ),
    responses(
        (status = 307, description = "Redirect to the hosted image"),
        (status = 404, description = "Name is blank or not a hosted asset URL")
    ),
    tag = "Media"
)]
pub async fn load_media(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> AppResult<Redirect> {
    let resource = state
        .storage
        .load_as_resource(&query.name)
        .ok_or(AppError::NotFound)?;
    Ok(Redirect::temporary(resource.url().as_str()))
}
