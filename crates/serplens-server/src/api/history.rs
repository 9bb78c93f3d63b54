use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use serplens_core::Generation;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct DeleteData {
    pub deleted: bool,
}

/// All archived generations, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let records: Vec<Generation> = {
        let archive = state.archive.lock().await;
        archive.records().to_vec()
    };

    Json(ApiResponse {
        data: records,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub async fn delete_generation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = {
        let mut archive = state.archive.lock().await;
        archive.remove(&id).map_err(|e| {
            tracing::error!(error = %e, "failed to rewrite archive on delete");
            ApiError::new(req_id.0.clone(), "internal_error", "archive write failed")
        })?
    };

    if !removed {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "Generation not found.",
        ));
    }

    Ok(Json(ApiResponse {
        data: DeleteData { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
