use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub username: String,
}

/// Verifies dashboard credentials against the injected credential table.
/// The failure message never distinguishes unknown users from bad
/// passwords.
pub async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.auth.verify(&request.username, &request.password) {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "Invalid credentials.",
        ));
    }

    Ok(Json(ApiResponse {
        data: LoginData {
            username: request.username,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
