//! Student routes
//!
//! Self-service registration and login, plus the profile of the
//! authenticated student.

use crate::auth::CurrentStudent;
use crate::error::ApiResult;
use crate::services::{AuthService, StudentService};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use student_records_shared::{
    LoginRequest, RegisterRequest, StudentAuthResponse, StudentProfile, UpdateStudentRequest,
};

/// Create student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
}

/// POST /api/v1/student/register
///
/// Creates the record and logs the student straight in.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<StudentAuthResponse>)> {
    let response = AuthService::register_student(&state, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/student/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<StudentAuthResponse>> {
    let response = AuthService::login_student(&state, &req.email, &req.password).await?;
    Ok(Json(response))
}

/// GET /api/v1/student/profile
async fn get_profile(CurrentStudent(student): CurrentStudent) -> Json<StudentProfile> {
    Json(student.0)
}

/// PUT /api/v1/student/profile
async fn update_profile(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Json(req): Json<UpdateStudentRequest>,
) -> ApiResult<Json<StudentProfile>> {
    let profile = StudentService::update(&state, student.id, req).await?;
    Ok(Json(profile))
}
