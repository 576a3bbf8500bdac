//! Admin routes
//!
//! Login is public; everything under `/students` sits behind the admin
//! gate layer.

use crate::auth::{require_admin, CurrentAdmin};
use crate::error::ApiResult;
use crate::services::{AuthService, StudentService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use student_records_shared::{
    AdminAuthResponse, LoginRequest, MessageResponse, RegisterRequest, StudentProfile,
    StudentSearchQuery, UpdateStudentRequest,
};
use tracing::info;
use uuid::Uuid;

/// Create admin routes
pub fn admin_routes(state: AppState) -> Router<AppState> {
    let students = Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new().route("/login", post(login)).merge(students)
}

/// POST /api/v1/admin/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AdminAuthResponse>> {
    let response = AuthService::login_admin(&state, &req.email, &req.password).await?;
    Ok(Json(response))
}

/// GET /api/v1/admin/students?search=
async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentSearchQuery>,
) -> ApiResult<Json<Vec<StudentProfile>>> {
    let students = StudentService::list(&state, query.search.as_deref()).await?;
    Ok(Json(students))
}

/// POST /api/v1/admin/students
async fn create_student(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<StudentProfile>)> {
    let student = StudentService::create(&state, req).await?;
    info!(admin_id = %admin.id, student_id = %student.id, "Admin created student");
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /api/v1/admin/students/:id
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StudentProfile>> {
    Ok(Json(StudentService::get(&state, id).await?))
}

/// PUT /api/v1/admin/students/:id
async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStudentRequest>,
) -> ApiResult<Json<StudentProfile>> {
    Ok(Json(StudentService::update(&state, id, req).await?))
}

/// DELETE /api/v1/admin/students/:id
async fn delete_student(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    StudentService::delete(&state, id).await?;
    info!(admin_id = %admin.id, student_id = %id, "Admin deleted student");
    Ok(Json(MessageResponse {
        message: "Student deleted".to_string(),
    }))
}
