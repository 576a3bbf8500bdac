//! Authorization gate
//!
//! One gate, parameterised by the role a route requires. Each request is
//! judged independently:
//!
//! `NoToken -> TokenPresent -> SignatureValid -> NotExpired -> RoleOk -> Authorized`
//!
//! Any other branch ends the request with an auth error. A role mismatch on
//! an otherwise valid token is `Forbidden`; everything before it is
//! `Unauthenticated`. The role is checked before any record-store lookup.
//!
//! Routes use the gate either through the [`CurrentStudent`] /
//! [`CurrentAdmin`] extractors or, for whole route groups, the
//! [`require_admin`] layer.

use super::principal::{AdminPrincipal, Principal, StudentPrincipal};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use student_records_shared::{AuthError, Role};
use tracing::debug;

/// Extract the bearer token from the `Authorization` header
///
/// Runs before any token parsing: a missing header is `MissingToken`,
/// anything other than `Bearer <token>` is `MalformedHeader`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Run the gate for a route requiring `required`
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    required: Role,
) -> Result<Principal, ApiError> {
    let result = authorize_inner(state, headers, required).await;

    if let Err(ApiError::Auth(err)) = &result {
        debug!(reason = err.reason(), required = %required, "Request rejected by auth gate");
        metrics::counter!("auth_gate_rejections_total", "reason" => err.reason()).increment(1);
    }
    result
}

async fn authorize_inner(
    state: &AppState,
    headers: &HeaderMap,
    required: Role,
) -> Result<Principal, ApiError> {
    let token = bearer_token(headers)?;
    let claims = state.jwt().verify(token)?;

    if claims.role() != required {
        return Err(AuthError::Forbidden.into());
    }

    state.resolver().resolve(&claims).await
}

/// Authenticated student, loaded from the record store
///
/// Rejects with 401 for missing/invalid/expired tokens or a deleted
/// account, and 403 for a valid admin token.
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub StudentPrincipal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentStudent
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        match authorize(&app_state, &parts.headers, Role::Student).await? {
            Principal::Student(student) => Ok(CurrentStudent(student)),
            Principal::Admin(_) => Err(AuthError::Forbidden.into()),
        }
    }
}

/// Authenticated admin
///
/// Reuses the principal attached by [`require_admin`] when the route
/// group is already gated.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminPrincipal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AdminPrincipal>() {
            return Ok(CurrentAdmin(admin.clone()));
        }

        let app_state = AppState::from_ref(state);
        match authorize(&app_state, &parts.headers, Role::Admin).await? {
            Principal::Admin(admin) => Ok(CurrentAdmin(admin)),
            Principal::Student(_) => Err(AuthError::Forbidden.into()),
        }
    }
}

/// Layer form of the admin gate for whole route groups
///
/// Attaches the [`AdminPrincipal`] to the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match authorize(&state, request.headers(), Role::Admin).await? {
        Principal::Admin(admin) => {
            request.extensions_mut().insert(admin);
            Ok(next.run(request).await)
        }
        Principal::Student(_) => Err(AuthError::Forbidden.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use crate::config::AppConfig;
    use crate::repositories::NewStudent;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    fn bearer(token: &str) -> HeaderMap {
        headers_with(Some(&format!("Bearer {}", token)))
    }

    async fn state_with_student() -> (AppState, Uuid) {
        let state = AppState::in_memory(AppConfig::default());
        let record = state
            .students()
            .create(NewStudent {
                name: "Alice".to_string(),
                age: 15,
                class: 10,
                admission_number: "A-1".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "$2b$04$hash".to_string(),
                profile_pic: String::new(),
            })
            .await
            .unwrap();
        (state, record.id)
    }

    #[rstest]
    #[case(None, AuthError::MissingToken)]
    #[case(Some("Basic dXNlcjpwYXNz"), AuthError::MalformedHeader)]
    #[case(Some("Bearer"), AuthError::MalformedHeader)]
    #[case(Some("Bearer "), AuthError::MalformedHeader)]
    #[case(Some("bearer abc.def.ghi"), AuthError::MalformedHeader)]
    #[case(Some("Bearer abc def"), AuthError::MalformedHeader)]
    #[case(Some("abc.def.ghi"), AuthError::MalformedHeader)]
    fn test_bearer_token_rejections(#[case] header: Option<&str>, #[case] expected: AuthError) {
        assert_eq!(bearer_token(&headers_with(header)), Err(expected));
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&bearer("abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_student_token_authorized_as_student() {
        let (state, id) = state_with_student().await;
        let token = state.jwt().issue(Claims::student(id), Duration::hours(1)).unwrap();

        let principal = authorize(&state, &bearer(&token), Role::Student).await.unwrap();
        match principal {
            Principal::Student(student) => assert_eq!(student.email, "alice@x.com"),
            other => panic!("expected student principal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_student_token_forbidden_on_admin_gate() {
        let (state, id) = state_with_student().await;
        let token = state.jwt().issue(Claims::student(id), Duration::hours(1)).unwrap();

        let err = authorize(&state, &bearer(&token), Role::Admin).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Forbidden)));

        let err = authorize(&state, &HeaderMap::new(), Role::Admin).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn test_admin_token_forbidden_on_student_gate() {
        let state = AppState::in_memory(AppConfig::default());
        let token = state
            .jwt()
            .issue(Claims::admin(Uuid::new_v4(), "admin@school.test"), Duration::hours(1))
            .unwrap();

        let err = authorize(&state, &bearer(&token), Role::Student).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Forbidden)));

        let principal = authorize(&state, &bearer(&token), Role::Admin).await.unwrap();
        assert_eq!(principal.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_expired_token_unauthenticated() {
        let (state, id) = state_with_student().await;
        let token = state
            .jwt()
            .issue_at(Claims::student(id), Duration::hours(1), Utc::now() - Duration::hours(2))
            .unwrap();

        let err = authorize(&state, &bearer(&token), Role::Student).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::TokenExpired)));
    }

    #[test]
    fn test_rejections_are_counted_by_reason() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let (state, id) = state_with_student().await;
                let token = state.jwt().issue(Claims::student(id), Duration::hours(1)).unwrap();

                assert!(authorize(&state, &HeaderMap::new(), Role::Student).await.is_err());
                assert!(authorize(&state, &bearer(&token), Role::Admin).await.is_err());
                assert!(authorize(&state, &bearer(&token), Role::Admin).await.is_err());
                assert!(authorize(&state, &bearer(&token), Role::Student).await.is_ok());
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"auth_gate_rejections_total{reason="missing_token"} 1"#));
        assert!(rendered.contains(r#"auth_gate_rejections_total{reason="forbidden"} 2"#));
        assert!(!rendered.contains("malformed_header"));
    }

    #[tokio::test]
    async fn test_deleted_student_unauthenticated() {
        let (state, id) = state_with_student().await;
        let token = state.jwt().issue(Claims::student(id), Duration::hours(1)).unwrap();
        state.students().delete(id).await.unwrap();

        let err = authorize(&state, &bearer(&token), Role::Student).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::NotFound)));
        assert!(err.auth_error().unwrap().is_unauthenticated());
    }
}
