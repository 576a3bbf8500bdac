//! Authentication service: login, registration and admin provisioning
//!
//! Both login failure branches (unknown email, wrong password) do one
//! password verification and return the same `InvalidCredentials` error,
//! so neither the payload nor the timing reveals whether an account exists.

use super::student::{normalize_email, StudentService};
use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::repositories::StoreError;
use crate::state::AppState;
use chrono::Duration;
use student_records_shared::validation::{validate_email, validate_password};
use student_records_shared::{
    AdminAuthResponse, AdminProfile, AuthError, RegisterRequest, Role, StudentAuthResponse,
};
use tracing::{info, warn};

const TOKEN_TYPE: &str = "Bearer";

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Student login; issues a login-TTL token
    pub async fn login_student(
        state: &AppState,
        email: &str,
        password: &str,
    ) -> ApiResult<StudentAuthResponse> {
        let email = normalize_email(email);

        let Some(record) = state.students().find_by_email(&email).await? else {
            state.passwords().verify_dummy_async(password.to_string()).await;
            return Err(login_failed(Role::Student));
        };

        check_password(state, Role::Student, password, &record.password_hash).await?;

        let ttl = state.config().jwt.login_token_ttl_secs;
        let token = state
            .jwt()
            .issue(Claims::student(record.id), Duration::seconds(ttl))?;

        record_login(Role::Student, "success");
        info!(student_id = %record.id, "Student logged in");

        Ok(StudentAuthResponse {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: ttl,
            student: record.to_profile(),
        })
    }

    /// Admin login; always checked against the stored hash
    pub async fn login_admin(
        state: &AppState,
        email: &str,
        password: &str,
    ) -> ApiResult<AdminAuthResponse> {
        let email = normalize_email(email);

        let Some(record) = state.admins().find_by_email(&email).await? else {
            state.passwords().verify_dummy_async(password.to_string()).await;
            return Err(login_failed(Role::Admin));
        };

        check_password(state, Role::Admin, password, &record.password_hash).await?;

        let ttl = state.config().jwt.login_token_ttl_secs;
        let token = state
            .jwt()
            .issue(Claims::admin(record.id, record.email.clone()), Duration::seconds(ttl))?;

        record_login(Role::Admin, "success");
        info!(admin_id = %record.id, "Admin logged in");

        Ok(AdminAuthResponse {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: ttl,
            admin: AdminProfile {
                id: record.id,
                email: Some(record.email),
            },
        })
    }

    /// Self-service student registration with auto-login
    ///
    /// The returned token uses the registration TTL.
    pub async fn register_student(
        state: &AppState,
        req: RegisterRequest,
    ) -> ApiResult<StudentAuthResponse> {
        let record = StudentService::create_record(state, req).await?;

        let ttl = state.config().jwt.registration_token_ttl_secs;
        let token = state
            .jwt()
            .issue(Claims::student(record.id), Duration::seconds(ttl))?;

        metrics::counter!("auth_registrations_total").increment(1);

        Ok(StudentAuthResponse {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: ttl,
            student: record.to_profile(),
        })
    }

    /// One-time admin bootstrap
    ///
    /// Refuses once any admin record exists. The count check skips the
    /// hashing cost; the store's insert settles concurrent calls.
    pub async fn provision_admin(
        state: &AppState,
        email: &str,
        password: &str,
    ) -> ApiResult<AdminProfile> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        if state.admins().count().await? > 0 {
            return Err(admin_exists());
        }

        let password_hash = state.passwords().hash_async(password.to_string()).await?;
        let record = match state.admins().create_first(&email, &password_hash).await {
            Ok(record) => record,
            Err(StoreError::Duplicate(_)) => return Err(admin_exists()),
            Err(err) => return Err(err.into()),
        };

        info!(admin_id = %record.id, "Admin account provisioned");
        Ok(AdminProfile {
            id: record.id,
            email: Some(record.email),
        })
    }
}

async fn check_password(
    state: &AppState,
    role: Role,
    password: &str,
    digest: &str,
) -> ApiResult<()> {
    match state
        .passwords()
        .verify_async(password.to_string(), digest.to_string())
        .await
    {
        Ok(true) => Ok(()),
        Ok(false) => Err(login_failed(role)),
        Err(err) => {
            record_login(role, "error");
            Err(err)
        }
    }
}

fn admin_exists() -> ApiError {
    warn!("Refusing to provision a second admin account");
    AuthError::AlreadyExists("Admin".to_string()).into()
}

fn login_failed(role: Role) -> ApiError {
    record_login(role, "invalid_credentials");
    AuthError::InvalidCredentials.into()
}

fn record_login(role: Role, outcome: &'static str) {
    metrics::counter!(
        "auth_login_attempts_total",
        "role" => role.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::response::IntoResponse;

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        AppState::in_memory(config)
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            age: 15,
            class: 10,
            admission_number: "A-1".to_string(),
            email: "alice@x.com".to_string(),
            password: "Passw0rd".to_string(),
            profile_pic: None,
        }
    }

    async fn error_body(err: ApiError) -> String {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = test_state();
        let registered = AuthService::register_student(&state, alice()).await.unwrap();
        assert_eq!(registered.expires_in, 86400);
        assert_eq!(registered.token_type, "Bearer");

        let claims = state.jwt().verify(&registered.token).unwrap();
        assert_eq!(claims.subject_id().unwrap(), registered.student.id);
        assert_eq!(claims.exp - claims.iat, 86400);

        let login = AuthService::login_student(&state, " Alice@X.com", "Passw0rd")
            .await
            .unwrap();
        assert_eq!(login.expires_in, 3600);
        assert_eq!(login.student.id, registered.student.id);
        let claims = state.jwt().verify(&login.token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.role(), Role::Student);
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_record() {
        let state = test_state();
        let first = AuthService::register_student(&state, alice()).await.unwrap();

        let mut second = alice();
        second.admission_number = "A-2".to_string();
        second.password = "Different1".to_string();
        let err = AuthService::register_student(&state, second).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::AlreadyExists(_))));

        let stored = state.students().find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.student.id);
        assert!(AuthService::login_student(&state, "alice@x.com", "Passw0rd").await.is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = test_state();
        AuthService::register_student(&state, alice()).await.unwrap();

        let unknown = AuthService::login_student(&state, "nobody@x.com", "Passw0rd")
            .await
            .unwrap_err();
        let wrong = AuthService::login_student(&state, "alice@x.com", "wrong-password")
            .await
            .unwrap_err();

        assert!(matches!(unknown, ApiError::Auth(AuthError::InvalidCredentials)));
        assert!(matches!(wrong, ApiError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(error_body(unknown).await, error_body(wrong).await);
    }

    #[tokio::test]
    async fn test_admin_login_verifies_stored_hash() {
        let state = test_state();
        let admin = AuthService::provision_admin(&state, "admin@school.test", "Adm1nPassword")
            .await
            .unwrap();

        let err = AuthService::login_admin(&state, "admin@school.test", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)));

        let login = AuthService::login_admin(&state, "admin@school.test", "Adm1nPassword")
            .await
            .unwrap();
        assert_eq!(login.admin.id, admin.id);
        let claims = state.jwt().verify(&login.token).unwrap();
        assert_eq!(claims.role(), Role::Admin);
        assert_eq!(claims.claims.email.as_deref(), Some("admin@school.test"));
    }

    #[tokio::test]
    async fn test_admin_and_student_credentials_are_separate() {
        let state = test_state();
        AuthService::register_student(&state, alice()).await.unwrap();

        let err = AuthService::login_admin(&state, "alice@x.com", "Passw0rd")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_provision_admin_only_once() {
        let state = test_state();
        AuthService::provision_admin(&state, "admin@school.test", "Adm1nPassword")
            .await
            .unwrap();

        let err = AuthService::provision_admin(&state, "other@school.test", "Adm1nPassword")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::AlreadyExists(_))));
        assert_eq!(state.admins().count().await.unwrap(), 1);
    }

    fn login_counter(rendered: &str, role: &str, outcome: &str) -> Option<u64> {
        rendered
            .lines()
            .filter(|line| line.starts_with("auth_login_attempts_total{"))
            .filter(|line| line.contains(&format!(r#"role="{}""#, role)))
            .find(|line| line.contains(&format!(r#"outcome="{}""#, outcome)))
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn test_login_outcomes_are_counted() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let state = test_state();
                AuthService::register_student(&state, alice()).await.unwrap();

                AuthService::login_student(&state, "alice@x.com", "Passw0rd").await.unwrap();
                AuthService::login_student(&state, "alice@x.com", "wrong-password")
                    .await
                    .unwrap_err();
                AuthService::login_student(&state, "nobody@x.com", "Passw0rd")
                    .await
                    .unwrap_err();
                AuthService::login_admin(&state, "alice@x.com", "Passw0rd")
                    .await
                    .unwrap_err();
            });
        });

        let rendered = handle.render();
        assert_eq!(login_counter(&rendered, "student", "success"), Some(1));
        assert_eq!(login_counter(&rendered, "student", "invalid_credentials"), Some(2));
        assert_eq!(login_counter(&rendered, "admin", "invalid_credentials"), Some(1));
        assert_eq!(login_counter(&rendered, "admin", "success"), None);
        assert!(rendered.contains("auth_registrations_total 1"));
    }

    #[tokio::test]
    async fn test_concurrent_provisioning_creates_one_admin() {
        let state = test_state();
        let (first, second) = tokio::join!(
            AuthService::provision_admin(&state, "one@school.test", "Adm1nPassword"),
            AuthService::provision_admin(&state, "two@school.test", "Adm1nPassword"),
        );

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        let loser = first.err().or(second.err()).unwrap();
        assert_eq!(
            loser.auth_error(),
            Some(&AuthError::AlreadyExists("Admin".to_string()))
        );
        assert_eq!(state.admins().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_hash_fails_login_generically() {
        let state = test_state();
        state
            .admins()
            .create_first("admin@school.test", "not-a-hash")
            .await
            .unwrap();

        let err = AuthService::login_admin(&state, "admin@school.test", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::CorruptCredential)));

        let invalid = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(error_body(err).await, error_body(invalid).await);
    }
}
