//! Turns verified token claims into a loaded principal

use super::jwt::TokenClaims;
use super::principal::{AdminPrincipal, Principal, StudentPrincipal};
use crate::error::ApiResult;
use crate::repositories::StudentStore;
use std::sync::Arc;
use student_records_shared::{AuthError, Role};
use uuid::Uuid;

/// Principal resolver
///
/// Students are loaded from the record store on every resolution, so a
/// deleted record stops resolving even while its tokens are unexpired.
/// The admin is trusted on the strength of the signed role claim.
#[derive(Clone)]
pub struct PrincipalResolver {
    students: Arc<dyn StudentStore>,
}

impl PrincipalResolver {
    pub fn new(students: Arc<dyn StudentStore>) -> Self {
        Self { students }
    }

    /// Load a student principal; `AuthError::NotFound` if the record is gone
    pub async fn resolve_student(&self, id: Uuid) -> ApiResult<StudentPrincipal> {
        let record = self
            .students
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(StudentPrincipal(record.to_profile()))
    }

    /// Rebuild the admin principal from its claims without a store lookup
    pub fn resolve_admin(claims: &TokenClaims) -> Result<AdminPrincipal, AuthError> {
        if claims.role() != Role::Admin {
            return Err(AuthError::Forbidden);
        }

        Ok(AdminPrincipal {
            id: claims.subject_id()?,
            email: claims.claims.email.clone(),
        })
    }

    /// Resolve whichever principal the claims describe
    pub async fn resolve(&self, claims: &TokenClaims) -> ApiResult<Principal> {
        match claims.role() {
            Role::Student => {
                let id = claims.subject_id()?;
                Ok(Principal::Student(self.resolve_student(id).await?))
            }
            Role::Admin => Ok(Principal::Admin(Self::resolve_admin(claims)?)),
        }
    }
}
