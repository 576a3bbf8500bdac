//! Authenticated identities attached to requests

use std::ops::Deref;
use student_records_shared::{Role, StudentProfile};
use uuid::Uuid;

/// A student resolved from a verified token and a live credential record
#[derive(Debug, Clone, PartialEq)]
pub struct StudentPrincipal(pub StudentProfile);

impl Deref for StudentPrincipal {
    type Target = StudentProfile;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The admin, reconstructed from verified token claims alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Either kind of authenticated identity
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Student(StudentPrincipal),
    Admin(AdminPrincipal),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Student(_) => Role::Student,
            Principal::Admin(_) => Role::Admin,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Principal::Student(student) => student.id,
            Principal::Admin(admin) => admin.id,
        }
    }
}
