//! API models for stored records and request/response payloads

use thiserror::Error;

pub mod balance;
pub mod lesson;
pub mod profile;

pub use balance::{BalanceLogEntry, BalanceOperation, BalanceRequest, BalanceResponse};
pub use lesson::{
    CreateLessonRequest, DeletedResponse, Lesson, LessonResponse, LessonStatus, LessonsResponse,
    UpdateLessonRequest,
};
pub use profile::{
    AssignRequest, AssignmentResponse, ChangeTeacherRequest, Profile, ProfileResponse,
    ProfileView, Role, SigninRequest, SignupRequest, SignupResponse, StudentView,
    StudentsResponse, Subject, TeachersResponse,
};

/// A string that does not name a variant of one of the closed enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: {value}")]
pub struct InvalidValue {
    pub kind: &'static str,
    pub value: String,
}

impl InvalidValue {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
