//! Operations behind the HTTP routes
//!
//! Each function authorizes the actor through the role policy, validates
//! its input and then reads/writes through the repositories. Writes are
//! plain overwrites: concurrent updates of the same record race and the
//! last writer wins.

use crate::{
    error::{ApiError, ApiResult},
    models::Profile,
    state::AppState,
};

pub mod accounts;
pub mod assignment;
pub mod balance;
pub mod directory;
pub mod lessons;

/// Reject ids that would break the `:`-separated key layout
pub(crate) fn check_key_segment(field: &str, id: &str) -> ApiResult<()> {
    if id.is_empty() {
        return Err(ApiError::invalid(format!("{} is required", field)));
    }
    if id.contains(':') {
        return Err(ApiError::invalid(format!("{} must not contain ':'", field)));
    }
    Ok(())
}

/// Load a profile that must exist and belong to a student
pub(crate) async fn load_student(state: &AppState, student_id: &str) -> ApiResult<Profile> {
    check_key_segment("studentId", student_id)?;
    state
        .profiles
        .get(student_id)
        .await?
        .filter(Profile::is_student)
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

/// Load a profile that must exist and be a teacher or admin
pub(crate) async fn load_teacher(state: &AppState, teacher_id: &str) -> ApiResult<Profile> {
    check_key_segment("teacherId", teacher_id)?;
    state
        .profiles
        .get(teacher_id)
        .await?
        .filter(|p| p.role.is_staff())
        .ok_or_else(|| ApiError::not_found("Teacher not found"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_segment() {
        assert!(check_key_segment("studentId", "s1").is_ok());
        assert!(matches!(
            check_key_segment("studentId", "s1:evil"),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(check_key_segment("studentId", "").is_err());
    }
}
