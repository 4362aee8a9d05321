//! Student and teacher listings

use std::collections::HashMap;

use crate::{
    error::ApiResult,
    models::{Profile, StudentView, StudentsResponse},
    policy::{Action, Actor},
    state::AppState,
};

/// Students visible to the actor plus every unassigned student
pub async fn list_students(state: &AppState, actor: &Actor) -> ApiResult<StudentsResponse> {
    let scope = actor.authorize(Action::ListStudents)?;
    let profiles = state.profiles.list().await?;

    let teacher_names: HashMap<&str, &str> = profiles
        .iter()
        .filter(|p| p.role.is_staff())
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();
    let view = |profile: &Profile| StudentView {
        teacher_name: profile
            .teacher
            .as_deref()
            .and_then(|id| teacher_names.get(id))
            .map(|name| name.to_string()),
        profile: profile.clone(),
    };

    let students: Vec<&Profile> = profiles.iter().filter(|p| p.is_student()).collect();
    Ok(StudentsResponse {
        students: students
            .iter()
            .filter(|p| actor.can_touch_student(scope, Action::ListStudents, p))
            .map(|p| view(*p))
            .collect(),
        new_students: students
            .iter()
            .filter(|p| p.is_unassigned())
            .map(|p| view(*p))
            .collect(),
    })
}

/// Teachers and admins, for the admin's assignment screen
pub async fn list_teachers(state: &AppState, actor: &Actor) -> ApiResult<Vec<Profile>> {
    actor.authorize(Action::ListTeachers)?;
    Ok(state.profiles.list_staff().await?)
}
