//! Teacher/subject assignment

use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{AssignRequest, ChangeTeacherRequest, Profile, Subject},
    policy::{Action, Actor, Scope},
    services::{load_student, load_teacher},
    state::AppState,
};

/// Assign a student to a teacher and subject
///
/// A teacher always assigns to themself and can only pick up unassigned
/// students or their own. An admin may name any teacher or admin,
/// defaulting to themself.
pub async fn assign_student(
    state: &AppState,
    actor: &Actor,
    student_id: &str,
    req: AssignRequest,
) -> ApiResult<Profile> {
    let scope = actor.authorize(Action::AssignStudent)?;
    let subject: Subject = req.subject.parse()?;
    let mut student = load_student(state, student_id).await?;
    actor.ensure_student(Action::AssignStudent, &student)?;

    let teacher_id = match (scope, req.teacher_id.filter(|id| !id.is_empty())) {
        (Scope::All, Some(teacher_id)) if teacher_id != actor.id => {
            load_teacher(state, &teacher_id).await?;
            teacher_id
        }
        _ => actor.id.clone(),
    };

    student.teacher = Some(teacher_id);
    student.subject = Some(subject);
    state.profiles.save(&student).await?;

    info!(
        student_id = %student.id,
        teacher_id = student.teacher.as_deref().unwrap_or_default(),
        subject = subject.as_str(),
        actor = %actor.id,
        "student assigned"
    );
    Ok(student)
}

/// Move a student to another teacher; admin only
pub async fn change_teacher(
    state: &AppState,
    actor: &Actor,
    student_id: &str,
    req: ChangeTeacherRequest,
) -> ApiResult<Profile> {
    actor.authorize(Action::ChangeTeacher)?;
    let subject: Subject = req.subject.parse()?;
    let teacher_id = req
        .teacher_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::invalid("teacherId is required"))?;
    let mut student = load_student(state, student_id).await?;
    actor.ensure_student(Action::ChangeTeacher, &student)?;
    load_teacher(state, &teacher_id).await?;

    let previous = student.teacher.replace(teacher_id);
    student.subject = Some(subject);
    state.profiles.save(&student).await?;

    info!(
        student_id = %student.id,
        from = previous.as_deref().unwrap_or("none"),
        to = student.teacher.as_deref().unwrap_or_default(),
        "teacher changed"
    );
    Ok(student)
}
