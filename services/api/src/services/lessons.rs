//! Lesson scheduling

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CreateLessonRequest, Lesson, LessonStatus, Role, UpdateLessonRequest, lesson::hhmm,
    },
    policy::{Action, Actor},
    services::{check_key_segment, load_teacher},
    state::AppState,
};

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("Invalid date: {}", value)))
}

fn parse_time(value: &str) -> ApiResult<NaiveTime> {
    hhmm::parse(value).ok_or_else(|| ApiError::invalid(format!("Invalid time: {}", value)))
}

/// Treat empty strings as absent, like an unset form field
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| (a.date, a.time, &a.id).cmp(&(b.date, b.time, &b.id)));
}

/// Schedule a lesson
///
/// The student defaults to the actor and the teacher is the actor unless an
/// admin names someone else.
pub async fn create_lesson(
    state: &AppState,
    actor: &Actor,
    req: CreateLessonRequest,
) -> ApiResult<Lesson> {
    actor.authorize(Action::CreateLesson)?;

    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::invalid("Title is required"));
    }
    let date = parse_date(req.date.trim())?;
    let time = parse_time(req.time.trim())?;

    let student_id = provided(req.student_id).unwrap_or_else(|| actor.id.clone());
    check_key_segment("studentId", &student_id)?;
    let teacher_id = provided(req.teacher_id).unwrap_or_else(|| actor.id.clone());

    let lesson = Lesson {
        id: Uuid::new_v4().to_string(),
        title,
        date,
        time,
        student_id,
        teacher_id,
        description: req.description.unwrap_or_default(),
        status: LessonStatus::Scheduled,
        created_at: Utc::now(),
        updated_at: None,
    };
    // a teacher may only schedule lessons they teach
    actor.ensure_lesson(Action::CreateLesson, &lesson)?;
    if lesson.teacher_id != actor.id {
        load_teacher(state, &lesson.teacher_id).await?;
    }

    state.lessons.save(&lesson).await?;

    info!(
        lesson_id = %lesson.id,
        student_id = %lesson.student_id,
        teacher_id = %lesson.teacher_id,
        "lesson created"
    );
    Ok(lesson)
}

/// Lessons visible to the actor, ordered by date and time
pub async fn list_lessons(state: &AppState, actor: &Actor) -> ApiResult<Vec<Lesson>> {
    let scope = actor.authorize(Action::ListLessons)?;

    let mut lessons = match actor.role {
        Role::Student => state.lessons.list_for_student(&actor.id).await?,
        Role::Teacher | Role::Admin => state.lessons.list_all().await?,
    };
    lessons.retain(|lesson| actor.can_see_lesson(scope, lesson));
    sort_lessons(&mut lessons);
    Ok(lessons)
}

/// One lesson by id
pub async fn get_lesson(state: &AppState, actor: &Actor, lesson_id: &str) -> ApiResult<Lesson> {
    actor.authorize(Action::ViewLesson)?;

    let lesson = match actor.role {
        Role::Student => {
            state
                .lessons
                .find_for_student(&actor.id, lesson_id)
                .await?
        }
        Role::Teacher | Role::Admin => state.lessons.find_by_id(lesson_id).await?,
    }
    .ok_or_else(|| ApiError::not_found("Lesson not found"))?;

    actor.ensure_lesson(Action::ViewLesson, &lesson)?;
    Ok(lesson)
}

async fn find_lesson(state: &AppState, lesson_id: &str) -> ApiResult<Lesson> {
    state
        .lessons
        .find_by_id(lesson_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))
}

/// Edit a lesson; re-keys it when the student changes
pub async fn update_lesson(
    state: &AppState,
    actor: &Actor,
    lesson_id: &str,
    req: UpdateLessonRequest,
) -> ApiResult<Lesson> {
    actor.authorize(Action::UpdateLesson)?;
    let current = find_lesson(state, lesson_id).await?;
    actor.ensure_lesson(Action::UpdateLesson, &current)?;

    let mut updated = current.clone();
    if let Some(title) = provided(req.title) {
        updated.title = title.trim().to_string();
    }
    if let Some(date) = provided(req.date) {
        updated.date = parse_date(date.trim())?;
    }
    if let Some(time) = provided(req.time) {
        updated.time = parse_time(time.trim())?;
    }
    if let Some(status) = provided(req.status) {
        updated.status = status.trim().parse()?;
    }
    if let Some(description) = req.description {
        updated.description = description;
    }
    if let Some(student_id) = provided(req.student_id) {
        check_key_segment("studentId", &student_id)?;
        updated.student_id = student_id;
    }
    if let Some(teacher_id) = provided(req.teacher_id) {
        updated.teacher_id = teacher_id;
    }
    // the result must still belong to the actor
    actor.ensure_lesson(Action::UpdateLesson, &updated)?;
    if updated.teacher_id != current.teacher_id {
        load_teacher(state, &updated.teacher_id).await?;
    }
    updated.updated_at = Some(Utc::now());

    if updated.student_id != current.student_id {
        state.lessons.move_to_student(&current, &updated).await?;
    } else {
        state.lessons.save(&updated).await?;
    }

    info!(lesson_id = %updated.id, status = %updated.status, actor = %actor.id, "lesson updated");
    Ok(updated)
}

/// Remove a lesson
pub async fn delete_lesson(state: &AppState, actor: &Actor, lesson_id: &str) -> ApiResult<()> {
    actor.authorize(Action::DeleteLesson)?;
    let lesson = find_lesson(state, lesson_id).await?;
    actor.ensure_lesson(Action::DeleteLesson, &lesson)?;

    state.lessons.delete(&lesson).await?;

    info!(lesson_id = %lesson.id, actor = %actor.id, "lesson deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    fn intro(student_id: Option<&str>) -> CreateLessonRequest {
        CreateLessonRequest {
            title: "Intro".to_string(),
            date: "2025-01-10".to_string(),
            time: "10:00".to_string(),
            student_id: student_id.map(str::to_string),
            ..CreateLessonRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_as_teacher() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;

        let lesson = create_lesson(&state, &teacher, intro(Some("s1"))).await.unwrap();
        assert_eq!(lesson.teacher_id, "t1");
        assert_eq!(lesson.student_id, "s1");
        assert_eq!(lesson.status, LessonStatus::Scheduled);
        assert!(lesson.updated_at.is_none());
        assert_eq!(
            state.lessons.get("s1", &lesson.id).await.unwrap(),
            Some(lesson)
        );
    }

    #[tokio::test]
    async fn test_create_defaults_student_to_actor() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;

        let lesson = create_lesson(&state, &teacher, intro(None)).await.unwrap();
        assert_eq!(lesson.student_id, "t1");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;
        let student = testing::seed(&state, "s1", Role::Student).await;

        let err = create_lesson(&state, &student, intro(Some("s1"))).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        for req in [
            CreateLessonRequest { title: " ".into(), ..intro(None) },
            CreateLessonRequest { date: "10/01/2025".into(), ..intro(None) },
            CreateLessonRequest { date: "2025-02-30".into(), ..intro(None) },
            CreateLessonRequest { time: "10am".into(), ..intro(None) },
            CreateLessonRequest { time: "10:00:30".into(), ..intro(None) },
            intro(Some("s1:x")),
        ] {
            let err = create_lesson(&state, &teacher, req).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)));
        }

        let err = create_lesson(
            &state,
            &teacher,
            CreateLessonRequest {
                teacher_id: Some("t2".into()),
                ..intro(Some("s1"))
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(state.lessons.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_names_teacher() {
        let state = testing::state();
        let admin = testing::seed(&state, "a1", Role::Admin).await;
        testing::seed(&state, "t2", Role::Teacher).await;
        testing::seed(&state, "t3", Role::Teacher).await;
        testing::seed(&state, "s2", Role::Student).await;

        let lesson = create_lesson(
            &state,
            &admin,
            CreateLessonRequest {
                teacher_id: Some("t2".into()),
                ..intro(Some("s1"))
            },
        )
        .await
        .unwrap();
        assert_eq!(lesson.teacher_id, "t2");

        for teacher_id in ["nobody", "s2"] {
            let err = create_lesson(
                &state,
                &admin,
                CreateLessonRequest {
                    teacher_id: Some(teacher_id.into()),
                    ..intro(Some("s1"))
                },
            )
            .await
            .unwrap_err();
            assert_eq!(err.to_string(), "Teacher not found");
        }
        assert_eq!(state.lessons.list_all().await.unwrap().len(), 1);

        let reassign = |teacher_id: &str| UpdateLessonRequest {
            teacher_id: Some(teacher_id.into()),
            ..UpdateLessonRequest::default()
        };
        let err = update_lesson(&state, &admin, &lesson.id, reassign("nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(state.lessons.get("s1", &lesson.id).await.unwrap(), Some(lesson.clone()));

        let moved = update_lesson(&state, &admin, &lesson.id, reassign("t3"))
            .await
            .unwrap();
        assert_eq!(moved.teacher_id, "t3");
    }

    #[tokio::test]
    async fn test_list_visibility() {
        let state = testing::state();
        let admin = testing::seed(&state, "a1", Role::Admin).await;
        let t1 = testing::seed(&state, "t1", Role::Teacher).await;
        let t2 = testing::seed(&state, "t2", Role::Teacher).await;
        let s1 = testing::seed(&state, "s1", Role::Student).await;

        let later = CreateLessonRequest { date: "2025-02-01".into(), ..intro(Some("s1")) };
        create_lesson(&state, &t1, later).await.unwrap();
        create_lesson(&state, &t1, intro(Some("s1"))).await.unwrap();
        create_lesson(&state, &t2, intro(Some("s2"))).await.unwrap();

        assert_eq!(list_lessons(&state, &admin).await.unwrap().len(), 3);

        let own = list_lessons(&state, &t1).await.unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|l| l.teacher_id == "t1"));
        assert!(own[0].date < own[1].date);

        let theirs = list_lessons(&state, &t2).await.unwrap();
        assert_eq!(theirs.len(), 1);

        let mine = list_lessons(&state, &s1).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|l| l.student_id == "s1"));
    }

    #[tokio::test]
    async fn test_get_lesson() {
        let state = testing::state();
        let t1 = testing::seed(&state, "t1", Role::Teacher).await;
        let t2 = testing::seed(&state, "t2", Role::Teacher).await;
        let s1 = testing::seed(&state, "s1", Role::Student).await;
        let s2 = testing::seed(&state, "s2", Role::Student).await;
        let lesson = create_lesson(&state, &t1, intro(Some("s1"))).await.unwrap();

        assert_eq!(get_lesson(&state, &t1, &lesson.id).await.unwrap(), lesson);
        assert_eq!(get_lesson(&state, &s1, &lesson.id).await.unwrap(), lesson);
        assert!(matches!(
            get_lesson(&state, &t2, &lesson.id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            get_lesson(&state, &s2, &lesson.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            get_lesson(&state, &t1, "missing").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;
        let lesson = create_lesson(
            &state,
            &teacher,
            CreateLessonRequest {
                description: Some("bring laptop".into()),
                ..intro(Some("s1"))
            },
        )
        .await
        .unwrap();

        let updated = update_lesson(
            &state,
            &teacher,
            &lesson.id,
            UpdateLessonRequest {
                title: Some(String::new()),
                time: Some("11:30".into()),
                status: Some("completed".into()),
                description: Some(String::new()),
                ..UpdateLessonRequest::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Intro");
        assert_eq!(updated.time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        assert_eq!(updated.status, LessonStatus::Completed);
        assert_eq!(updated.description, "");
        assert_eq!(updated.created_at, lesson.created_at);
        assert!(updated.updated_at.is_some());
        assert_eq!(state.lessons.get("s1", &lesson.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_any_status_transition_is_allowed() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;
        let lesson = create_lesson(&state, &teacher, intro(Some("s1"))).await.unwrap();

        for status in ["cancelled", "scheduled", "rescheduled", "completed", "scheduled"] {
            let updated = update_lesson(
                &state,
                &teacher,
                &lesson.id,
                UpdateLessonRequest {
                    status: Some(status.into()),
                    ..UpdateLessonRequest::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(updated.status.as_str(), status);
        }

        let err = update_lesson(
            &state,
            &teacher,
            &lesson.id,
            UpdateLessonRequest {
                status: Some("postponed".into()),
                ..UpdateLessonRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_student_change_rekeys() {
        let state = testing::state();
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;
        let lesson = create_lesson(&state, &teacher, intro(Some("s1"))).await.unwrap();

        let moved = update_lesson(
            &state,
            &teacher,
            &lesson.id,
            UpdateLessonRequest {
                student_id: Some("s2".into()),
                ..UpdateLessonRequest::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(moved.student_id, "s2");
        assert!(state.lessons.get("s1", &lesson.id).await.unwrap().is_none());
        assert_eq!(state.lessons.get("s2", &lesson.id).await.unwrap(), Some(moved));
        assert_eq!(state.lessons.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_mutate() {
        let state = testing::state();
        let t1 = testing::seed(&state, "t1", Role::Teacher).await;
        let t2 = testing::seed(&state, "t2", Role::Teacher).await;
        let lesson = create_lesson(&state, &t1, intro(Some("s1"))).await.unwrap();

        let err = update_lesson(
            &state,
            &t2,
            &lesson.id,
            UpdateLessonRequest {
                title: Some("Hijacked".into()),
                ..UpdateLessonRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = delete_lesson(&state, &t2, &lesson.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        // the owner cannot hand the lesson to another teacher either
        let err = update_lesson(
            &state,
            &t1,
            &lesson.id,
            UpdateLessonRequest {
                teacher_id: Some("t2".into()),
                ..UpdateLessonRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        assert_eq!(state.lessons.get("s1", &lesson.id).await.unwrap(), Some(lesson));
    }

    #[tokio::test]
    async fn test_delete() {
        let state = testing::state();
        let admin = testing::seed(&state, "a1", Role::Admin).await;
        let teacher = testing::seed(&state, "t1", Role::Teacher).await;
        let lesson = create_lesson(&state, &teacher, intro(Some("s1"))).await.unwrap();

        delete_lesson(&state, &admin, &lesson.id).await.unwrap();
        assert!(state.lessons.find_by_id(&lesson.id).await.unwrap().is_none());
        assert!(matches!(
            delete_lesson(&state, &admin, &lesson.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
