//! Role policy
//!
//! Every operation names an [`Action`]. The scope a role gets for an action
//! comes from one static table; handlers never branch on roles themselves.
//! `Scope::Own` is then narrowed against the target record by
//! [`Actor::ensure_lesson`] and [`Actor::ensure_student`].

use crate::{
    error::{ApiError, ApiResult},
    models::{Lesson, Profile, Role},
};

/// One variant per API operation that needs an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewProfile,
    ListStudents,
    AssignStudent,
    ChangeTeacher,
    ListTeachers,
    UpdateBalance,
    ListLessons,
    ViewLesson,
    CreateLesson,
    UpdateLesson,
    DeleteLesson,
}

/// What a role may touch for a given action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Denied,
    /// Only records tied to the actor
    Own,
    All,
}

use Scope::{All, Denied, Own};

/// Scopes per action, columns are `[student, teacher, admin]`
const fn row(action: Action) -> [Scope; 3] {
    match action {
        Action::ViewProfile => [Own, Own, All],
        Action::ListStudents => [Denied, Own, All],
        Action::AssignStudent => [Denied, Own, All],
        Action::ChangeTeacher => [Denied, Denied, All],
        Action::ListTeachers => [Denied, Denied, All],
        Action::UpdateBalance => [Denied, Own, All],
        Action::ListLessons => [Own, Own, All],
        Action::ViewLesson => [Own, Own, All],
        Action::CreateLesson => [Denied, Own, All],
        Action::UpdateLesson => [Denied, Own, All],
        Action::DeleteLesson => [Denied, Own, All],
    }
}

const fn column(role: Role) -> usize {
    match role {
        Role::Student => 0,
        Role::Teacher => 1,
        Role::Admin => 2,
    }
}

/// Look up the scope of `role` for `action`
pub const fn scope(role: Role, action: Action) -> Scope {
    row(action)[column(role)]
}

fn denial_message(action: Action) -> &'static str {
    match action {
        Action::ChangeTeacher | Action::ListTeachers => "Admin access required",
        Action::ViewProfile => "Access denied",
        _ => "Teacher or admin access required",
    }
}

/// Authenticated caller with a stored profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Scope granted for `action`, or Forbidden when the role is denied
    pub fn authorize(&self, action: Action) -> ApiResult<Scope> {
        match scope(self.role, action) {
            Denied => Err(ApiError::forbidden(denial_message(action))),
            granted => Ok(granted),
        }
    }

    /// True when the lesson belongs to the actor in their role
    pub fn owns_lesson(&self, lesson: &Lesson) -> bool {
        match self.role {
            Role::Student => lesson.student_id == self.id,
            Role::Teacher | Role::Admin => lesson.teacher_id == self.id,
        }
    }

    /// True when the actor may see `lesson` under `scope`
    pub fn can_see_lesson(&self, scope: Scope, lesson: &Lesson) -> bool {
        match scope {
            All => true,
            Own => self.owns_lesson(lesson),
            Denied => false,
        }
    }

    /// Authorize `action` on one lesson
    pub fn ensure_lesson(&self, action: Action, lesson: &Lesson) -> ApiResult<()> {
        let scope = self.authorize(action)?;
        if self.can_see_lesson(scope, lesson) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access denied - not your lesson"))
        }
    }

    /// Authorize `action` on a profile; `Scope::Own` means the actor's own
    pub fn ensure_profile(&self, action: Action, profile: &Profile) -> ApiResult<()> {
        match self.authorize(action)? {
            All => Ok(()),
            _ if profile.id == self.id => Ok(()),
            _ => Err(ApiError::forbidden(denial_message(action))),
        }
    }

    /// True when the student is assigned to the actor, or is unassigned and
    /// the action allows picking up new students
    pub fn can_touch_student(&self, scope: Scope, action: Action, student: &Profile) -> bool {
        match scope {
            All => true,
            Own => match student.teacher.as_deref() {
                Some(teacher) => teacher == self.id,
                None => action == Action::AssignStudent,
            },
            Denied => false,
        }
    }

    /// Authorize `action` on one student profile
    pub fn ensure_student(&self, action: Action, student: &Profile) -> ApiResult<()> {
        let scope = self.authorize(action)?;
        if self.can_touch_student(scope, action, student) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access denied - not your student"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LessonStatus;
    use chrono::{NaiveDate, NaiveTime, Utc};

    const ACTIONS: [Action; 11] = [
        Action::ViewProfile,
        Action::ListStudents,
        Action::AssignStudent,
        Action::ChangeTeacher,
        Action::ListTeachers,
        Action::UpdateBalance,
        Action::ListLessons,
        Action::ViewLesson,
        Action::CreateLesson,
        Action::UpdateLesson,
        Action::DeleteLesson,
    ];

    fn lesson(student: &str, teacher: &str) -> Lesson {
        Lesson {
            id: "l1".to_string(),
            title: "Intro".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            student_id: student.to_string(),
            teacher_id: teacher.to_string(),
            description: String::new(),
            status: LessonStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn student(teacher: Option<&str>) -> Profile {
        let mut profile = Profile::new_student("s1".into(), "s1@example.com".into(), "Sam".into());
        profile.teacher = teacher.map(str::to_string);
        profile
    }

    #[test]
    fn test_admin_has_full_scope() {
        for action in ACTIONS {
            assert_eq!(scope(Role::Admin, action), All, "{:?}", action);
        }
    }

    #[test]
    fn test_students_never_mutate() {
        for action in [
            Action::AssignStudent,
            Action::ChangeTeacher,
            Action::UpdateBalance,
            Action::CreateLesson,
            Action::UpdateLesson,
            Action::DeleteLesson,
        ] {
            assert_eq!(scope(Role::Student, action), Denied, "{:?}", action);
        }
    }

    #[test]
    fn test_admin_only_actions() {
        let teacher = Actor::new("t1", Role::Teacher);
        let err = teacher.authorize(Action::ChangeTeacher).unwrap_err();
        assert_eq!(err.to_string(), "Admin access required");
        assert!(teacher.authorize(Action::ListTeachers).is_err());
    }

    #[test]
    fn test_teacher_lesson_ownership() {
        let teacher = Actor::new("t1", Role::Teacher);
        assert!(teacher.ensure_lesson(Action::UpdateLesson, &lesson("s1", "t1")).is_ok());

        let err = teacher
            .ensure_lesson(Action::DeleteLesson, &lesson("s1", "t2"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_student_sees_own_lessons_only() {
        let student = Actor::new("s1", Role::Student);
        let scope = student.authorize(Action::ListLessons).unwrap();
        assert!(student.can_see_lesson(scope, &lesson("s1", "t1")));
        assert!(!student.can_see_lesson(scope, &lesson("s2", "t1")));
        assert!(student.ensure_lesson(Action::UpdateLesson, &lesson("s1", "t1")).is_err());
    }

    #[test]
    fn test_profile_visibility() {
        let own = student(None);
        let teacher = Actor::new("t1", Role::Teacher);
        let owner = Actor::new("s1", Role::Student);

        assert!(owner.ensure_profile(Action::ViewProfile, &own).is_ok());
        assert!(Actor::new("a1", Role::Admin)
            .ensure_profile(Action::ViewProfile, &own)
            .is_ok());
        let err = teacher.ensure_profile(Action::ViewProfile, &own).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_teacher_student_ownership() {
        let teacher = Actor::new("t1", Role::Teacher);

        assert!(teacher.ensure_student(Action::UpdateBalance, &student(Some("t1"))).is_ok());
        assert!(teacher.ensure_student(Action::UpdateBalance, &student(Some("t2"))).is_err());
        assert!(teacher.ensure_student(Action::UpdateBalance, &student(None)).is_err());

        // unassigned students can be picked up, other teachers' cannot
        assert!(teacher.ensure_student(Action::AssignStudent, &student(None)).is_ok());
        let err = teacher
            .ensure_student(Action::AssignStudent, &student(Some("t2")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied - not your student");
    }
}
