//! User profiles and the directory/account payloads built from them

use chrono::{DateTime, Utc};
use identity::Identity;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::InvalidValue;

/// Role of a user, stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Teachers and admins both run lessons
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subjects a student can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "frontend")]
    Frontend,
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "3d_modeling")]
    ThreeDModeling,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Frontend, Subject::Python, Subject::ThreeDModeling];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Frontend => "frontend",
            Subject::Python => "python",
            Subject::ThreeDModeling => "3d_modeling",
        }
    }
}

impl FromStr for Subject {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| InvalidValue::new("subject", s))
    }
}

/// Stored user profile, key `user:{id}`
///
/// Profiles written by other tools may omit fields, so everything except
/// the id and role has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    /// Lesson credits; only students carry a balance
    #[serde(default)]
    pub balance: Option<i64>,
    /// Assigned teacher id
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub subject: Option<Subject>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Profile created at signup
    pub fn new_student(id: String, email: String, name: String) -> Self {
        Self {
            id,
            email,
            name,
            role: Role::Student,
            balance: Some(0),
            teacher: None,
            subject: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_unassigned(&self) -> bool {
        self.teacher.is_none()
    }
}

/// Body of `POST /auth/signup`
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /auth/signin`
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: Profile,
}

/// What `GET /user/profile` returns: the stored profile, or what the
/// identity provider knows when no profile was ever written
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Stored(Profile),
    Identity(Identity),
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileView,
}

/// Student entry of the directory, enriched with the teacher's name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    #[serde(flatten)]
    pub profile: Profile,
    pub teacher_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentsResponse {
    pub students: Vec<StudentView>,
    pub new_students: Vec<StudentView>,
}

#[derive(Debug, Serialize)]
pub struct TeachersResponse {
    pub teachers: Vec<Profile>,
}

/// Body of `POST /students/:id/assign`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub subject: String,
}

/// Body of `POST /students/:id/change-teacher`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTeacherRequest {
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub success: bool,
    pub student: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_wire_names() {
        assert_eq!("3d_modeling".parse::<Subject>().unwrap(), Subject::ThreeDModeling);
        assert_eq!("python".parse::<Subject>().unwrap(), Subject::Python);
        assert_eq!(
            serde_json::to_value(Subject::ThreeDModeling).unwrap(),
            json!("3d_modeling")
        );

        let err = "cooking".parse::<Subject>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid subject: cooking");
        assert!("Python".parse::<Subject>().is_err());
    }

    #[test]
    fn test_profile_uses_camel_case() {
        let profile = Profile::new_student("s1".into(), "s1@example.com".into(), "Sam".into());
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["role"], "student");
        assert_eq!(value["balance"], 0);
        assert!(value["teacher"].is_null());
        assert!(value["subject"].is_null());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_sparse_profile_deserializes() {
        // teacher records are provisioned by hand and often minimal
        let profile: Profile =
            serde_json::from_value(json!({"id": "t1", "role": "teacher", "name": "Tess"})).unwrap();

        assert_eq!(profile.role, Role::Teacher);
        assert_eq!(profile.balance, None);
        assert_eq!(profile.email, "");
        assert!(profile.is_unassigned());
    }

    #[test]
    fn test_student_view_flattens_profile() {
        let mut profile = Profile::new_student("s1".into(), "s1@example.com".into(), "Sam".into());
        profile.teacher = Some("t1".into());
        let view = StudentView {
            profile,
            teacher_name: Some("Tess".into()),
        };
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["id"], "s1");
        assert_eq!(value["teacher"], "t1");
        assert_eq!(value["teacherName"], "Tess");
    }
}
