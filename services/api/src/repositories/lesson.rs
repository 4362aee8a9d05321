//! Lesson repository, key `lesson:{studentId}:{lessonId}`
//!
//! Lessons are keyed by their student, so a student's lessons are one prefix
//! scan. Lookup by lesson id alone has no index and scans every lesson.

use common::{
    KvStore, StoreResult,
    store::{get_as, set_as},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::decode_entries;
use crate::models::Lesson;

const PREFIX: &str = "lesson:";

/// Lesson repository for store operations
#[derive(Clone)]
pub struct LessonRepository {
    store: Arc<dyn KvStore>,
}

impl LessonRepository {
    /// Create a new lesson repository
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn key(student_id: &str, lesson_id: &str) -> String {
        format!("{}{}:{}", PREFIX, student_id, lesson_id)
    }

    fn student_prefix(student_id: &str) -> String {
        format!("{}{}:", PREFIX, student_id)
    }

    /// Read one lesson by its full key
    pub async fn get(&self, student_id: &str, lesson_id: &str) -> StoreResult<Option<Lesson>> {
        get_as(self.store.as_ref(), &Self::key(student_id, lesson_id)).await
    }

    /// Insert or overwrite a lesson under its current student
    pub async fn save(&self, lesson: &Lesson) -> StoreResult<()> {
        set_as(
            self.store.as_ref(),
            &Self::key(&lesson.student_id, &lesson.id),
            lesson,
        )
        .await
    }

    /// Every lesson of every student
    pub async fn list_all(&self) -> StoreResult<Vec<Lesson>> {
        decode_entries(self.store.scan_prefix(PREFIX).await?)
    }

    /// Lessons stored under one student's prefix
    pub async fn list_for_student(&self, student_id: &str) -> StoreResult<Vec<Lesson>> {
        decode_entries(
            self.store
                .scan_prefix(&Self::student_prefix(student_id))
                .await?,
        )
    }

    /// Find a lesson by id with a full scan, O(number of lessons)
    ///
    /// If an interrupted move left two copies, the most recently modified
    /// one wins.
    pub async fn find_by_id(&self, lesson_id: &str) -> StoreResult<Option<Lesson>> {
        let lessons = self.list_all().await?;
        Ok(Self::latest(lessons.into_iter().filter(|l| l.id == lesson_id)))
    }

    /// Find a lesson by id within one student's prefix
    pub async fn find_for_student(
        &self,
        student_id: &str,
        lesson_id: &str,
    ) -> StoreResult<Option<Lesson>> {
        let lessons = self.list_for_student(student_id).await?;
        Ok(Self::latest(lessons.into_iter().filter(|l| l.id == lesson_id)))
    }

    fn latest(candidates: impl Iterator<Item = Lesson>) -> Option<Lesson> {
        let mut candidates: Vec<Lesson> = candidates.collect();
        if candidates.len() > 1 {
            warn!(
                lesson_id = %candidates[0].id,
                copies = candidates.len(),
                "lesson stored under several students"
            );
        }
        candidates.sort_by_key(Lesson::last_modified);
        candidates.pop()
    }

    /// Re-key a lesson whose student changed
    ///
    /// The new key is written before the old one is removed: a failure in
    /// between leaves a duplicate rather than losing the lesson.
    pub async fn move_to_student(&self, previous: &Lesson, updated: &Lesson) -> StoreResult<()> {
        self.save(updated).await?;
        self.store
            .delete(&Self::key(&previous.student_id, &previous.id))
            .await?;
        debug!(
            lesson_id = %updated.id,
            from = %previous.student_id,
            to = %updated.student_id,
            "lesson re-keyed"
        );
        Ok(())
    }

    /// Delete a lesson
    pub async fn delete(&self, lesson: &Lesson) -> StoreResult<()> {
        self.store
            .delete(&Self::key(&lesson.student_id, &lesson.id))
            .await
    }
}
