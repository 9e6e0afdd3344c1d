//! In-memory repositories for development and tests.
//!
//! [`InMemoryStore`] implements every repository port over a single
//! `RwLock`, so multi-table operations such as the bootcamp cascade run
//! under one write guard. Unique columns mirror the SQL schema: user email
//! and bootcamp name.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    BootcampRepository, BootcampRepositoryError, CourseRepository, CourseRepositoryError,
    ReviewRepository, ReviewRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Bootcamp, BootcampId, Course, CourseId, EmailAddress, GeoPoint, Radius, Review, ReviewId,
    User, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    bootcamps: Vec<Bootcamp>,
    courses: Vec<Course>,
    reviews: Vec<Review>,
}

impl Tables {
    fn has_bootcamp(&self, id: &BootcampId) -> bool {
        self.bootcamps.iter().any(|bootcamp| bootcamp.id == *id)
    }
}

/// Shared in-memory store; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, String> {
        self.tables.read().map_err(|_| POISONED.to_owned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, String> {
        self.tables.write().map_err(|_| POISONED.to_owned())
    }
}

/// Newest first, matching the SQL adapters.
fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

fn replace<T>(items: &mut [T], item: &T, same: impl Fn(&T) -> bool) -> bool
where
    T: Clone,
{
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => {
            *slot = item.clone();
            true
        }
        None => false,
    }
}

fn remove<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.read().map_err(UserRepositoryError::connection)?;
        Ok(tables.users.iter().find(|user| user.id == *id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.read().map_err(UserRepositoryError::connection)?;
        Ok(tables.users.iter().find(|user| user.email == *email).cloned())
    }

    async fn find_by_reset_digest(
        &self,
        digest: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.read().map_err(UserRepositoryError::connection)?;
        Ok(tables
            .users
            .iter()
            .find(|user| {
                user.password_reset
                    .as_ref()
                    .is_some_and(|reset| reset.token_digest == digest)
            })
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.read().map_err(UserRepositoryError::connection)?;
        Ok(newest_first(tables.users.clone(), |user| user.created_at))
    }

    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut tables = self.write().map_err(UserRepositoryError::connection)?;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::duplicate("email"));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut tables = self.write().map_err(UserRepositoryError::connection)?;
        let clash = tables
            .users
            .iter()
            .any(|existing| existing.id != user.id && existing.email == user.email);
        if clash {
            return Err(UserRepositoryError::duplicate("email"));
        }
        Ok(replace(&mut tables.users, user, |existing| {
            existing.id == user.id
        }))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut tables = self.write().map_err(UserRepositoryError::connection)?;
        Ok(remove(&mut tables.users, |user| user.id == *id))
    }
}

#[async_trait]
impl BootcampRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &BootcampId,
    ) -> Result<Option<Bootcamp>, BootcampRepositoryError> {
        let tables = self.read().map_err(BootcampRepositoryError::connection)?;
        Ok(tables
            .bootcamps
            .iter()
            .find(|bootcamp| bootcamp.id == *id)
            .cloned())
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<Bootcamp>, BootcampRepositoryError> {
        let tables = self.read().map_err(BootcampRepositoryError::connection)?;
        Ok(tables
            .bootcamps
            .iter()
            .find(|bootcamp| bootcamp.user == *owner)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Bootcamp>, BootcampRepositoryError> {
        let tables = self.read().map_err(BootcampRepositoryError::connection)?;
        Ok(newest_first(tables.bootcamps.clone(), |bootcamp| {
            bootcamp.created_at
        }))
    }

    async fn within_radius(
        &self,
        centre: &GeoPoint,
        radius: Radius,
    ) -> Result<Vec<Bootcamp>, BootcampRepositoryError> {
        let tables = self.read().map_err(BootcampRepositoryError::connection)?;
        let matches = tables
            .bootcamps
            .iter()
            .filter(|bootcamp| radius.contains(centre, &bootcamp.location.point))
            .cloned()
            .collect();
        Ok(newest_first(matches, |bootcamp| bootcamp.created_at))
    }

    async fn create(&self, bootcamp: &Bootcamp) -> Result<(), BootcampRepositoryError> {
        let mut tables = self.write().map_err(BootcampRepositoryError::connection)?;
        if tables
            .bootcamps
            .iter()
            .any(|existing| existing.profile.name == bootcamp.profile.name)
        {
            return Err(BootcampRepositoryError::duplicate("name"));
        }
        tables.bootcamps.push(bootcamp.clone());
        Ok(())
    }

    async fn update(&self, bootcamp: &Bootcamp) -> Result<bool, BootcampRepositoryError> {
        let mut tables = self.write().map_err(BootcampRepositoryError::connection)?;
        let clash = tables.bootcamps.iter().any(|existing| {
            existing.id != bootcamp.id && existing.profile.name == bootcamp.profile.name
        });
        if clash {
            return Err(BootcampRepositoryError::duplicate("name"));
        }
        Ok(replace(&mut tables.bootcamps, bootcamp, |existing| {
            existing.id == bootcamp.id
        }))
    }

    async fn delete_cascade(&self, id: &BootcampId) -> Result<bool, BootcampRepositoryError> {
        let mut tables = self.write().map_err(BootcampRepositoryError::connection)?;
        if !tables.has_bootcamp(id) {
            return Ok(false);
        }
        tables.courses.retain(|course| course.bootcamp != *id);
        tables.reviews.retain(|review| review.bootcamp != *id);
        Ok(remove(&mut tables.bootcamps, |bootcamp| bootcamp.id == *id))
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let tables = self.read().map_err(CourseRepositoryError::connection)?;
        Ok(tables.courses.iter().find(|course| course.id == *id).cloned())
    }

    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Course>, CourseRepositoryError> {
        let tables = self.read().map_err(CourseRepositoryError::connection)?;
        let courses = tables
            .courses
            .iter()
            .filter(|course| bootcamp.is_none_or(|id| course.bootcamp == id))
            .cloned()
            .collect();
        Ok(newest_first(courses, |course| course.created_at))
    }

    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut tables = self.write().map_err(CourseRepositoryError::connection)?;
        if !tables.has_bootcamp(&course.bootcamp) {
            return Err(CourseRepositoryError::missing_bootcamp(course.bootcamp));
        }
        tables.courses.push(course.clone());
        Ok(())
    }

    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.write().map_err(CourseRepositoryError::connection)?;
        Ok(replace(&mut tables.courses, course, |existing| {
            existing.id == course.id
        }))
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.write().map_err(CourseRepositoryError::connection)?;
        Ok(remove(&mut tables.courses, |course| course.id == *id))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        let tables = self.read().map_err(ReviewRepositoryError::connection)?;
        Ok(tables.reviews.iter().find(|review| review.id == *id).cloned())
    }

    async fn list(
        &self,
        bootcamp: Option<BootcampId>,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        let tables = self.read().map_err(ReviewRepositoryError::connection)?;
        let reviews = tables
            .reviews
            .iter()
            .filter(|review| bootcamp.is_none_or(|id| review.bootcamp == id))
            .cloned()
            .collect();
        Ok(newest_first(reviews, |review| review.created_at))
    }

    async fn create(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let mut tables = self.write().map_err(ReviewRepositoryError::connection)?;
        if !tables.has_bootcamp(&review.bootcamp) {
            return Err(ReviewRepositoryError::missing_bootcamp(review.bootcamp));
        }
        tables.reviews.push(review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<bool, ReviewRepositoryError> {
        let mut tables = self.write().map_err(ReviewRepositoryError::connection)?;
        Ok(replace(&mut tables.reviews, review, |existing| {
            existing.id == review.id
        }))
    }

    async fn delete(&self, id: &ReviewId) -> Result<bool, ReviewRepositoryError> {
        let mut tables = self.write().map_err(ReviewRepositoryError::connection)?;
        Ok(remove(&mut tables.reviews, |review| review.id == *id))
    }
}
