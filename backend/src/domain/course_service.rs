//! Course use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::bootcamp_service::PUBLISHER_ROLES;
use crate::domain::ports::{BootcampRepository, CourseRepository};
use crate::domain::service_support::{
    bootcamp_not_found, course_not_found, map_bootcamp_repository_error,
    map_course_repository_error,
};
use crate::domain::{
    Actor, Bootcamp, BootcampId, Course, CourseId, CourseInput, Error, ListQuery, Page,
    ensure_can_modify, require_role,
};

/// Course service.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    bootcamps: Arc<dyn BootcampRepository>,
    clock: Arc<dyn Clock>,
}

impl CourseService {
    /// Create a service over the course and bootcamp repositories.
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        bootcamps: Arc<dyn BootcampRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            courses,
            bootcamps,
            clock,
        }
    }

    /// Filter, sort and paginate courses, optionally within one bootcamp.
    pub async fn list(
        &self,
        bootcamp: Option<BootcampId>,
        query: &ListQuery,
    ) -> Result<Page<Course>, Error> {
        if let Some(id) = &bootcamp {
            self.require_bootcamp(id).await?;
        }
        let courses = self
            .courses
            .list(bootcamp)
            .await
            .map_err(map_course_repository_error)?;
        query.apply(courses)
    }

    /// Fetch one course.
    pub async fn get(&self, id: &CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(map_course_repository_error)?
            .ok_or_else(|| course_not_found(id))
    }

    /// Add a course to a bootcamp the actor owns.
    pub async fn create(
        &self,
        actor: &Actor,
        bootcamp_id: &BootcampId,
        input: CourseInput,
    ) -> Result<Course, Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let bootcamp = self.require_bootcamp(bootcamp_id).await?;
        ensure_can_modify(
            actor,
            &bootcamp,
            &format!("add a course to bootcamp {bootcamp_id}"),
        )?;

        let details = input.validate_new()?;
        let course = Course {
            id: CourseId::random(),
            bootcamp: bootcamp.id,
            user: actor.id,
            details,
            created_at: self.clock.utc(),
        };
        self.courses
            .create(&course)
            .await
            .map_err(map_course_repository_error)?;
        info!(course_id = %course.id, bootcamp_id = %bootcamp.id, "course created");
        Ok(course)
    }

    /// Apply a partial update to a course the actor owns.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &CourseId,
        input: CourseInput,
    ) -> Result<Course, Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let mut course = self.get(id).await?;
        ensure_can_modify(actor, &course, &format!("update course {id}"))?;

        course.details = input.validate_change(&course.details)?;
        let updated = self
            .courses
            .update(&course)
            .await
            .map_err(map_course_repository_error)?;
        if !updated {
            return Err(course_not_found(id));
        }
        Ok(course)
    }

    /// Delete a course the actor owns.
    pub async fn delete(&self, actor: &Actor, id: &CourseId) -> Result<(), Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let course = self.get(id).await?;
        ensure_can_modify(actor, &course, &format!("delete course {id}"))?;
        let removed = self
            .courses
            .delete(id)
            .await
            .map_err(map_course_repository_error)?;
        if !removed {
            return Err(course_not_found(id));
        }
        info!(course_id = %id, "course deleted");
        Ok(())
    }

    async fn require_bootcamp(&self, id: &BootcampId) -> Result<Bootcamp, Error> {
        self.bootcamps
            .find_by_id(id)
            .await
            .map_err(map_bootcamp_repository_error)?
            .ok_or_else(|| bootcamp_not_found(id))
    }
}
