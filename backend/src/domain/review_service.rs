//! Review use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{BootcampRepository, ReviewRepository};
use crate::domain::service_support::{
    bootcamp_not_found, map_bootcamp_repository_error, map_review_repository_error,
    review_not_found,
};
use crate::domain::{
    Actor, BootcampId, Error, ListQuery, Page, Review, ReviewId, ReviewInput, Role,
    ensure_can_modify, require_role,
};

/// Roles allowed to write reviews.
pub(crate) const REVIEWER_ROLES: &[Role] = &[Role::User, Role::Admin];

/// Review service.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    bootcamps: Arc<dyn BootcampRepository>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    /// Create a service over the review and bootcamp repositories.
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        bootcamps: Arc<dyn BootcampRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reviews,
            bootcamps,
            clock,
        }
    }

    /// Filter, sort and paginate reviews, optionally within one bootcamp.
    pub async fn list(
        &self,
        bootcamp: Option<BootcampId>,
        query: &ListQuery,
    ) -> Result<Page<Review>, Error> {
        if let Some(id) = &bootcamp {
            self.require_bootcamp(id).await?;
        }
        let reviews = self
            .reviews
            .list(bootcamp)
            .await
            .map_err(map_review_repository_error)?;
        query.apply(reviews)
    }

    /// Fetch one review.
    pub async fn get(&self, id: &ReviewId) -> Result<Review, Error> {
        self.reviews
            .find_by_id(id)
            .await
            .map_err(map_review_repository_error)?
            .ok_or_else(|| review_not_found(id))
    }

    /// Review an existing bootcamp as `actor`.
    pub async fn create(
        &self,
        actor: &Actor,
        bootcamp_id: &BootcampId,
        input: ReviewInput,
    ) -> Result<Review, Error> {
        require_role(actor, REVIEWER_ROLES)?;
        self.require_bootcamp(bootcamp_id).await?;

        let content = input.validate_new()?;
        let review = Review {
            id: ReviewId::random(),
            bootcamp: *bootcamp_id,
            user: actor.id,
            content,
            created_at: self.clock.utc(),
        };
        self.reviews
            .create(&review)
            .await
            .map_err(map_review_repository_error)?;
        info!(review_id = %review.id, bootcamp_id = %bootcamp_id, "review created");
        Ok(review)
    }

    /// Apply a partial update to the actor's review.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &ReviewId,
        input: ReviewInput,
    ) -> Result<Review, Error> {
        require_role(actor, REVIEWER_ROLES)?;
        let mut review = self.get(id).await?;
        ensure_can_modify(actor, &review, &format!("update review {id}"))?;

        review.content = input.validate_change(&review.content)?;
        let updated = self
            .reviews
            .update(&review)
            .await
            .map_err(map_review_repository_error)?;
        if !updated {
            return Err(review_not_found(id));
        }
        Ok(review)
    }

    /// Delete the actor's review.
    pub async fn delete(&self, actor: &Actor, id: &ReviewId) -> Result<(), Error> {
        require_role(actor, REVIEWER_ROLES)?;
        let review = self.get(id).await?;
        ensure_can_modify(actor, &review, &format!("delete review {id}"))?;
        let removed = self
            .reviews
            .delete(id)
            .await
            .map_err(map_review_repository_error)?;
        if !removed {
            return Err(review_not_found(id));
        }
        info!(review_id = %id, "review deleted");
        Ok(())
    }

    async fn require_bootcamp(&self, id: &BootcampId) -> Result<(), Error> {
        self.bootcamps
            .find_by_id(id)
            .await
            .map_err(map_bootcamp_repository_error)?
            .map(|_| ())
            .ok_or_else(|| bootcamp_not_found(id))
    }
}
