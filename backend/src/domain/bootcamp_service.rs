//! Bootcamp use-cases: listing, the publish rule, the slug and geocode
//! pipeline, the radius search, cascade delete and photo upload.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{BootcampRepository, Geocoder, PhotoStore};
use crate::domain::service_support::{
    bootcamp_not_found, map_bootcamp_repository_error, map_geocoder_error, map_photo_store_error,
};
use crate::domain::{
    Actor, Bootcamp, BootcampId, BootcampInput, Error, ListQuery, Page, Radius, Role,
    ensure_can_modify, require_role,
};

/// Roles allowed to create, change, delete or illustrate bootcamps.
pub(crate) const PUBLISHER_ROLES: &[Role] = &[Role::Publisher, Role::Admin];

/// Raw uploaded photo.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpload {
    /// Declared MIME type of the body.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Bootcamp service.
#[derive(Clone)]
pub struct BootcampService {
    bootcamps: Arc<dyn BootcampRepository>,
    geocoder: Arc<dyn Geocoder>,
    photos: Arc<dyn PhotoStore>,
    clock: Arc<dyn Clock>,
    max_photo_bytes: usize,
}

impl BootcampService {
    /// Create a service; uploads larger than `max_photo_bytes` are rejected.
    pub fn new(
        bootcamps: Arc<dyn BootcampRepository>,
        geocoder: Arc<dyn Geocoder>,
        photos: Arc<dyn PhotoStore>,
        clock: Arc<dyn Clock>,
        max_photo_bytes: usize,
    ) -> Self {
        Self {
            bootcamps,
            geocoder,
            photos,
            clock,
            max_photo_bytes,
        }
    }

    /// Largest accepted photo, in bytes.
    pub fn max_photo_bytes(&self) -> usize {
        self.max_photo_bytes
    }

    /// Filter, sort and paginate every bootcamp.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Bootcamp>, Error> {
        let all = self
            .bootcamps
            .list()
            .await
            .map_err(map_bootcamp_repository_error)?;
        query.apply(all)
    }

    /// Fetch one bootcamp.
    pub async fn get(&self, id: &BootcampId) -> Result<Bootcamp, Error> {
        self.bootcamps
            .find_by_id(id)
            .await
            .map_err(map_bootcamp_repository_error)?
            .ok_or_else(|| bootcamp_not_found(id))
    }

    /// Publish a new bootcamp owned by `actor`.
    ///
    /// Non-admins may own at most one bootcamp.
    pub async fn create(&self, actor: &Actor, input: BootcampInput) -> Result<Bootcamp, Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        if !actor.is_admin() {
            let existing = self
                .bootcamps
                .find_by_owner(&actor.id)
                .await
                .map_err(map_bootcamp_repository_error)?;
            if existing.is_some() {
                return Err(Error::conflict(format!(
                    "The user with ID {} has already published a bootcamp",
                    actor.id
                )));
            }
        }

        let new = input.validate_new()?;
        let location = self
            .geocoder
            .geocode(&new.address)
            .await
            .map_err(map_geocoder_error)?;
        let bootcamp = Bootcamp::new(
            BootcampId::random(),
            actor.id,
            new.profile,
            location,
            self.clock.utc(),
        );
        self.bootcamps
            .create(&bootcamp)
            .await
            .map_err(map_bootcamp_repository_error)?;
        info!(bootcamp_id = %bootcamp.id, owner = %actor.id, "bootcamp created");
        Ok(bootcamp)
    }

    /// Apply a partial update, re-deriving the slug and location as needed.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &BootcampId,
        input: BootcampInput,
    ) -> Result<Bootcamp, Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let mut bootcamp = self.get(id).await?;
        ensure_can_modify(actor, &bootcamp, "update this bootcamp")?;

        let change = input.validate_change(&bootcamp.profile)?;
        if let Some(address) = &change.address {
            bootcamp.location = self
                .geocoder
                .geocode(address)
                .await
                .map_err(map_geocoder_error)?;
        }
        bootcamp.set_profile(change.profile);
        self.store(&bootcamp).await?;
        Ok(bootcamp)
    }

    /// Delete a bootcamp with its courses and reviews.
    pub async fn delete(&self, actor: &Actor, id: &BootcampId) -> Result<(), Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let bootcamp = self.get(id).await?;
        ensure_can_modify(actor, &bootcamp, "delete this bootcamp")?;
        let removed = self
            .bootcamps
            .delete_cascade(id)
            .await
            .map_err(map_bootcamp_repository_error)?;
        if !removed {
            return Err(bootcamp_not_found(id));
        }
        info!(bootcamp_id = %id, "bootcamp deleted with its courses and reviews");
        Ok(())
    }

    /// Bootcamps within `distance_km` of the centre of `zipcode`.
    pub async fn within_radius(
        &self,
        zipcode: &str,
        distance_km: f64,
    ) -> Result<Vec<Bootcamp>, Error> {
        let radius = Radius::from_distance_km(distance_km)?;
        let centre = self
            .geocoder
            .geocode(zipcode)
            .await
            .map_err(map_geocoder_error)?;
        debug!(zipcode, radians = radius.radians(), "radius search");
        self.bootcamps
            .within_radius(&centre.point, radius)
            .await
            .map_err(map_bootcamp_repository_error)
    }

    /// Store an uploaded photo and point the bootcamp at it.
    ///
    /// Returns the stored file name.
    pub async fn upload_photo(
        &self,
        actor: &Actor,
        id: &BootcampId,
        upload: PhotoUpload,
    ) -> Result<String, Error> {
        require_role(actor, PUBLISHER_ROLES)?;
        let mut bootcamp = self.get(id).await?;
        ensure_can_modify(actor, &bootcamp, "update this bootcamp")?;

        if upload.bytes.is_empty() {
            return Err(Error::invalid_request("Please upload a file"));
        }
        let extension = upload
            .content_type
            .as_deref()
            .and_then(image_extension)
            .ok_or_else(|| Error::invalid_request("Please upload an image file"))?;
        if upload.bytes.len() > self.max_photo_bytes {
            return Err(Error::invalid_request(format!(
                "Please upload an image less than {}",
                self.max_photo_bytes
            )));
        }

        let file_name = format!("photo_{id}.{extension}");
        self.photos
            .save(&file_name, &upload.bytes)
            .await
            .map_err(map_photo_store_error)?;
        bootcamp.photo = file_name.clone();
        self.store(&bootcamp).await?;
        info!(bootcamp_id = %id, file_name, "bootcamp photo uploaded");
        Ok(file_name)
    }

    async fn store(&self, bootcamp: &Bootcamp) -> Result<(), Error> {
        let updated = self
            .bootcamps
            .update(bootcamp)
            .await
            .map_err(map_bootcamp_repository_error)?;
        if updated {
            Ok(())
        } else {
            Err(bootcamp_not_found(&bootcamp.id))
        }
    }
}

const EXTENSION_MAX: usize = 16;

/// File extension for an `image/*` MIME type, or `None` for anything else.
fn image_extension(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/")?;
    let subtype = subtype.split('+').next().unwrap_or(subtype);
    match subtype {
        "" => None,
        "jpeg" | "pjpeg" => Some("jpg".to_owned()),
        other
            if other.len() <= EXTENSION_MAX
                && other.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') =>
        {
            Some(other.to_owned())
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "bootcamp_service_tests.rs"]
mod tests;
