//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.
//!
//! [`TestContext`] assembles the full HTTP state over in-process adapters:
//! an [`InMemoryStore`], a fixture geocoder with a handful of known
//! zipcodes, a [`RecordingMailer`] and a photo directory inside a
//! temporary directory that is removed on drop.

use std::path::Path;
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use mockable::DefaultClock;
use zeroize::Zeroizing;

use crate::domain::ports::{
    FixtureGeocoder, Mailer, MailerError, OutgoingMail, PasswordHasher, UserRepository,
};
use crate::domain::{EmailAddress, GeoPoint, Location, Role, User, UserId};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::{CookieSettings, HttpState};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{JwtSettings, JwtTokenService, Pbkdf2PasswordHasher};
use crate::outbound::storage::PhotoDirectory;
use crate::server::{AppDependencies, Adapters, Repositories, ServiceOptions};

/// Largest photo accepted by a default [`TestContext`].
pub const MAX_PHOTO_BYTES: usize = 4096;
/// Origin used in password reset links.
pub const PUBLIC_BASE_URL: &str = "http://devcamper.test";

const TEST_JWT_SECRET: &str = "test-secret-do-not-use";
const TEST_PBKDF2_ROUNDS: u32 = 1_000;

/// Mailer that keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl RecordingMailer {
    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        self.sent.lock().expect("mailer lock").push(mail.clone());
        Ok(())
    }
}

fn place(latitude: f64, longitude: f64, city: &str, state: &str, zipcode: &str) -> Location {
    Location {
        point: GeoPoint::new(latitude, longitude).expect("fixture coordinates"),
        formatted_address: format!("{city}, {state} {zipcode}, US"),
        street: None,
        city: Some(city.to_owned()),
        state: Some(state.to_owned()),
        zipcode: Some(zipcode.to_owned()),
        country: None,
        country_code: Some("US".to_owned()),
    }
}

/// Geocoder answering for Boston `02118`, Lowell `01852`, Providence
/// `02903` and San Francisco `94103`; anything else lands in Boston.
pub fn fixture_geocoder() -> FixtureGeocoder {
    FixtureGeocoder::default()
        .with_location("02118", place(42.3389, -71.0743, "Boston", "MA", "02118"))
        .with_location("01852", place(42.6334, -71.3162, "Lowell", "MA", "01852"))
        .with_location("02903", place(41.8240, -71.4128, "Providence", "RI", "02903"))
        .with_location(
            "94103",
            place(37.7726, -122.4099, "San Francisco", "CA", "94103"),
        )
}

/// Complete application state over in-process adapters.
pub struct TestContext {
    store: InMemoryStore,
    mailer: RecordingMailer,
    hasher: Pbkdf2PasswordHasher,
    uploads: tempfile::TempDir,
    health: web::Data<HealthState>,
    http: web::Data<HttpState>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a context accepting photos up to [`MAX_PHOTO_BYTES`].
    pub fn new() -> Self {
        Self::with_max_photo_bytes(MAX_PHOTO_BYTES)
    }

    pub fn with_max_photo_bytes(max_photo_bytes: usize) -> Self {
        let store = InMemoryStore::new();
        let mailer = RecordingMailer::default();
        let hasher = Pbkdf2PasswordHasher::with_rounds(TEST_PBKDF2_ROUNDS);
        let uploads = tempfile::tempdir().expect("temporary upload directory");
        let photos = PhotoDirectory::open(uploads.path()).expect("open upload directory");
        let clock = Arc::new(DefaultClock);
        let tokens = JwtTokenService::new(
            JwtSettings {
                secret: Zeroizing::new(TEST_JWT_SECRET.to_owned()),
                lifetime: chrono::Duration::days(30),
            },
            clock.clone(),
        );
        let adapters = Adapters {
            repositories: Repositories::in_memory(&store),
            geocoder: Arc::new(fixture_geocoder()),
            photos: Arc::new(photos),
            mailer: Arc::new(mailer.clone()),
            hasher: Arc::new(hasher.clone()),
            tokens: Arc::new(tokens),
            clock,
        };
        let state = adapters.into_http_state(ServiceOptions {
            public_base_url: PUBLIC_BASE_URL.to_owned(),
            max_photo_bytes,
            cookies: CookieSettings::default(),
        });
        Self {
            store,
            mailer,
            hasher,
            uploads,
            health: web::Data::new(HealthState::new()),
            http: web::Data::new(state),
        }
    }

    /// Dependencies for [`crate::server::build_app`].
    pub fn dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: self.health.clone(),
            http_state: self.http.clone(),
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.http.clone()
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Mail sent through the auth service so far.
    pub fn sent_mail(&self) -> Vec<OutgoingMail> {
        self.mailer.sent()
    }

    /// Directory uploaded photos are written to.
    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    /// Insert a user directly, bypassing the self-service role limits.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let user = User {
            id: UserId::random(),
            name: name.to_owned(),
            email: EmailAddress::new(email).expect("valid email"),
            role,
            password_hash: self.hasher.hash(password).expect("hash password"),
            password_reset: None,
            created_at: Utc::now(),
        };
        UserRepository::create(&self.store, &user)
            .await
            .expect("insert user");
        user
    }
}
