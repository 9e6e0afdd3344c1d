//! Builders wiring configured adapters into the HTTP state.
//!
//! Each integration is chosen from [`AppSettings`]: Diesel repositories
//! when a database URL is present, the MapQuest geocoder when an API key is
//! present, SMTP delivery when a relay host is present. Anything left
//! unconfigured falls back to its in-process adapter with a warning.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use rand::RngCore;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::config::{AppSettings, ConfigError};
use crate::domain::ports::{
    BootcampRepository, CourseRepository, FixtureGeocoder, Geocoder, Mailer, MailerError,
    PasswordHasher, PhotoStore, ReviewRepository, TokenService, UserRepository,
};
use crate::domain::{
    AuthService, AuthServiceConfig, BootcampService, CourseService, ReviewService, UserService,
};
use crate::inbound::http::state::{CookieSettings, HttpState};
use crate::outbound::geocoding::{MapQuestGeocoder, MapQuestSettings};
use crate::outbound::mail::{ConsoleMailer, SmtpMailer, SmtpSettings};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselBootcampRepository, DieselCourseRepository, DieselReviewRepository,
    DieselUserRepository, MigrationError, PoolConfig, PoolError, run_migrations,
};
use crate::outbound::security::{JwtSettings, JwtTokenService, Pbkdf2PasswordHasher};
use crate::outbound::storage::PhotoDirectory;

/// Failures raised while assembling the application at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("jwt_secret must be configured outside debug builds")]
    MissingJwtSecret,
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("cannot open upload directory {path}: {source}")]
    Uploads { path: PathBuf, source: io::Error },
    #[error("cannot build geocoding client: {0}")]
    Geocoder(#[from] reqwest::Error),
    #[error(transparent)]
    Mailer(#[from] MailerError),
}

impl From<StartupError> for io::Error {
    fn from(error: StartupError) -> Self {
        io::Error::other(error.to_string())
    }
}

/// Repository ports backed by one store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub bootcamps: Arc<dyn BootcampRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl Repositories {
    /// Every repository served by the same in-memory store.
    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            bootcamps: Arc::new(store.clone()),
            courses: Arc::new(store.clone()),
            reviews: Arc::new(store.clone()),
        }
    }

    /// Every repository served by Diesel over `pool`.
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            bootcamps: Arc::new(DieselBootcampRepository::new(pool.clone())),
            courses: Arc::new(DieselCourseRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        }
    }
}

/// The outbound adapters the domain services are built from.
#[derive(Clone)]
pub struct Adapters {
    pub repositories: Repositories,
    pub geocoder: Arc<dyn Geocoder>,
    pub photos: Arc<dyn PhotoStore>,
    pub mailer: Arc<dyn Mailer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
}

/// Service-level settings that are not adapters.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub public_base_url: String,
    pub max_photo_bytes: usize,
    pub cookies: CookieSettings,
}

impl Adapters {
    /// Construct the domain services and bundle them for the handlers.
    pub fn into_http_state(self, options: ServiceOptions) -> HttpState {
        let Adapters {
            repositories,
            geocoder,
            photos,
            mailer,
            hasher,
            tokens,
            clock,
        } = self;
        HttpState {
            auth: AuthService::new(
                repositories.users.clone(),
                hasher.clone(),
                tokens,
                mailer,
                clock.clone(),
                AuthServiceConfig {
                    public_base_url: options.public_base_url,
                },
            ),
            bootcamps: BootcampService::new(
                repositories.bootcamps.clone(),
                geocoder,
                photos,
                clock.clone(),
                options.max_photo_bytes,
            ),
            courses: CourseService::new(
                repositories.courses,
                repositories.bootcamps.clone(),
                clock.clone(),
            ),
            reviews: ReviewService::new(
                repositories.reviews,
                repositories.bootcamps,
                clock.clone(),
            ),
            users: UserService::new(repositories.users, hasher, clock),
            cookies: options.cookies,
        }
    }
}

/// Assemble the HTTP state described by `settings`.
///
/// Pending migrations are applied before the pool is created.
pub async fn build_http_state(settings: &AppSettings) -> Result<HttpState, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let adapters = Adapters {
        repositories: build_repositories(settings).await?,
        geocoder: build_geocoder(settings)?,
        photos: build_photo_store(settings)?,
        mailer: build_mailer(settings)?,
        hasher: Arc::new(build_hasher(settings)),
        tokens: Arc::new(build_token_service(settings, clock.clone())?),
        clock,
    };
    Ok(adapters.into_http_state(ServiceOptions {
        public_base_url: settings.public_base_url(),
        max_photo_bytes: settings.max_file_upload(),
        cookies: CookieSettings {
            lifetime: settings.cookie_lifetime()?,
            secure: settings.cookie_secure,
        },
    }))
}

async fn build_repositories(settings: &AppSettings) -> Result<Repositories, StartupError> {
    match settings.database_url() {
        Some(url) => {
            run_migrations(url).await?;
            let pool = DbPool::new(PoolConfig::new(url)).await?;
            info!("using PostgreSQL repositories");
            Ok(Repositories::diesel(&pool))
        }
        None => {
            warn!("no database_url configured; data is kept in memory only");
            Ok(Repositories::in_memory(&InMemoryStore::new()))
        }
    }
}

fn build_geocoder(settings: &AppSettings) -> Result<Arc<dyn Geocoder>, StartupError> {
    let Some(api_key) = settings.geocoder_api_key() else {
        warn!("no geocoder_api_key configured; using fixture geocoder");
        return Ok(Arc::new(FixtureGeocoder::default()));
    };
    let geocoder = MapQuestGeocoder::new(MapQuestSettings {
        endpoint: settings.geocoder_endpoint()?,
        api_key: Zeroizing::new(api_key.to_owned()),
        timeout: settings.geocoder_timeout(),
    })?;
    Ok(Arc::new(geocoder))
}

fn build_photo_store(settings: &AppSettings) -> Result<Arc<dyn PhotoStore>, StartupError> {
    let path = settings.upload_dir();
    PhotoDirectory::open(&path)
        .map(|store| Arc::new(store) as Arc<dyn PhotoStore>)
        .map_err(|source| StartupError::Uploads { path, source })
}

fn build_mailer(settings: &AppSettings) -> Result<Arc<dyn Mailer>, StartupError> {
    let Some(host) = settings.smtp_host() else {
        warn!("no smtp_host configured; outgoing mail is logged only");
        return Ok(Arc::new(ConsoleMailer));
    };
    let mailer = SmtpMailer::new(SmtpSettings {
        host: host.to_owned(),
        port: settings.smtp_port(),
        username: settings.smtp_username.clone().unwrap_or_default(),
        password: Zeroizing::new(settings.smtp_password.clone().unwrap_or_default()),
        from_email: settings.from_email().to_owned(),
        from_name: settings.from_name().to_owned(),
    })?;
    Ok(Arc::new(mailer))
}

fn build_hasher(settings: &AppSettings) -> Pbkdf2PasswordHasher {
    settings
        .password_rounds
        .map_or_else(Pbkdf2PasswordHasher::default, Pbkdf2PasswordHasher::with_rounds)
}

fn build_token_service(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> Result<JwtTokenService, StartupError> {
    let secret = match settings.jwt_secret() {
        Some(secret) => Zeroizing::new(secret.to_owned()),
        None if cfg!(debug_assertions) => {
            warn!("no jwt_secret configured; using a temporary secret (dev only)");
            ephemeral_secret()
        }
        None => return Err(StartupError::MissingJwtSecret),
    };
    Ok(JwtTokenService::new(
        JwtSettings {
            secret,
            lifetime: settings.jwt_lifetime()?,
        },
        clock,
    ))
}

fn ephemeral_secret() -> Zeroizing<String> {
    let mut bytes = Zeroizing::new([0_u8; 32]);
    rand::thread_rng().fill_bytes(&mut bytes[..]);
    Zeroizing::new(hex::encode(&bytes[..]))
}
