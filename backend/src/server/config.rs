//! Server configuration loaded via OrthoConfig.
//!
//! Every value can come from a `DEVCAMPER_*` environment variable, a
//! configuration file or a command-line flag. Optional integrations fall
//! back to in-process adapters when their settings are absent: no database
//! URL selects the in-memory store, no geocoder key selects the fixture
//! geocoder and no SMTP host selects the console mailer.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_JWT_EXPIRE_DAYS: i64 = 30;
const DEFAULT_COOKIE_EXPIRE_DAYS: i64 = 30;
const MAX_EXPIRE_DAYS: i64 = 36_500;
const SECONDS_PER_DAY: i64 = 86_400;
const DEFAULT_UPLOAD_DIR: &str = "./public/uploads";
const DEFAULT_MAX_FILE_UPLOAD: usize = 1_000_000;
const DEFAULT_GEOCODER_ENDPOINT: &str = "https://www.mapquestapi.com/geocoding/v1/address";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "DevCamper";
const DEFAULT_FROM_EMAIL: &str = "noreply@devcamper.io";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5000";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

/// Runtime settings for the HTTP server and its adapters.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEVCAMPER")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; in-memory stores are used when unset.
    pub database_url: Option<String>,
    /// HMAC secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in days.
    pub jwt_expire_days: Option<i64>,
    /// `token` cookie lifetime in days.
    pub cookie_expire_days: Option<i64>,
    /// Mark the `token` cookie `Secure`.
    #[ortho_config(default = false)]
    pub cookie_secure: bool,
    /// MapQuest consumer key; the fixture geocoder is used when unset.
    pub geocoder_api_key: Option<String>,
    /// Geocoding endpoint override.
    pub geocoder_endpoint: Option<String>,
    /// Directory receiving bootcamp photos.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted photo upload in bytes.
    pub max_file_upload: Option<usize>,
    /// SMTP relay host; mail is logged instead of sent when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    /// Origin used when building password reset links.
    pub public_base_url: Option<String>,
    /// PBKDF2 iteration count for new password hashes.
    pub password_rounds: Option<u32>,
}

impl AppSettings {
    /// Parse the bind address, defaulting to `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|error| ConfigError::new("bind_addr", format!("{raw}: {error}")))
    }

    /// Database URL, if persistence is configured.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// JWT secret, if one is configured.
    pub fn jwt_secret(&self) -> Option<&str> {
        non_blank(self.jwt_secret.as_deref())
    }

    /// Bearer token lifetime, defaulting to 30 days.
    ///
    /// # Errors
    /// Returns [`ConfigError`] unless the day count is between 1 and 36500.
    pub fn jwt_lifetime(&self) -> Result<chrono::Duration, ConfigError> {
        let key = "jwt_expire_days";
        let days = lifetime_days(key, self.jwt_expire_days.unwrap_or(DEFAULT_JWT_EXPIRE_DAYS))?;
        chrono::Duration::try_days(days).ok_or_else(|| out_of_range(key, days))
    }

    /// `token` cookie max-age, defaulting to 30 days.
    ///
    /// # Errors
    /// Returns [`ConfigError`] unless the day count is between 1 and 36500.
    pub fn cookie_lifetime(&self) -> Result<actix_web::cookie::time::Duration, ConfigError> {
        let key = "cookie_expire_days";
        let days = lifetime_days(
            key,
            self.cookie_expire_days.unwrap_or(DEFAULT_COOKIE_EXPIRE_DAYS),
        )?;
        days.checked_mul(SECONDS_PER_DAY)
            .map(actix_web::cookie::time::Duration::seconds)
            .ok_or_else(|| out_of_range(key, days))
    }

    /// MapQuest consumer key, if geocoding against the live service.
    pub fn geocoder_api_key(&self) -> Option<&str> {
        non_blank(self.geocoder_api_key.as_deref())
    }

    /// Geocoding endpoint, defaulting to MapQuest's address API.
    pub fn geocoder_endpoint(&self) -> Result<Url, ConfigError> {
        let raw = non_blank(self.geocoder_endpoint.as_deref()).unwrap_or(DEFAULT_GEOCODER_ENDPOINT);
        Url::parse(raw).map_err(|error| ConfigError::new("geocoder_endpoint", error.to_string()))
    }

    /// Per-request timeout for geocoding calls.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_GEOCODER_TIMEOUT_SECS)
    }

    /// Directory receiving photos, defaulting to `./public/uploads`.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn max_file_upload(&self) -> usize {
        self.max_file_upload.unwrap_or(DEFAULT_MAX_FILE_UPLOAD)
    }

    pub fn smtp_host(&self) -> Option<&str> {
        non_blank(self.smtp_host.as_deref())
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
    }

    pub fn from_email(&self) -> &str {
        non_blank(self.from_email.as_deref()).unwrap_or(DEFAULT_FROM_EMAIL)
    }

    pub fn from_name(&self) -> &str {
        non_blank(self.from_name.as_deref()).unwrap_or(DEFAULT_FROM_NAME)
    }

    /// Reset-link origin without a trailing slash.
    pub fn public_base_url(&self) -> String {
        non_blank(self.public_base_url.as_deref())
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
            .to_owned()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn lifetime_days(key: &'static str, days: i64) -> Result<i64, ConfigError> {
    if days <= 0 {
        Err(ConfigError::new(key, format!("{days} is not a positive day count")))
    } else if days > MAX_EXPIRE_DAYS {
        Err(out_of_range(key, days))
    } else {
        Ok(days)
    }
}

fn out_of_range(key: &'static str, days: i64) -> ConfigError {
    ConfigError::new(
        key,
        format!("{days} days exceeds the {MAX_EXPIRE_DAYS} day maximum"),
    )
}

#[cfg(test)]
mod tests {
    //! Unit tests for server configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 8] = [
        "DEVCAMPER_BIND_ADDR",
        "DEVCAMPER_DATABASE_URL",
        "DEVCAMPER_JWT_SECRET",
        "DEVCAMPER_JWT_EXPIRE_DAYS",
        "DEVCAMPER_COOKIE_SECURE",
        "DEVCAMPER_SMTP_HOST",
        "DEVCAMPER_MAX_FILE_UPLOAD",
        "DEVCAMPER_PUBLIC_BASE_URL",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("devcamper")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:5000".parse::<SocketAddr>().expect("literal address")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.jwt_secret().is_none());
        assert!(!settings.cookie_secure);
        assert_eq!(
            settings.jwt_lifetime().expect("default lifetime"),
            chrono::Duration::days(30)
        );
        assert_eq!(settings.max_file_upload(), DEFAULT_MAX_FILE_UPLOAD);
        assert_eq!(settings.public_base_url(), DEFAULT_PUBLIC_BASE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("DEVCAMPER_BIND_ADDR", Some("127.0.0.1:8080".to_owned())),
            (
                "DEVCAMPER_DATABASE_URL",
                Some("postgres://localhost/devcamper".to_owned()),
            ),
            ("DEVCAMPER_JWT_SECRET", Some("s3cret".to_owned())),
            ("DEVCAMPER_JWT_EXPIRE_DAYS", Some("7".to_owned())),
            ("DEVCAMPER_COOKIE_SECURE", Some("true".to_owned())),
            ("DEVCAMPER_SMTP_HOST", Some("smtp.example.com".to_owned())),
            ("DEVCAMPER_MAX_FILE_UPLOAD", Some("2048".to_owned())),
            (
                "DEVCAMPER_PUBLIC_BASE_URL",
                Some("https://devcamper.io/".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:8080".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/devcamper")
        );
        assert_eq!(settings.jwt_secret(), Some("s3cret"));
        assert_eq!(
            settings.jwt_lifetime().expect("lifetime"),
            chrono::Duration::days(7)
        );
        assert!(settings.cookie_secure);
        assert_eq!(settings.smtp_host(), Some("smtp.example.com"));
        assert_eq!(settings.max_file_upload(), 2048);
        assert_eq!(settings.public_base_url(), "https://devcamper.io");
    }

    #[rstest]
    #[case(Some("   "), None)]
    #[case(None, None)]
    #[case(Some(" postgres://db "), Some("postgres://db"))]
    fn blank_values_count_as_unset(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let settings = AppSettings {
            database_url: raw.map(str::to_owned),
            ..AppSettings::default()
        };
        assert_eq!(settings.database_url(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn non_positive_lifetimes_are_rejected(#[case] days: i64) {
        let settings = AppSettings {
            jwt_expire_days: Some(days),
            ..AppSettings::default()
        };
        let error = settings.jwt_lifetime().expect_err("rejected");
        assert_eq!(error.key, "jwt_expire_days");
    }

    #[rstest]
    #[case(MAX_EXPIRE_DAYS + 1)]
    #[case(i64::MAX)]
    fn oversized_lifetimes_are_rejected(#[case] days: i64) {
        let settings = AppSettings {
            jwt_expire_days: Some(days),
            cookie_expire_days: Some(days),
            ..AppSettings::default()
        };
        assert_eq!(
            settings.jwt_lifetime().expect_err("rejected").key,
            "jwt_expire_days"
        );
        assert_eq!(
            settings.cookie_lifetime().expect_err("rejected").key,
            "cookie_expire_days"
        );
    }

    #[rstest]
    fn oversized_lifetime_from_the_environment_is_an_error() {
        let _guard = lock_env([(
            "DEVCAMPER_JWT_EXPIRE_DAYS",
            Some(i64::MAX.to_string()),
        )]);

        let settings = load_from_empty_args();
        let error = settings.jwt_lifetime().expect_err("rejected");
        assert_eq!(error.key, "jwt_expire_days");
    }

    #[rstest]
    fn longest_lifetimes_are_accepted() {
        let settings = AppSettings {
            jwt_expire_days: Some(MAX_EXPIRE_DAYS),
            cookie_expire_days: Some(MAX_EXPIRE_DAYS),
            ..AppSettings::default()
        };
        assert_eq!(
            settings.jwt_lifetime().expect("lifetime"),
            chrono::Duration::days(MAX_EXPIRE_DAYS)
        );
        assert_eq!(
            settings.cookie_lifetime().expect("lifetime"),
            actix_web::cookie::time::Duration::days(MAX_EXPIRE_DAYS)
        );
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..AppSettings::default()
        };
        let error = settings.bind_addr().expect_err("rejected");
        assert_eq!(error.key, "bind_addr");
    }
}
