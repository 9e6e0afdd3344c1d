//! Token signing and password hashing adapters.

mod jwt;
mod pbkdf2_hasher;

pub use jwt::{JwtSettings, JwtTokenService};
pub use pbkdf2_hasher::Pbkdf2PasswordHasher;
