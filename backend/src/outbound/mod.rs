//! Driven adapters implementing the domain ports.
//!
//! - `persistence`: Diesel/PostgreSQL repositories and migrations.
//! - `memory`: in-process repositories for development and tests.
//! - `geocoding`: MapQuest HTTP geocoder.
//! - `security`: JWT bearer tokens and PBKDF2 password hashes.
//! - `mail`: SMTP delivery and a logging fallback.
//! - `storage`: photo uploads on the local filesystem.

pub mod geocoding;
pub mod mail;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
