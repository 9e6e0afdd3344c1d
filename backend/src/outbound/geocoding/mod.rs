//! Geocoding adapters.

mod dto;
mod mapquest;

pub use mapquest::{MapQuestGeocoder, MapQuestSettings};
