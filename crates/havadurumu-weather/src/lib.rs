//! Weather lookups for Havadurumu
//!
//! Current conditions and a 5-day forecast from OpenWeatherMap, plus city
//! resolution from user input or IP geolocation.

pub mod client;
pub mod resolver;
pub mod types;

pub use client::{WeatherClient, WeatherClientConfig};
pub use resolver::{normalize_city_name, CityResolver};
pub use types::*;
