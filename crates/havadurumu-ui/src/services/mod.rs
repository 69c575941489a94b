pub mod weather_service;

pub use weather_service::{
    request_refresh as request_weather_refresh, tick_sender as weather_tick_sender,
    WeatherError, WeatherServiceMessage,
};
