use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config, LocationQuery, LookupError, WeatherRecord, provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Source of current weather for a location query.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Issue exactly one request for `query` and map the answer to a record.
    async fn fetch_weather(&self, query: &LocationQuery) -> Result<WeatherRecord, LookupError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;
    OpenWeatherProvider::new(api_key.to_owned(), config)
}
