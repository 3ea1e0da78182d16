use crate::{Config, WeatherReading, error::WeatherError, provider::openmeteo::OpenMeteoProvider};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openmeteo;

/// Source of current conditions for a coordinate pair.
///
/// One call is one outbound request: implementations do not retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReading, WeatherError>;
}

/// Construct the Open-Meteo provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    config.validate()?;

    let provider = OpenMeteoProvider::new(
        config.base_url.clone(),
        config.timezone.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(Box::new(provider))
}
