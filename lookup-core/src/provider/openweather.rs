use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    Config, LocationQuery, LookupError,
    model::{Coordinates, WeatherRecord},
};

use super::WeatherProvider;

/// Body code OpenWeather uses for an unresolvable location.
const NOT_FOUND_CODE: u64 = 404;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    icon_base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder().build().context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/weather", config.base_url.trim_end_matches('/')),
            icon_base_url: config.icon_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_body(
        &self,
        query: &LocationQuery,
    ) -> Result<(StatusCode, String), LookupError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("units", "imperial"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key; keep it out of the message.
                LookupError::request_failed(format!(
                    "Failed to send request to OpenWeather: {}",
                    e.without_url()
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::request_failed(format!(
                "Failed to read OpenWeather response body: {}",
                e.without_url()
            ))
        })?;

        Ok((status, body))
    }

    fn icon_url(&self, icon: &str) -> String {
        format!("{}/{}@2x.png", self.icon_base_url, icon)
    }

    fn to_record(&self, parsed: OwCurrentResponse) -> Result<WeatherRecord, LookupError> {
        let condition = parsed.weather.into_iter().next().ok_or_else(|| {
            LookupError::request_failed("OpenWeather response contained no weather conditions")
        })?;

        let observed_at = unix_to_utc(parsed.dt).ok_or_else(|| {
            LookupError::request_failed(format!("OpenWeather timestamp out of range: {}", parsed.dt))
        })?;

        Ok(WeatherRecord {
            coordinates: Coordinates { lat: parsed.coord.lat, lon: parsed.coord.lon },
            description: condition.description,
            icon_url: self.icon_url(&condition.icon),
            current_temp: parsed.main.temp,
            feels_like_temp: parsed.main.feels_like,
            place: format!("{}, {}", parsed.name, parsed.sys.country),
            observed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    sys: OwSys,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn fetch_weather(&self, query: &LocationQuery) -> Result<WeatherRecord, LookupError> {
        let result: Result<WeatherRecord, LookupError> = async {
            let (status, body) = self.fetch_body(query).await?;
            debug!(%status, bytes = body.len(), "Received OpenWeather response");

            let value: Value = serde_json::from_str(&body).map_err(|e| {
                LookupError::request_failed(format!(
                    "Failed to parse OpenWeather JSON ({e}): {}",
                    truncate_body(&body)
                ))
            })?;

            // The not-found signal lives in the body, whatever the HTTP status says.
            if is_not_found(&value) {
                return Err(LookupError::NotFound);
            }

            if !status.is_success() {
                return Err(LookupError::request_failed(format!(
                    "OpenWeather request failed with status {}: {}",
                    status,
                    truncate_body(&body),
                )));
            }

            let parsed: OwCurrentResponse = serde_json::from_value(value).map_err(|e| {
                LookupError::request_failed(format!("Unexpected OpenWeather response shape: {e}"))
            })?;

            self.to_record(parsed)
        }
        .await;

        match &result {
            Ok(record) => debug!(place = %record.place, "Resolved location"),
            Err(LookupError::NotFound) => debug!("Location not found"),
            Err(e) => warn!(error = %e, "Weather lookup failed"),
        }

        result
    }
}

/// `cod` arrives as the string `"404"` for unknown places, and as a number elsewhere.
fn is_not_found(body: &Value) -> bool {
    match body.get("cod") {
        Some(Value::String(code)) => code.trim().parse::<u64>().ok() == Some(NOT_FOUND_CODE),
        Some(Value::Number(code)) => code.as_u64() == Some(NOT_FOUND_CODE),
        _ => false,
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
