//! Weather snapshot builder.
//!
//! Queries an open-meteo style forecast endpoint for current conditions and
//! today's outlook. The forecast source returns one document, so degradation
//! is at snapshot granularity: a total fetch failure yields a placeholder
//! with `conditions: "unavailable"`, while fields merely absent from an
//! otherwise valid payload stay null.

use crate::config;
use crate::error::FetchError;
use crate::models::WeatherSnapshot;
use crate::utils::send_text;
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    current: Current,
    #[serde(default)]
    daily: Daily,
}

#[derive(Debug, Default, Deserialize)]
struct Current {
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct Daily {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

/// WMO weather interpretation codes, as the forecast source reports them.
fn describe_weather_code(code: u32) -> Option<&'static str> {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Light rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        _ => return None,
    };
    Some(description)
}

fn format_temp(value: f64) -> String {
    format!("{value:.1}°F")
}

fn first(values: &[Option<f64>]) -> Option<f64> {
    values.first().copied().flatten()
}

/// Normalize a forecast document into a [`WeatherSnapshot`].
fn snapshot_from_forecast(location: &str, forecast: Forecast) -> WeatherSnapshot {
    let conditions = forecast
        .current
        .weather_code
        .and_then(describe_weather_code)
        .unwrap_or("Unknown")
        .to_string();

    WeatherSnapshot {
        location: location.to_string(),
        conditions,
        temp: forecast.current.temperature_2m.map(format_temp),
        feelsLike: forecast.current.apparent_temperature.map(format_temp),
        high: first(&forecast.daily.temperature_2m_max).map(format_temp),
        low: first(&forecast.daily.temperature_2m_min).map(format_temp),
        precipChance: first(&forecast.daily.precipitation_probability_max)
            .map(|p| format!("{p:.0}%")),
    }
}

/// Parse a forecast document into a snapshot for the given location.
pub(crate) fn snapshot_from_json(
    location: &str,
    body: &str,
) -> Result<WeatherSnapshot, FetchError> {
    let forecast: Forecast =
        serde_json::from_str(body).map_err(|e| FetchError::Payload(e.to_string()))?;
    Ok(snapshot_from_forecast(location, forecast))
}

/// Fetch current conditions and today's outlook for the configured location.
#[instrument(level = "info", skip_all)]
pub async fn get_weather(client: &reqwest::Client) -> WeatherSnapshot {
    let request = client
        .get("https://api.open-meteo.com/v1/forecast")
        .query(&[
            ("latitude", config::LATITUDE.to_string()),
            ("longitude", config::LONGITUDE.to_string()),
            (
                "current",
                "temperature_2m,apparent_temperature,weather_code".to_string(),
            ),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_probability_max".to_string(),
            ),
            ("temperature_unit", "fahrenheit".to_string()),
            ("timezone", config::FORECAST_TIMEZONE.to_string()),
        ]);

    let result = match send_text(request).await {
        Ok(body) => snapshot_from_json(config::LOCATION, &body),
        Err(e) => Err(e),
    };
    match result {
        Ok(snapshot) => {
            info!(conditions = %snapshot.conditions, "Built weather snapshot");
            snapshot
        }
        Err(e) => {
            warn!(error = %e, "Forecast fetch failed");
            WeatherSnapshot::unavailable(config::LOCATION)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FORECAST: &str = r#"{
        "current": {
            "temperature_2m": 68.42,
            "apparent_temperature": 67.07,
            "weather_code": 2
        },
        "daily": {
            "temperature_2m_max": [75.0],
            "temperature_2m_min": [58.21],
            "precipitation_probability_max": [10]
        }
    }"#;

    #[test]
    fn test_snapshot_from_full_forecast() {
        let forecast: Forecast = serde_json::from_str(SAMPLE_FORECAST).unwrap();
        let snapshot = snapshot_from_forecast("Los Angeles, CA", forecast);

        assert_eq!(snapshot.location, "Los Angeles, CA");
        assert_eq!(snapshot.conditions, "Partly cloudy");
        assert_eq!(snapshot.temp.as_deref(), Some("68.4°F"));
        assert_eq!(snapshot.feelsLike.as_deref(), Some("67.1°F"));
        assert_eq!(snapshot.high.as_deref(), Some("75.0°F"));
        assert_eq!(snapshot.low.as_deref(), Some("58.2°F"));
        assert_eq!(snapshot.precipChance.as_deref(), Some("10%"));
    }

    #[test]
    fn test_absent_fields_stay_null() {
        let forecast: Forecast = serde_json::from_str(r#"{"current": {"weather_code": 0}}"#).unwrap();
        let snapshot = snapshot_from_forecast("Los Angeles, CA", forecast);

        assert_eq!(snapshot.conditions, "Clear sky");
        assert!(snapshot.temp.is_none());
        assert!(snapshot.feelsLike.is_none());
        assert!(snapshot.high.is_none());
        assert!(snapshot.low.is_none());
        assert!(snapshot.precipChance.is_none());
    }

    #[test]
    fn test_unmapped_or_missing_code_is_unknown() {
        let unmapped: Forecast =
            serde_json::from_str(r#"{"current": {"weather_code": 42}}"#).unwrap();
        assert_eq!(
            snapshot_from_forecast("L", unmapped).conditions,
            "Unknown"
        );

        let missing: Forecast = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot_from_forecast("L", missing).conditions, "Unknown");
    }

    #[test]
    fn test_snapshot_from_json_rejects_malformed_body() {
        assert!(snapshot_from_json("L", "<html>503</html>").is_err());
    }

    #[test]
    fn test_weather_code_table() {
        assert_eq!(describe_weather_code(0), Some("Clear sky"));
        assert_eq!(describe_weather_code(95), Some("Thunderstorm"));
        assert_eq!(describe_weather_code(99), None);
    }

    #[tokio::test]
    async fn test_total_failure_degrades_to_placeholder() {
        // Client pointed at nothing reachable: the snapshot degrades as a
        // whole, and only location/conditions survive.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let request = client.get("http://127.0.0.1:9/forecast");
        let result = match send_text(request).await {
            Ok(body) => snapshot_from_json(config::LOCATION, &body),
            Err(e) => Err(e),
        };
        assert!(result.is_err());

        let snapshot = WeatherSnapshot::unavailable(config::LOCATION);
        assert_eq!(snapshot.conditions, "unavailable");
        assert!(snapshot.temp.is_none());
    }
}
