use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Current conditions at one resort, normalized from the provider payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
    pub is_daytime: bool,
    /// Provider timestamp, local to the requested timezone (e.g. `2024-01-15T10:00`).
    pub observed_at: String,
}

impl WeatherReading {
    /// `observed_at` as a date-time, when it follows the provider's ISO layout.
    pub fn observed_at_local(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.observed_at, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.observed_at, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

/// Per-resort result of a weather lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WeatherOutcome {
    #[default]
    Pending,
    Available(WeatherReading),
    Failed(String),
}

impl WeatherOutcome {
    pub fn reading(&self) -> Option<&WeatherReading> {
        match self {
            Self::Available(reading) => Some(reading),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(observed_at: &str) -> WeatherReading {
        WeatherReading {
            temperature: -3.5,
            windspeed: 12.0,
            winddirection: 270.0,
            weathercode: 71,
            is_daytime: true,
            observed_at: observed_at.to_string(),
        }
    }

    #[test]
    fn parses_provider_timestamp() {
        let parsed = reading("2024-01-15T10:00").observed_at_local().expect("valid timestamp");
        assert_eq!(parsed.format("%d/%m/%Y %H:%M").to_string(), "15/01/2024 10:00");
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        assert!(reading("yesterday").observed_at_local().is_none());
    }

    #[test]
    fn outcome_reading_only_when_available() {
        assert!(WeatherOutcome::Pending.reading().is_none());
        assert!(WeatherOutcome::Failed("boom".into()).reading().is_none());
        let available = WeatherOutcome::Available(reading("2024-01-15T10:00"));
        assert_eq!(available.reading().map(|r| r.weathercode), Some(71));
        assert!(available.is_available());
    }
}
