//! Error taxonomy for weather lookups and resort resolution.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// Transport failure or a non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered, but not with the expected payload shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A resort id that is not in the catalog.
    #[error("Resort not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WeatherError {
    /// French message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Erreur lors du chargement des données".to_string(),
            Self::Decode(_) => "Réponse météo illisible".to_string(),
            Self::NotFound(_) => "Station non trouvée".to_string(),
            Self::Config(msg) => format!("Configuration invalide : {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_user_message_is_french() {
        let err = WeatherError::NotFound("nowhere".into());
        assert_eq!(err.user_message(), "Station non trouvée");
        assert!(err.to_string().contains("nowhere"));
    }
}
