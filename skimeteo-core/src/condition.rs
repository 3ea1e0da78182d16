//! Weather code classification.
//!
//! Codes follow the WMO vocabulary used by Open-Meteo
//! (<https://open-meteo.com/en/docs#weathervariables>). Supporting a new code
//! means adding a row to `CONDITIONS`; nothing else depends on the set.

use serde::Serialize;

/// Display attributes derived from a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionDescriptor {
    pub display_text: &'static str,
    pub icon: &'static str,
    pub is_snowy_condition: bool,
}

impl ConditionDescriptor {
    const fn new(display_text: &'static str, icon: &'static str, is_snowy_condition: bool) -> Self {
        Self { display_text, icon, is_snowy_condition }
    }
}

pub const UNKNOWN: ConditionDescriptor = ConditionDescriptor::new("Inconnu", "❓", false);

const CONDITIONS: &[(i32, ConditionDescriptor)] = &[
    (0, ConditionDescriptor::new("Ciel dégagé", "☀️", false)),
    (1, ConditionDescriptor::new("Principalement dégagé", "🌤️", false)),
    (2, ConditionDescriptor::new("Partiellement nuageux", "⛅", false)),
    (3, ConditionDescriptor::new("Couvert", "☁️", false)),
    (45, ConditionDescriptor::new("Brouillard", "🌫️", false)),
    (48, ConditionDescriptor::new("Brouillard givrant", "🌫️", false)),
    (51, ConditionDescriptor::new("Bruine faible", "🌦️", false)),
    (53, ConditionDescriptor::new("Bruine modérée", "🌧️", false)),
    (55, ConditionDescriptor::new("Bruine dense", "🌧️", false)),
    (61, ConditionDescriptor::new("Pluie faible", "🌧️", false)),
    (63, ConditionDescriptor::new("Pluie modérée", "🌧️", false)),
    (65, ConditionDescriptor::new("Pluie forte", "⛈️", false)),
    (71, ConditionDescriptor::new("Neige faible", "🌨️", true)),
    (73, ConditionDescriptor::new("Neige modérée", "🌨️", true)),
    (75, ConditionDescriptor::new("Neige forte", "🌨️", true)),
    (77, ConditionDescriptor::new("Grains de neige", "🌨️", true)),
    (80, ConditionDescriptor::new("Averses faibles", "🌧️", false)),
    (81, ConditionDescriptor::new("Averses modérées", "⛈️", false)),
    (82, ConditionDescriptor::new("Averses violentes", "⛈️", false)),
    (85, ConditionDescriptor::new("Averses de neige faibles", "🌨️", true)),
    (86, ConditionDescriptor::new("Averses de neige fortes", "🌨️", true)),
    (95, ConditionDescriptor::new("Orage", "⛈️", false)),
    (96, ConditionDescriptor::new("Orage avec grêle", "⛈️", false)),
    (99, ConditionDescriptor::new("Orage avec grêle", "⛈️", false)),
];

/// Descriptor for `weathercode`; codes outside the table map to [`UNKNOWN`].
pub fn classify(weathercode: i32) -> ConditionDescriptor {
    CONDITIONS
        .iter()
        .find(|(code, _)| *code == weathercode)
        .map(|(_, descriptor)| *descriptor)
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNOWY: [i32; 6] = [71, 73, 75, 77, 85, 86];

    #[test]
    fn snowy_codes_are_snowy() {
        for code in SNOWY {
            assert!(classify(code).is_snowy_condition, "code {code}");
        }
    }

    #[test]
    fn everything_else_is_not_snowy() {
        for code in -200..=200 {
            if !SNOWY.contains(&code) {
                assert!(!classify(code).is_snowy_condition, "code {code}");
            }
        }
        assert!(!classify(i32::MIN).is_snowy_condition);
        assert!(!classify(i32::MAX).is_snowy_condition);
    }

    #[test]
    fn unknown_codes_get_the_unknown_descriptor() {
        for code in [-1, 4, 42, 70, 100, 1000] {
            assert_eq!(classify(code), UNKNOWN);
        }
        assert_eq!(UNKNOWN.icon, "❓");
    }

    #[test]
    fn table_codes_are_unique() {
        for (i, (code, _)) in CONDITIONS.iter().enumerate() {
            assert!(CONDITIONS[i + 1..].iter().all(|(other, _)| other != code), "duplicate {code}");
        }
    }

    #[test]
    fn known_codes_have_text() {
        assert_eq!(classify(0).display_text, "Ciel dégagé");
        assert_eq!(classify(75).display_text, "Neige forte");
        assert_eq!(classify(99).icon, "⛈️");
    }
}
