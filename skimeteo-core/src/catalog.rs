//! Static catalog of ski resorts around Geneva.
//!
//! The table is compiled in and never changes during a session; every other
//! module refers to resorts by their `id`.

use serde::Serialize;

use crate::error::WeatherError;

/// A ski resort with fixed identity and location.
///
/// Fields are `&'static str` so the catalog can live in a `static`. Resorts
/// built at runtime (tests, fixtures) use string literals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resort {
    pub id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Village elevation in meters.
    pub elevation: u32,
    pub country: &'static str,
    pub region: &'static str,
}

static RESORTS: &[Resort] = &[
    Resort {
        id: "chamonix",
        name: "Chamonix-Mont-Blanc",
        latitude: 45.9237,
        longitude: 6.8694,
        elevation: 1035,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "megeve",
        name: "Megève",
        latitude: 45.8567,
        longitude: 6.6175,
        elevation: 1113,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "la-clusaz",
        name: "La Clusaz",
        latitude: 45.9046,
        longitude: 6.4237,
        elevation: 1100,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "le-grand-bornand",
        name: "Le Grand-Bornand",
        latitude: 45.9419,
        longitude: 6.4278,
        elevation: 1000,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "avoriaz",
        name: "Avoriaz",
        latitude: 46.1905,
        longitude: 6.7739,
        elevation: 1800,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "les-gets",
        name: "Les Gets",
        latitude: 46.1586,
        longitude: 6.6697,
        elevation: 1172,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "flaine",
        name: "Flaine",
        latitude: 46.0056,
        longitude: 6.6897,
        elevation: 1600,
        country: "France",
        region: "Haute-Savoie",
    },
    Resort {
        id: "val-d-isere",
        name: "Val d'Isère",
        latitude: 45.4481,
        longitude: 6.9806,
        elevation: 1850,
        country: "France",
        region: "Savoie",
    },
    Resort {
        id: "tignes",
        name: "Tignes",
        latitude: 45.4683,
        longitude: 6.9056,
        elevation: 2100,
        country: "France",
        region: "Savoie",
    },
    Resort {
        id: "les-arcs",
        name: "Les Arcs",
        latitude: 45.5722,
        longitude: 6.8292,
        elevation: 1600,
        country: "France",
        region: "Savoie",
    },
    Resort {
        id: "courchevel",
        name: "Courchevel",
        latitude: 45.4154,
        longitude: 6.6347,
        elevation: 1850,
        country: "France",
        region: "Savoie",
    },
    Resort {
        id: "verbier",
        name: "Verbier",
        latitude: 46.0952,
        longitude: 7.2262,
        elevation: 1500,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "zermatt",
        name: "Zermatt",
        latitude: 46.0207,
        longitude: 7.7491,
        elevation: 1620,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "crans-montana",
        name: "Crans-Montana",
        latitude: 46.3166,
        longitude: 7.5171,
        elevation: 1500,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "saas-fee",
        name: "Saas-Fee",
        latitude: 46.1081,
        longitude: 7.9276,
        elevation: 1800,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "champery",
        name: "Champéry",
        latitude: 46.1773,
        longitude: 6.8706,
        elevation: 1050,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "evolene",
        name: "Évolène",
        latitude: 46.1128,
        longitude: 7.4944,
        elevation: 1371,
        country: "Suisse",
        region: "Valais",
    },
    Resort {
        id: "villars",
        name: "Villars-sur-Ollon",
        latitude: 46.2986,
        longitude: 7.0556,
        elevation: 1300,
        country: "Suisse",
        region: "Vaud",
    },
    Resort {
        id: "leysin",
        name: "Leysin",
        latitude: 46.3419,
        longitude: 7.0122,
        elevation: 1263,
        country: "Suisse",
        region: "Vaud",
    },
    Resort {
        id: "gstaad",
        name: "Gstaad",
        latitude: 46.4859,
        longitude: 7.2836,
        elevation: 1050,
        country: "Suisse",
        region: "Berne",
    },
];

/// Every resort, in catalog order.
pub fn all_resorts() -> &'static [Resort] {
    RESORTS
}

pub fn find_resort(id: &str) -> Option<&'static Resort> {
    RESORTS.iter().find(|r| r.id == id)
}

/// Like [`find_resort`], but an unknown id is a [`WeatherError::NotFound`].
pub fn require_resort(id: &str) -> Result<&'static Resort, WeatherError> {
    find_resort(id).ok_or_else(|| WeatherError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = all_resorts().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), all_resorts().len());
    }

    #[test]
    fn coordinates_are_in_the_alps() {
        for resort in all_resorts() {
            assert!((45.0..47.0).contains(&resort.latitude), "{}", resort.id);
            assert!((6.0..8.5).contains(&resort.longitude), "{}", resort.id);
        }
    }

    #[test]
    fn require_unknown_resort_is_not_found() {
        assert_eq!(require_resort("atlantis").unwrap_err(), WeatherError::NotFound("atlantis".into()));
        assert_eq!(require_resort("verbier").map(|r| r.name), Ok("Verbier"));
    }
}
