//! Map model for the dashboard: one marker per resort plus the viewport.
//!
//! Tiles are never fetched here; a renderer gets the tile template, the
//! marker style and the points, and owns everything visual.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    catalog::Resort,
    condition::classify,
    model::WeatherOutcome,
};

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const DEFAULT_CENTER: (f64, f64) = (46.2, 7.5);
pub const DEFAULT_ZOOM: u8 = 8;

/// Marker appearance, handed to [`MapView::new`] once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub icon_url: String,
    pub shadow_url: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            icon_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-icon.png".to_string(),
            shadow_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-shadow.png".to_string(),
            icon_size: (25, 41),
            icon_anchor: (12, 41),
            popup_anchor: (1, -34),
            shadow_size: (41, 41),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Popup summary, e.g. `🌨️ -4.2°C · Vent: 12 km/h`.
    pub popup: String,
}

/// South-west and north-east corners, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Grow each side by `fraction` of the span, at least a hundredth of a degree.
    pub fn padded(&self, fraction: f64) -> Self {
        let lat_pad = ((self.north - self.south) * fraction).max(0.01);
        let lon_pad = ((self.east - self.west) * fraction).max(0.01);
        Self {
            south: self.south - lat_pad,
            west: self.west - lon_pad,
            north: self.north + lat_pad,
            east: self.east + lon_pad,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub style: MarkerStyle,
    pub points: Vec<MapPoint>,
    pub zoom: u8,
}

impl MapView {
    pub fn new(resorts: &[Resort], outcomes: &HashMap<String, WeatherOutcome>, style: MarkerStyle) -> Self {
        let points = resorts
            .iter()
            .map(|resort| MapPoint {
                id: resort.id,
                name: resort.name,
                latitude: resort.latitude,
                longitude: resort.longitude,
                popup: popup_text(outcomes.get(resort.id)),
            })
            .collect();

        Self { style, points, zoom: DEFAULT_ZOOM }
    }

    /// Box around every point, `None` for an empty map.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let init = Bounds {
            south: first.latitude,
            west: first.longitude,
            north: first.latitude,
            east: first.longitude,
        };

        Some(self.points.iter().fold(init, |b, p| Bounds {
            south: b.south.min(p.latitude),
            west: b.west.min(p.longitude),
            north: b.north.max(p.latitude),
            east: b.east.max(p.longitude),
        }))
    }

    /// Where to center the view: the middle of the points, else the Geneva area.
    pub fn center(&self) -> (f64, f64) {
        self.bounds().map_or(DEFAULT_CENTER, |b| b.center())
    }
}

fn popup_text(outcome: Option<&WeatherOutcome>) -> String {
    match outcome.and_then(WeatherOutcome::reading) {
        Some(reading) => format!(
            "{} {}°C · Vent: {} km/h",
            classify(reading.weathercode).icon,
            reading.temperature,
            reading.windspeed
        ),
        None => "Chargement...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherReading;

    fn resort(id: &'static str, latitude: f64, longitude: f64) -> Resort {
        Resort { id, name: id, latitude, longitude, elevation: 1500, country: "France", region: "Savoie" }
    }

    #[test]
    fn bounds_cover_all_points() {
        let resorts = [resort("a", 45.4, 6.9), resort("b", 46.5, 7.3), resort("c", 46.0, 6.4)];
        let map = MapView::new(&resorts, &HashMap::new(), MarkerStyle::default());

        let bounds = map.bounds().expect("non-empty");
        assert_eq!(bounds, Bounds { south: 45.4, west: 6.4, north: 46.5, east: 7.3 });

        let padded = bounds.padded(0.1);
        assert!(padded.south < bounds.south && padded.north > bounds.north);
        assert!(padded.west < bounds.west && padded.east > bounds.east);
    }

    #[test]
    fn empty_map_uses_default_center() {
        let map = MapView::new(&[], &HashMap::new(), MarkerStyle::default());
        assert!(map.bounds().is_none());
        assert_eq!(map.center(), DEFAULT_CENTER);
    }

    #[test]
    fn popup_shows_reading_or_loading() {
        let resorts = [resort("a", 45.0, 6.0), resort("b", 46.0, 7.0)];
        let outcomes = HashMap::from([(
            "a".to_string(),
            WeatherOutcome::Available(WeatherReading {
                temperature: -4.5,
                windspeed: 3.0,
                winddirection: 0.0,
                weathercode: 71,
                is_daytime: false,
                observed_at: "2024-01-15T22:00".into(),
            }),
        )]);

        let map = MapView::new(&resorts, &outcomes, MarkerStyle::default());
        assert_eq!(map.points[0].popup, "🌨️ -4.5°C · Vent: 3 km/h");
        assert_eq!(map.points[1].popup, "Chargement...");
    }

    #[test]
    fn style_is_kept_as_given() {
        let style = MarkerStyle { icon_size: (30, 48), ..MarkerStyle::default() };
        let map = MapView::new(&[], &HashMap::new(), style.clone());
        assert_eq!(map.style, style);
    }
}
