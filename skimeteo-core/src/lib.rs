//! Core library for the `skimeteo` ski resort weather dashboard.
//!
//! This crate defines:
//! - The static resort catalog
//! - Weather lookups against Open-Meteo, behind a provider trait
//! - Weather code classification
//! - The aggregation layer that caches per-resort outcomes
//! - View models for the dashboard, detail, comparison and map views
//! - Configuration handling
//!
//! It is used by `skimeteo-cli`, but can also be reused by other front ends.

pub mod catalog;
pub mod condition;
pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod provider;
pub mod store;
pub mod view;

pub use catalog::{Resort, all_resorts, find_resort};
pub use condition::{ConditionDescriptor, classify};
pub use config::Config;
pub use error::WeatherError;
pub use model::{WeatherOutcome, WeatherReading};
pub use provider::WeatherProvider;
pub use store::{Outcomes, QueryKey, WeatherStore};
pub use view::{ComparisonRow, DetailView, Filter, Selection, SortKey};
