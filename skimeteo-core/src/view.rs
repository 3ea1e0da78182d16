//! View models: the rules that turn the catalog plus fetched outcomes into
//! what the dashboard, detail and comparison views show.
//!
//! Everything here is pure. Resorts absent from an outcome map are treated
//! as `Pending`.

use std::{cmp::Ordering, collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    catalog::Resort,
    condition::{ConditionDescriptor, classify},
    error::WeatherError,
    model::{WeatherOutcome, WeatherReading},
};

/// Dashboard condition filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Snowy,
    Cold,
    Clear,
}

impl Filter {
    pub const fn all() -> &'static [Filter] {
        &[Filter::All, Filter::Snowy, Filter::Cold, Filter::Clear]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Snowy => "snowy",
            Filter::Cold => "cold",
            Filter::Clear => "clear",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "Tous les filtres",
            Filter::Snowy => "Conditions neigeuses",
            Filter::Cold => "Froid (< 0°C)",
            Filter::Clear => "Dégagé",
        }
    }

    /// Whether a resort with this outcome passes the filter.
    pub fn admits(&self, outcome: &WeatherOutcome) -> bool {
        let reading = match (self, outcome.reading()) {
            (Filter::All, _) => return true,
            (_, None) => return false,
            (_, Some(reading)) => reading,
        };

        match self {
            Filter::All => true,
            Filter::Snowy => classify(reading.weathercode).is_snowy_condition,
            Filter::Cold => reading.temperature < 0.0,
            Filter::Clear => reading.weathercode <= 2,
        }
    }
}

/// Dashboard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Temperature,
    Snowy,
}

impl SortKey {
    pub const fn all() -> &'static [SortKey] {
        &[SortKey::Name, SortKey::Temperature, SortKey::Snowy]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Temperature => "temperature",
            SortKey::Snowy => "snowy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Trier par nom",
            SortKey::Temperature => "Trier par température",
            SortKey::Snowy => "Neige en premier",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Filter::all()
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown filter '{value}'. Supported filters: all, snowy, cold, clear."))
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortKey::all()
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown sort '{value}'. Supported sorts: name, temperature, snowy."))
    }
}

fn outcome_of<'a>(outcomes: &'a HashMap<String, WeatherOutcome>, id: &str) -> &'a WeatherOutcome {
    static PENDING: WeatherOutcome = WeatherOutcome::Pending;
    outcomes.get(id).unwrap_or(&PENDING)
}

fn is_snowy(outcome: &WeatherOutcome) -> bool {
    outcome.reading().is_some_and(|r| classify(r.weathercode).is_snowy_condition)
}

/// Search, filter and sort the dashboard's resorts.
pub fn select_and_order(
    resorts: &[Resort],
    outcomes: &HashMap<String, WeatherOutcome>,
    search_term: &str,
    filter: Filter,
    sort_key: SortKey,
) -> Vec<Resort> {
    let needle = search_term.to_lowercase();

    let mut selected: Vec<Resort> = resorts
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .filter(|r| filter.admits(outcome_of(outcomes, r.id)))
        .copied()
        .collect();

    match sort_key {
        SortKey::Name => selected.sort_by(|a, b| collate(a.name, b.name)),
        SortKey::Temperature => {
            // Resorts without a reading sort as 0°C.
            let temperature =
                |r: &Resort| outcome_of(outcomes, r.id).reading().map_or(0.0, |w| w.temperature);
            selected.sort_by(|a, b| temperature(a).total_cmp(&temperature(b)));
        }
        SortKey::Snowy => selected.sort_by_key(|r| !is_snowy(outcome_of(outcomes, r.id))),
    }

    selected
}

/// Locale-style ordering for resort names: case and accents only break ties.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }
    out
}

/// Resorts picked for comparison, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Query string of the comparison view, e.g. `resorts=verbier,zermatt`.
    pub fn compare_query(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("resorts={}", self.ids.join(",")))
    }
}

/// Ids from a comparison query value (`verbier,zermatt`).
///
/// Blank segments and repeated ids are dropped; first occurrence wins.
pub fn parse_compare_ids(value: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub resort: Resort,
    pub outcome: WeatherOutcome,
}

impl ComparisonRow {
    pub fn condition(&self) -> Option<ConditionDescriptor> {
        self.outcome.reading().map(|r| classify(r.weathercode))
    }
}

/// Pair each requested id with its resort and outcome, in request order.
///
/// Ids missing from `catalog` are dropped without error.
pub fn join_for_comparison<S: AsRef<str>>(
    ids: &[S],
    catalog: &[Resort],
    outcomes: &HashMap<String, WeatherOutcome>,
) -> Vec<ComparisonRow> {
    ids.iter()
        .filter_map(|id| catalog.iter().find(|r| r.id == id.as_ref()))
        .map(|resort| ComparisonRow { resort: *resort, outcome: outcome_of(outcomes, resort.id).clone() })
        .collect()
}

pub const SNOWY_ADVICE: &str = "❄️ Conditions neigeuses - Idéal pour le ski!";
pub const CHECK_LOCALLY_ADVICE: &str = "⛷️ Vérifiez les conditions locales avant de partir";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub resort: Resort,
    pub outcome: WeatherOutcome,
}

impl DetailView {
    pub fn reading(&self) -> Option<&WeatherReading> {
        self.outcome.reading()
    }

    pub fn condition(&self) -> Option<ConditionDescriptor> {
        self.reading().map(|r| classify(r.weathercode))
    }

    pub fn advice(&self) -> Option<&'static str> {
        self.condition()
            .map(|c| if c.is_snowy_condition { SNOWY_ADVICE } else { CHECK_LOCALLY_ADVICE })
    }
}

/// Detail view for `id`, or [`WeatherError::NotFound`] if the catalog lacks it.
pub fn detail_view(id: &str, catalog: &[Resort], outcome: WeatherOutcome) -> Result<DetailView, WeatherError> {
    let resort = catalog
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| WeatherError::NotFound(id.to_string()))?;

    Ok(DetailView { resort: *resort, outcome })
}
