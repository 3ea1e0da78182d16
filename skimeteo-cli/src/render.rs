//! French text rendering of the dashboard views.

use std::fmt::{self, Write};

use skimeteo_core::{
    ComparisonRow, DetailView, Filter, Outcomes, Resort, Selection, SortKey, WeatherOutcome, WeatherReading,
    classify,
    map::{MapView, TILE_ATTRIBUTION, TILE_URL_TEMPLATE},
};

pub const FOOTER: &str = "Données météorologiques fournies par Open-Meteo (https://open-meteo.com)";
pub const NO_MATCH: &str = "Aucune station trouvée correspondant à vos critères.";
pub const NOTHING_TO_COMPARE: &str = "Aucune station à comparer";

/// Run a writer against a fresh `String`.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write(&mut out);
    out
}

fn placeholder(outcome: &WeatherOutcome) -> &'static str {
    match outcome {
        WeatherOutcome::Failed(_) => "Données indisponibles",
        _ => "Chargement des données météorologiques...",
    }
}

fn snow_badge(reading: &WeatherReading) -> &'static str {
    if classify(reading.weathercode).is_snowy_condition {
        "❄️ Conditions de neige"
    } else {
        "⛷️ Pas de neige"
    }
}

/// `HH:MM` of the observation, or the raw provider string.
fn observed_time(reading: &WeatherReading) -> String {
    reading
        .observed_at_local()
        .map_or_else(|| reading.observed_at.clone(), |t| t.format("%H:%M").to_string())
}

fn observed_datetime(reading: &WeatherReading) -> String {
    reading
        .observed_at_local()
        .map_or_else(|| reading.observed_at.clone(), |t| t.format("%d/%m/%Y %H:%M").to_string())
}

pub fn card(resort: &Resort, outcome: &WeatherOutcome, selected: bool) -> String {
    render(|out| write_card(out, resort, outcome, selected))
}

fn write_card(out: &mut String, resort: &Resort, outcome: &WeatherOutcome, selected: bool) -> fmt::Result {
    let mark = if selected { "[x]" } else { "[ ]" };
    writeln!(out, "{mark} {} ({})", resort.name, resort.id)?;
    writeln!(out, "    {}, {} · Altitude {} m", resort.region, resort.country, resort.elevation)?;

    match outcome.reading() {
        Some(reading) => {
            let desc = classify(reading.weathercode);
            writeln!(out, "    {} {}°C  {}", desc.icon, reading.temperature, desc.display_text)?;
            writeln!(out, "    Vent {} km/h · {}", reading.windspeed, snow_badge(reading))?;
            writeln!(out, "    Mis à jour à {}", observed_time(reading))
        }
        None => writeln!(out, "    {}", placeholder(outcome)),
    }
}

pub fn dashboard(
    resorts: &[Resort],
    outcomes: &Outcomes,
    selection: &Selection,
    filter: Filter,
    sort: SortKey,
) -> String {
    render(|out| {
        writeln!(out, "Météo des Neiges")?;
        writeln!(out, "Tableaux de bord météo pour les stations de ski près de Genève")?;
        writeln!(out, "{} · {}", filter.label(), sort.label())?;
        writeln!(out)?;

        if resorts.is_empty() {
            writeln!(out, "{NO_MATCH}")?;
        }

        let pending = WeatherOutcome::Pending;
        for resort in resorts {
            let outcome = outcomes.get(resort.id).unwrap_or(&pending);
            write_card(out, resort, outcome, selection.contains(resort.id))?;
            writeln!(out)?;
        }

        if let Some(query) = selection.compare_query() {
            writeln!(out, "Comparer ({}) : /compare?{query}", selection.len())?;
        }

        writeln!(out, "{FOOTER}")
    })
}

pub fn detail(view: &DetailView) -> String {
    render(|out| {
        let resort = &view.resort;
        writeln!(out, "{}", resort.name)?;
        writeln!(out, "{}, {} · {} m", resort.region, resort.country, resort.elevation)?;
        writeln!(out)?;

        match (view.reading(), view.condition()) {
            (Some(reading), Some(desc)) => {
                let day = if reading.is_daytime { "Jour" } else { "Nuit" };
                writeln!(out, "Conditions actuelles")?;
                writeln!(out, "  {} {}°C  {}", desc.icon, reading.temperature, desc.display_text)?;
                writeln!(out, "  Vitesse du vent      {} km/h", reading.windspeed)?;
                writeln!(out, "  Direction du vent    {}°", reading.winddirection)?;
                writeln!(out, "  Jour/Nuit            {day}")?;
                writeln!(out, "  Heure de mise à jour {}", observed_datetime(reading))?;
            }
            _ if matches!(view.outcome, WeatherOutcome::Failed(_)) => {
                writeln!(out, "Erreur lors du chargement des données")?;
            }
            _ => writeln!(out, "Chargement des données météorologiques...")?,
        }

        writeln!(out)?;
        writeln!(out, "Informations de la station")?;
        writeln!(out, "  Région          {}", resort.region)?;
        writeln!(out, "  Pays            {}", resort.country)?;
        writeln!(out, "  Altitude        {} m", resort.elevation)?;
        writeln!(out, "  Coordonnées GPS {:.4}, {:.4}", resort.latitude, resort.longitude)?;

        if let Some(advice) = view.advice() {
            writeln!(out)?;
            writeln!(out, "{advice}")?;
        }

        writeln!(out)?;
        writeln!(out, "{FOOTER}")
    })
}

pub fn comparison(rows: &[ComparisonRow]) -> String {
    render(|out| {
        writeln!(out, "Comparaison des stations")?;
        writeln!(out, "{} station(s) sélectionnée(s)", rows.len())?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<24} {:>12} {:<28} {:>12}  {}",
            "Station", "Température", "Conditions", "Vent", "État neige"
        )?;

        for row in rows {
            let reading = row.outcome.reading();
            let temperature = reading.map_or_else(|| "-".to_string(), |r| format!("{}°C", r.temperature));
            let conditions = row
                .condition()
                .map_or_else(|| "-".to_string(), |d| format!("{} {}", d.icon, d.display_text));
            let wind = reading.map_or_else(|| "-".to_string(), |r| format!("{} km/h", r.windspeed));
            let snow = match row.condition() {
                Some(d) if d.is_snowy_condition => "❄️ Neige",
                Some(_) => "⛷️ Pas de neige",
                None => "-",
            };

            writeln!(
                out,
                "{:<24} {:>12} {:<28} {:>12}  {}",
                row.resort.name, temperature, conditions, wind, snow
            )?;
            writeln!(
                out,
                "  {}, {} · détails : skimeteo resort {}",
                row.resort.region, row.resort.country, row.resort.id
            )?;
        }

        writeln!(out)?;
        writeln!(out, "{FOOTER}")
    })
}

pub fn map(view: &MapView) -> String {
    render(|out| {
        let (lat, lon) = view.center();
        writeln!(out, "Carte · centre {lat:.4}, {lon:.4} · zoom {}", view.zoom)?;
        if let Some(bounds) = view.bounds().map(|b| b.padded(0.1)) {
            writeln!(
                out,
                "Limites {:.4}, {:.4} → {:.4}, {:.4}",
                bounds.south, bounds.west, bounds.north, bounds.east
            )?;
        }
        writeln!(out, "Tuiles {TILE_URL_TEMPLATE} ({TILE_ATTRIBUTION})")?;
        writeln!(
            out,
            "Marqueur {} ({}×{})",
            view.style.icon_url, view.style.icon_size.0, view.style.icon_size.1
        )?;

        for point in &view.points {
            writeln!(
                out,
                "  📍 {:<24} {:>8.4} {:>8.4}  {}",
                point.name, point.latitude, point.longitude, point.popup
            )?;
        }
        Ok(())
    })
}

pub fn catalog(resorts: &[Resort]) -> String {
    render(|out| {
        for resort in resorts {
            writeln!(
                out,
                "{:<18} {:<24} {:<14} {:<8} {:>5} m",
                resort.id, resort.name, resort.region, resort.country, resort.elevation
            )?;
        }
        Ok(())
    })
}
