use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use skimeteo_core::{
    Config, Filter, QueryKey, Selection, SortKey, WeatherError, WeatherStore, all_resorts,
    catalog::require_resort,
    find_resort,
    map::{MapView, MarkerStyle},
    view::{detail_view, join_for_comparison, parse_compare_ids, select_and_order},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skimeteo", version, about = "Météo des Neiges: weather for ski resorts near Geneva")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather cards for every resort.
    Dashboard {
        /// Only resorts whose name contains this text.
        #[arg(long, default_value = "")]
        search: String,

        /// all, snowy, cold or clear. Defaults to the configured filter.
        #[arg(long)]
        filter: Option<Filter>,

        /// name, temperature or snowy. Defaults to the configured sort.
        #[arg(long)]
        sort: Option<SortKey>,

        /// Toggle a resort id into the comparison selection. Repeatable.
        #[arg(long = "select", value_name = "ID")]
        select: Vec<String>,

        /// Also print the map.
        #[arg(long)]
        map: bool,

        /// Redraw every N seconds until interrupted.
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Show the detail view of one resort.
    Resort {
        /// Resort id, e.g. "verbier".
        id: String,
    },

    /// Compare resorts side by side.
    Compare {
        /// Comma-separated resort ids, e.g. "verbier,zermatt".
        #[arg(default_value = "")]
        resorts: String,
    },

    /// List the resort catalog.
    Resorts,

    /// Edit the configuration interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Dashboard { search, filter, sort, select, map, watch } => {
                let config = Config::load()?;
                let store = WeatherStore::from_config(&config)?;
                let filter = filter.unwrap_or(config.default_filter);
                let sort = sort.unwrap_or(config.default_sort);

                let mut selection = Selection::new();
                for id in &select {
                    if find_resort(id).is_none() {
                        warn!(id = %id, "ignoring unknown resort in selection");
                        continue;
                    }
                    selection.toggle(id);
                }

                let cancel = interrupt_token();
                loop {
                    eprintln!("Chargement des données météorologiques...");
                    let Some(outcomes) = store.load_all_until(QueryKey::AllResorts, all_resorts(), &cancel).await
                    else {
                        break;
                    };

                    let visible = select_and_order(all_resorts(), &outcomes, &search, filter, sort);
                    println!("{}", render::dashboard(&visible, &outcomes, &selection, filter, sort));
                    if map {
                        let view = MapView::new(&visible, &outcomes, MarkerStyle::default());
                        println!("{}", render::map(&view));
                    }

                    let Some(secs) = watch else { break };
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_secs(secs.max(1))) => {}
                    }
                }
            }
            Command::Resort { id } => {
                let resort = match require_resort(&id) {
                    Ok(resort) => resort,
                    Err(err @ WeatherError::NotFound(_)) => {
                        info!(%err, "detail view for unknown resort");
                        println!("{}", err.user_message());
                        return Ok(());
                    }
                    Err(err) => return Err(err.into()),
                };

                let config = Config::load()?;
                let store = WeatherStore::from_config(&config)?;
                let cancel = interrupt_token();

                eprintln!("Chargement des données météorologiques...");
                let Some(outcome) = store.load_one_until(resort, &cancel).await else {
                    return Ok(());
                };

                let view = detail_view(&id, all_resorts(), outcome)?;
                println!("{}", render::detail(&view));
            }
            Command::Compare { resorts } => {
                let ids = parse_compare_ids(&resorts);
                if ids.is_empty() {
                    println!("{}", render::NOTHING_TO_COMPARE);
                    return Ok(());
                }

                let config = Config::load()?;
                let store = WeatherStore::from_config(&config)?;
                let cancel = interrupt_token();

                let selected: Vec<_> = ids.iter().filter_map(|id| find_resort(id)).copied().collect();
                let Some(outcomes) =
                    store.load_all_until(QueryKey::comparison(&ids), &selected, &cancel).await
                else {
                    return Ok(());
                };

                let rows = join_for_comparison(&ids, all_resorts(), &outcomes);
                println!("{}", render::comparison(&rows));
            }
            Command::Resorts => {
                print!("{}", render::catalog(all_resorts()));
            }
            Command::Configure => configure()?,
        }

        Ok(())
    }
}

/// Token cancelled on Ctrl-C, so a pending load is abandoned instead of rendered.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    token
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_url = config.base_url.clone();
    config.base_url = Text::new("Open-Meteo endpoint:")
        .with_default(&current_url)
        .prompt()
        .context("Failed to read endpoint")?;

    let current_timezone = config.timezone.clone();
    config.timezone = Text::new("Timezone:")
        .with_default(&current_timezone)
        .prompt()
        .context("Failed to read timezone")?;

    config.stale_minutes = CustomType::<u64>::new("Minutes before weather is refetched:")
        .with_default(config.stale_minutes)
        .prompt()
        .context("Failed to read staleness window")?;

    let sorts = SortKey::all().to_vec();
    let sort_cursor = sorts.iter().position(|s| *s == config.default_sort).unwrap_or(0);
    config.default_sort = Select::new("Default sort:", sorts)
        .with_starting_cursor(sort_cursor)
        .prompt()
        .context("Failed to read default sort")?;

    let filters = Filter::all().to_vec();
    let filter_cursor = filters.iter().position(|f| *f == config.default_filter).unwrap_or(0);
    config.default_filter = Select::new("Default filter:", filters)
        .with_starting_cursor(filter_cursor)
        .prompt()
        .context("Failed to read default filter")?;

    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
