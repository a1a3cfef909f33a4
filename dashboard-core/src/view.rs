//! Turns the dashboard state into a plain [`DashboardView`] that any display
//! surface can print. Nothing in here performs I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    CityReading, DashboardState, Selection, Snapshot,
    aggregate::{self, Aggregates, TempBand, Trend, delta_text},
    config::DEFAULT_STALE_MINUTES,
    format::{PLACEHOLDER, fmt_num, or_placeholder},
};

const MULTIPLE_CITIES: &str = "Multiple cities";

/// Inputs to rendering that are not part of the dashboard state.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub now: DateTime<Utc>,
    pub stale_minutes: i64,
}

impl RenderSettings {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            stale_minutes: DEFAULT_STALE_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityOption {
    pub value: Selection,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub value: String,
    pub band: Option<TempBand>,
    pub delta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub city: String,
    pub temp: String,
    pub band: Option<TempBand>,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub condition: String,
    pub updated: String,
}

/// Everything the dashboard shows, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub options: Vec<CityOption>,
    pub stale_banner: Option<String>,
    pub temperature: Kpi,
    pub humidity: Kpi,
    pub wind: Kpi,
    pub condition: String,
    pub updated: String,
    pub coldest: String,
    pub windiest: String,
    pub generated: String,
    pub rows: Vec<TableRow>,
}

/// Compute the view for the current snapshot, or `None` before the first load.
pub fn render(
    state: &DashboardState,
    selection: &Selection,
    settings: RenderSettings,
) -> Option<DashboardView> {
    let current = state.current.as_ref()?;
    Some(render_snapshot(
        current,
        state.previous.as_ref(),
        selection,
        settings,
    ))
}

pub fn render_snapshot(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    selection: &Selection,
    settings: RenderSettings,
) -> DashboardView {
    let cities = current.sorted_cities();
    let options = Selection::options(current)
        .into_iter()
        .map(|value| CityOption {
            label: value.to_string(),
            value,
        })
        .collect();

    let filtered: Vec<&CityReading> = cities
        .iter()
        .copied()
        .filter(|c| selection.matches(c))
        .collect();

    let agg = Aggregates::over(filtered.iter().copied());
    let prev_agg = previous.map(|p| Aggregates::for_selection(p, selection));
    let trend = |cur: Option<f64>, pick: fn(&Aggregates) -> Option<f64>| {
        prev_agg.as_ref().and_then(|p| Trend::between(cur, pick(p)))
    };

    let stale_banner = aggregate::stale_age(
        current.generated_utc.as_deref(),
        settings.now,
        settings.stale_minutes,
    )
    .map(|age| format!("Data may be stale: generated {age} minutes ago (UTC)."));

    let (condition, updated) = match filtered.as_slice() {
        [only] => (
            or_placeholder(only.condition.as_deref()),
            or_placeholder(only.ts_utc.as_deref()),
        ),
        _ => (
            MULTIPLE_CITIES.to_string(),
            or_placeholder(current.generated_utc.as_deref()),
        ),
    };

    let (coldest, windiest) = if selection.is_all() && !cities.is_empty() {
        (
            aggregate::min_by(&cities, |c| c.temp_c)
                .map(|c| format!("{} ({} °C)", c.city, fmt_num(c.temp_c, 1)))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            aggregate::max_by(&cities, |c| c.wind_mps)
                .map(|c| format!("{} ({} m/s)", c.city, fmt_num(c.wind_mps, 1)))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        )
    } else {
        (PLACEHOLDER.to_string(), PLACEHOLDER.to_string())
    };

    DashboardView {
        selection: selection.clone(),
        options,
        stale_banner,
        temperature: Kpi {
            value: format!("{} °C", fmt_num(agg.temp_c, 1)),
            band: TempBand::classify(agg.temp_c),
            delta: delta_text(trend(agg.temp_c, |a| a.temp_c), "°C", 1),
        },
        humidity: Kpi {
            value: format!("{} %", fmt_num(agg.humidity, 0)),
            band: None,
            delta: delta_text(trend(agg.humidity, |a| a.humidity), "%", 0),
        },
        wind: Kpi {
            value: format!("{} m/s", fmt_num(agg.wind_mps, 1)),
            band: None,
            delta: delta_text(trend(agg.wind_mps, |a| a.wind_mps), "m/s", 1),
        },
        condition,
        updated,
        coldest,
        windiest,
        generated: format!(
            "generated_utc: {}",
            or_placeholder(current.generated_utc.as_deref())
        ),
        rows: filtered.iter().map(|c| table_row(c)).collect(),
    }
}

fn table_row(c: &CityReading) -> TableRow {
    TableRow {
        city: c.city.clone(),
        temp: format!("{}°", fmt_num(c.temp_c, 1)),
        band: TempBand::classify(c.temp_c),
        feels_like: fmt_num(c.feels_like_c, 1),
        humidity: fmt_num(c.humidity, 0),
        wind: fmt_num(c.wind_mps, 1),
        pressure: fmt_num(c.pressure_hpa, 0),
        condition: or_placeholder(c.condition_detail.as_deref().or(c.condition.as_deref())),
        updated: or_placeholder(c.ts_utc.as_deref()),
    }
}
