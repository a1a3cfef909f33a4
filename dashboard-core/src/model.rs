use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Selection value used by the dashboard for "every city".
pub const ALL_CITIES: &str = "__ALL__";

/// One fetched snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub generated_utc: Option<String>,

    #[serde(default)]
    pub cities: Vec<CityReading>,
}

/// A single city's reading inside a snapshot.
///
/// Numeric and text fields are decoded leniently: a value of the wrong JSON
/// type is treated as missing instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityReading {
    pub city: String,

    #[serde(default, deserialize_with = "lenient_number")]
    pub temp_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub feels_like_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wind_mps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pressure_hpa: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub condition_detail: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ts_utc: Option<String>,
}

impl Snapshot {
    /// Cities ordered by name for listing.
    ///
    /// Case-insensitive, ties broken by the raw name.
    pub fn sorted_cities(&self) -> Vec<&CityReading> {
        let mut cities: Vec<&CityReading> = self.cities.iter().collect();
        cities.sort_by(|a, b| {
            a.city
                .to_lowercase()
                .cmp(&b.city.to_lowercase())
                .then_with(|| a.city.cmp(&b.city))
        });
        cities
    }
}

/// Which cities the dashboard is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "city", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    City(String),
}

impl Selection {
    /// Resolve user input against the cities of `snapshot`.
    ///
    /// An exact city name always wins, so a city called "All" stays selectable.
    /// Otherwise the sentinel `__ALL__` or `all` (any case) selects every city.
    pub fn resolve(value: &str, snapshot: Option<&Snapshot>) -> Self {
        let trimmed = value.trim();
        let is_city = snapshot.is_some_and(|s| s.cities.iter().any(|c| c.city == trimmed));
        if !is_city && (trimmed == ALL_CITIES || trimmed.eq_ignore_ascii_case("all")) {
            Selection::All
        } else {
            Selection::City(trimmed.to_string())
        }
    }

    /// Every option a picker offers: all cities first, then each city in name order.
    pub fn options(snapshot: &Snapshot) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(
                snapshot
                    .sorted_cities()
                    .into_iter()
                    .map(|c| Selection::City(c.city.clone())),
            )
            .collect()
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, reading: &CityReading) -> bool {
        match self {
            Selection::All => true,
            Selection::City(name) => reading.city == *name,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("All cities"),
            Selection::City(name) => f.write_str(name),
        }
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|n| n.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
