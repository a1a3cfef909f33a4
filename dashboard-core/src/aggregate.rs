//! Pure computations behind the KPI cards: means, extremes, temperature
//! bands, staleness and trend deltas.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::{
    CityReading, Selection, Snapshot,
    format::{PLACEHOLDER, fmt_num},
};

/// Absolute deltas below this count as no change.
pub const STEADY_EPSILON: f64 = 0.05;

/// Mean of a field over the readings that define it; `None` if none do.
pub fn mean<'a, I, F>(readings: I, field: F) -> Option<f64>
where
    I: IntoIterator<Item = &'a CityReading>,
    F: Fn(&CityReading) -> Option<f64>,
{
    let (sum, count) = readings
        .into_iter()
        .filter_map(field)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Mean temperature, humidity and wind over a set of readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_mps: Option<f64>,
}

impl Aggregates {
    pub fn over<'a, I>(readings: I) -> Self
    where
        I: IntoIterator<Item = &'a CityReading> + Clone,
    {
        Self {
            temp_c: mean(readings.clone(), |r| r.temp_c),
            humidity: mean(readings.clone(), |r| r.humidity),
            wind_mps: mean(readings, |r| r.wind_mps),
        }
    }

    /// Aggregates of a snapshot restricted to `selection`.
    pub fn for_selection(snapshot: &Snapshot, selection: &Selection) -> Self {
        Self::over(snapshot.cities.iter().filter(|c| selection.matches(c)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TempBand {
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TempBand {
    /// `<0` cold, `[0,12)` mild, `[12,25)` warm, `>=25` hot.
    pub fn classify(temp_c: Option<f64>) -> Option<Self> {
        let t = temp_c.filter(|t| !t.is_nan())?;
        Some(if t < 0.0 {
            TempBand::Cold
        } else if t < 12.0 {
            TempBand::Mild
        } else if t < 25.0 {
            TempBand::Warm
        } else {
            TempBand::Hot
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TempBand::Cold => "cold",
            TempBand::Mild => "mild",
            TempBand::Warm => "warm",
            TempBand::Hot => "hot",
        }
    }
}

/// Reading with the smallest value of `field`; the first one wins a tie.
pub fn min_by<'a, F>(readings: &[&'a CityReading], field: F) -> Option<&'a CityReading>
where
    F: Fn(&CityReading) -> Option<f64>,
{
    extreme_by(readings, field, |candidate, best| candidate < best)
}

/// Reading with the largest value of `field`; the first one wins a tie.
pub fn max_by<'a, F>(readings: &[&'a CityReading], field: F) -> Option<&'a CityReading>
where
    F: Fn(&CityReading) -> Option<f64>,
{
    extreme_by(readings, field, |candidate, best| candidate > best)
}

fn extreme_by<'a, F, B>(
    readings: &[&'a CityReading],
    field: F,
    better: B,
) -> Option<&'a CityReading>
where
    F: Fn(&CityReading) -> Option<f64>,
    B: Fn(f64, f64) -> bool,
{
    let mut best: Option<(&'a CityReading, f64)> = None;
    for &reading in readings {
        let Some(value) = field(reading) else {
            continue;
        };
        match best {
            Some((_, current)) if !better(value, current) => {}
            _ => best = Some((reading, value)),
        }
    }
    best.map(|(reading, _)| reading)
}

/// Parse a snapshot timestamp.
///
/// Accepts RFC 3339 and RFC 2822. A bare ISO date-time, or a date alone
/// (midnight), is taken as UTC.
pub fn parse_utc(stamp: &str) -> Option<DateTime<Utc>> {
    let stamp = stamp.trim();
    let with_offset = DateTime::parse_from_rfc3339(stamp)
        .or_else(|_| DateTime::parse_from_rfc2822(stamp))
        .ok();
    if let Some(dt) = with_offset {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok()?;
    Some(naive.and_utc())
}

/// Whole minutes between `generated` and `now`, rounded down.
pub fn age_minutes(generated: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - generated).num_milliseconds().div_euclid(60_000)
}

/// Age in minutes when the snapshot is at least `threshold_minutes` old.
///
/// `None` when the timestamp is missing or unparseable, or the data is fresh.
pub fn stale_age(
    generated_utc: Option<&str>,
    now: DateTime<Utc>,
    threshold_minutes: i64,
) -> Option<i64> {
    let generated = parse_utc(generated_utc?)?;
    let age = age_minutes(generated, now);
    (age >= threshold_minutes).then_some(age)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Steady,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Steady => "→",
        }
    }
}

/// Change of one aggregate since the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: Direction,
    /// Absolute change; zero when steady.
    pub magnitude: f64,
}

impl Trend {
    pub fn between(current: Option<f64>, previous: Option<f64>) -> Option<Self> {
        let d = current? - previous?;
        if d.is_nan() {
            return None;
        }
        let (direction, magnitude) = if d.abs() < STEADY_EPSILON {
            (Direction::Steady, 0.0)
        } else if d > 0.0 {
            (Direction::Up, d.abs())
        } else {
            (Direction::Down, d.abs())
        };
        Some(Trend {
            direction,
            magnitude,
        })
    }
}

/// `"↑ 1.2 °C vs last refresh"`, or the placeholder when there is nothing to compare.
pub fn delta_text(trend: Option<Trend>, unit: &str, digits: usize) -> String {
    match trend {
        Some(t) => format!(
            "{} {} {unit} vs last refresh",
            t.direction.arrow(),
            fmt_num(Some(t.magnitude), digits)
        ),
        None => PLACEHOLDER.to_string(),
    }
}
