//! The one place that writes a computed view to the terminal.

use std::io::{self, Write};

use dashboard_core::{DashboardView, LoadStatus, view::Kpi};

/// Print the whole dashboard to stdout.
pub fn print_view(view: &DashboardView, status: LoadStatus) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_view(&mut out, view, status)?;
    out.flush()
}

pub fn print_json(view: &DashboardView) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(view)?;
    println!("{json}");
    Ok(())
}

pub fn print_status(status: LoadStatus) {
    println!("[{status}]");
}

pub fn write_view<W: Write>(
    out: &mut W,
    view: &DashboardView,
    status: LoadStatus,
) -> io::Result<()> {
    writeln!(out, "[{status}] {}", view.selection)?;

    if let Some(banner) = &view.stale_banner {
        writeln!(out, "! {banner}")?;
    }

    writeln!(out)?;
    write_kpi(out, "Temperature", &view.temperature)?;
    write_kpi(out, "Humidity", &view.humidity)?;
    write_kpi(out, "Wind", &view.wind)?;
    writeln!(out, "  {:<12} {}", "Condition", view.condition)?;
    writeln!(out, "  {:<12} {}", "Updated", view.updated)?;
    writeln!(out, "  {:<12} {}", "Coldest", view.coldest)?;
    writeln!(out, "  {:<12} {}", "Windiest", view.windiest)?;

    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:>12} {:>6} {:>5} {:>6} {:>6}  {:<20} {}",
        "City", "Temp", "Feels", "Hum", "Wind", "hPa", "Condition", "Updated"
    )?;
    for row in &view.rows {
        let temp = match row.band {
            Some(band) => format!("{} {}", row.temp, band.as_str()),
            None => row.temp.clone(),
        };
        writeln!(
            out,
            "{:<16} {:>12} {:>6} {:>5} {:>6} {:>6}  {:<20} {}",
            row.city,
            temp,
            row.feels_like,
            row.humidity,
            row.wind,
            row.pressure,
            row.condition,
            row.updated
        )?;
    }
    writeln!(out, "{}", view.generated)
}

fn write_kpi<W: Write>(out: &mut W, name: &str, kpi: &Kpi) -> io::Result<()> {
    let band = kpi
        .band
        .map(|b| format!(" ({})", b.as_str()))
        .unwrap_or_default();
    writeln!(out, "  {name:<12} {}{band}  {}", kpi.value, kpi.delta)
}
