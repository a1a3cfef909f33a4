/// Shown wherever a value is missing or not a number.
pub const PLACEHOLDER: &str = "—";

/// Fixed-precision number, or the placeholder for missing/NaN values.
///
/// Exact halves round away from zero (`64.5` → `65`, `10.25` → `10.3`).
pub fn fmt_num(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(n) if !n.is_nan() => {
            let rounded = round_half_up(n, digits);
            format!("{rounded:.digits$}")
        }
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

fn round_half_up(n: f64, digits: usize) -> f64 {
    // Normalise -0.0 so it prints as "0".
    let n = if n == 0.0 { 0.0 } else { n };
    let scale = 10f64.powi(digits as i32);
    let scaled = n * scale;
    if !scaled.is_finite() {
        return n;
    }
    scaled.round() / scale
}
