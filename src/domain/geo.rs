//! Coordinate helpers shared by the EXIF reader, the repository and the map builder.

/// Degrees/minutes/seconds as EXIF stores them: three `(numerator, denominator)` pairs.
pub type Dms = [(f64, f64)];

/// Latitude/longitude pairs below this distance from zero are treated as "no fix".
pub const ZERO_COORD_EPSILON: f64 = 1e-9;

/// Center used when there is nothing to center on.
pub const WORLD_CENTER: (f64, f64) = (20.0, 0.0);

/// Converts EXIF DMS rationals to signed decimal degrees.
///
/// Returns `None` when fewer than three components are given or a denominator is zero.
/// A reference of `S` or `W` yields a negative value.
pub fn dms_to_decimal(dms: &Dms, reference: Option<&str>) -> Option<f64> {
    if dms.len() < 3 {
        return None;
    }

    let mut parts = [0.0_f64; 3];
    for (slot, (num, den)) in parts.iter_mut().zip(dms.iter()) {
        if *den == 0.0 {
            return None;
        }
        *slot = num / den;
    }

    let degrees = parts[0] + parts[1] / 60.0 + parts[2] / 3600.0;
    match reference.map(str::trim) {
        Some("S") | Some("W") => Some(-degrees),
        _ => Some(degrees),
    }
}

/// `(min_lat, min_lon, max_lat, max_lon)` of the given `(lat, lon)` points.
pub fn bounds_from_points(points: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let (first, rest) = points.split_first()?;
    let init = (first.0, first.1, first.0, first.1);

    Some(rest.iter().fold(init, |(min_lat, min_lon, max_lat, max_lon), &(lat, lon)| {
        (
            min_lat.min(lat),
            min_lon.min(lon),
            max_lat.max(lat),
            max_lon.max(lon),
        )
    }))
}

/// Mean position of the points, or [`WORLD_CENTER`] for an empty set.
pub fn initial_center(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return WORLD_CENTER;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(a, b), &(lat, lon)| (a + lat, b + lon));
    (lat_sum / n, lon_sum / n)
}

/// Cameras without a fix frequently write (0, 0); treat it as missing.
pub fn drop_zero_coordinate(lat: Option<f64>, lon: Option<f64>) -> (Option<f64>, Option<f64>) {
    match (lat, lon) {
        (Some(a), Some(b)) if a.abs() < ZERO_COORD_EPSILON && b.abs() < ZERO_COORD_EPSILON => {
            (None, None)
        }
        other => other,
    }
}
