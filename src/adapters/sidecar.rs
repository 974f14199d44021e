//! Google Takeout JSON sidecars (`IMG_1234.JPG.json` or `IMG_1234.json`).

use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidecarData {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub datetime: Option<String>,
}

impl SidecarData {
    fn is_useful(&self) -> bool {
        (self.lat.is_some() && self.lon.is_some()) || self.datetime.is_some()
    }
}

/// Sidecar locations checked in order: `<name>.<ext>.json`, then `<stem>.json`.
pub fn sidecar_candidates(path: &Path) -> Vec<PathBuf> {
    let mut appended = OsString::from(path.as_os_str());
    appended.push(".json");

    vec![PathBuf::from(appended), path.with_extension("json")]
}

/// Reads the first candidate sidecar that yields coordinates or a capture time.
pub fn read_sidecar(path: &Path) -> SidecarData {
    for candidate in sidecar_candidates(path) {
        let text = match std::fs::read_to_string(&candidate) {
            Ok(text) => text,
            Err(_) => continue,
        };
        let json: Value = match serde_json::from_str(&text) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("Ignoring unparseable sidecar {}: {}", candidate.display(), e);
                continue;
            }
        };

        let data = parse_sidecar(&json);
        if data.is_useful() {
            tracing::debug!("Using sidecar {}", candidate.display());
            return data;
        }
    }

    SidecarData::default()
}

pub fn parse_sidecar(json: &Value) -> SidecarData {
    let Some(obj) = json.as_object() else {
        return SidecarData::default();
    };

    let (lat, lon) = ["geoDataExif", "geoData", "location"]
        .iter()
        .filter_map(|key| obj.get(*key))
        .filter(|value| value.is_object())
        .map(pick_lat_lon)
        .find(|(lat, lon)| lat.is_some() && lon.is_some())
        .unwrap_or((None, None));

    let datetime = match obj.get("photoTakenTime") {
        Some(taken) if taken.is_object() => time_value(taken),
        _ => obj
            .get("creationTime")
            .or_else(|| obj.get("creationTimestamp"))
            .and_then(time_value),
    };

    SidecarData { lat, lon, datetime }
}

fn pick_lat_lon(geo: &Value) -> (Option<f64>, Option<f64>) {
    match (
        geo.get("latitude").and_then(coerce_f64),
        geo.get("longitude").and_then(coerce_f64),
    ) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Takeout time objects carry `formatted` and `timestamp`; the former wins.
fn time_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("formatted")
            .filter(|v| !is_blank(v))
            .or_else(|| map.get("timestamp"))
            .and_then(scalar_to_string),
        other => scalar_to_string(other),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
