use crate::domain::geo::{bounds_from_points, initial_center};
use crate::map::assets::{
    css_for, CDN_SCRIPTS, CDN_STYLESHEETS, GALLERY_MAX_ITEMS, MAP_BOOTSTRAP_JS, SIDEBAR_HTML,
    VIEWPORT_GALLERY_JS,
};
use crate::map::MapOptions;
use crate::report::FeatureCollection;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// Tooltip candidates, in display order, with their labels.
const TOOLTIP_FIELDS: [(&str, &str); 4] = [
    ("path", "File"),
    ("datetime", "Datetime"),
    ("make", "Make"),
    ("model", "Model"),
];

const PAGE_TITLE: &str = "Photo Map";

/// Renders the interactive map page from the in-memory feature collection.
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    options: MapOptions,
}

impl MapBuilder {
    pub fn new(options: MapOptions) -> Self {
        Self { options }
    }

    /// Builds the HTML document. `points` are `(lat, lon)` pairs used for the heat layer,
    /// the initial center and the fitted bounds.
    pub fn build(&self, points: &[(f64, f64)], features: &FeatureCollection) -> Result<String> {
        let map_id = map_id(points, features)?;
        let config = self.page_config(&map_id, points, features);

        let mut html = String::with_capacity(16 * 1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n",
        );
        html.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
        for href in CDN_STYLESHEETS {
            html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\"/>\n", href));
        }
        for src in CDN_SCRIPTS {
            html.push_str(&format!("<script src=\"{}\"></script>\n", src));
        }
        html.push_str(&css_for(&map_id));
        html.push_str("\n</head>\n<body>\n");
        html.push_str(&format!("<div id=\"{}\"></div>\n", map_id));
        html.push_str(SIDEBAR_HTML);
        html.push('\n');

        html.push_str("<script>\n");
        html.push_str(&format!(
            "window.__PHOTO_MAP_CONFIG__ = {};\n",
            script_json(&config)?
        ));
        html.push_str(&format!(
            "window.__PHOTO_FEATURES__ = {};\n",
            script_json(features)?
        ));
        html.push_str("</script>\n");

        html.push_str(MAP_BOOTSTRAP_JS);
        html.push('\n');
        html.push_str(
            &VIEWPORT_GALLERY_JS.replace("__GALLERY_MAX_ITEMS__", &GALLERY_MAX_ITEMS.to_string()),
        );
        html.push_str("\n</body>\n</html>\n");

        tracing::debug!(
            "Map {} built: {} features, heat={}, cluster={}",
            map_id,
            features.len(),
            config["heat"].is_object(),
            self.options.cluster
        );
        Ok(html)
    }

    fn page_config(&self, map_id: &str, points: &[(f64, f64)], features: &FeatureCollection) -> Value {
        let (lat, lon) = initial_center(points);
        let opts = &self.options;

        let heat = if opts.include_heat && !points.is_empty() {
            let heat_points: Vec<[f64; 2]> = points.iter().map(|&(lat, lon)| [lat, lon]).collect();
            json!({
                "points": heat_points,
                "minOpacity": opts.heat.min_opacity,
                "radius": opts.heat.radius,
                "blur": opts.heat.blur,
                "maxZoom": opts.heat.max_zoom,
            })
        } else {
            Value::Null
        };

        let bounds = bounds_from_points(points)
            .map(|(min_lat, min_lon, max_lat, max_lon)| json!([[min_lat, min_lon], [max_lat, max_lon]]))
            .unwrap_or(Value::Null);

        json!({
            "mapId": map_id,
            "center": [lat, lon],
            "zoom": opts.default_zoom_start,
            "basemaps": opts.basemaps,
            "defaultBasemap": opts.default_basemap,
            "heat": heat,
            "cluster": opts.cluster,
            "pointRadius": opts.point_radius,
            "tooltip": tooltip_fields(features),
            "bounds": bounds,
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct TooltipField {
    field: &'static str,
    alias: &'static str,
}

/// Tooltip rows for the fields that at least one feature carries.
fn tooltip_fields(features: &FeatureCollection) -> Vec<TooltipField> {
    let present = features.property_keys();
    TOOLTIP_FIELDS
        .iter()
        .filter(|(field, _)| present.contains(field))
        .map(|&(field, alias)| TooltipField { field, alias })
        .collect()
}

/// `map_<hex>`, derived from the content so identical inputs give identical pages.
fn map_id(points: &[(f64, f64)], features: &FeatureCollection) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    for (lat, lon) in points {
        hasher.update(&lat.to_le_bytes());
        hasher.update(&lon.to_le_bytes());
    }
    hasher.update(&serde_json::to_vec(features)?);
    let hash = hasher.finalize().to_hex();
    Ok(format!("map_{}", &hash.as_str()[..16]))
}

/// Serializes `value` for inlining inside a `<script>` element.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let raw = serde_json::to_string(value)?;
    Ok(raw
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Feature;
    use serde_json::Map;

    fn feature(lat: f64, lon: f64, path: &str) -> Feature {
        let mut props = Map::new();
        props.insert("path".to_string(), json!(path));
        props.insert("datetime".to_string(), Value::Null);
        props.insert("thumb".to_string(), Value::Null);
        Feature::point(lat, lon, props)
    }

    fn extract_config(html: &str) -> Value {
        let start = html.find("window.__PHOTO_MAP_CONFIG__ = ").unwrap()
            + "window.__PHOTO_MAP_CONFIG__ = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_build_with_points() {
        let points = vec![(48.85, 2.35), (35.68, 139.69)];
        let fc = FeatureCollection::new(vec![
            feature(48.85, 2.35, "a.jpg"),
            feature(35.68, 139.69, "b.jpg"),
        ]);

        let html = MapBuilder::default().build(&points, &fc).unwrap();
        let config = extract_config(&html);

        let map_id = config["mapId"].as_str().unwrap();
        assert!(map_id.starts_with("map_"));
        assert!(html.contains(&format!("<div id=\"{}\"></div>", map_id)));
        assert_eq!(config["zoom"], 2);
        assert_eq!(config["pointRadius"], 6);
        assert_eq!(config["cluster"], true);
        assert_eq!(config["defaultBasemap"], "CartoDB Positron");
        assert_eq!(config["basemaps"].as_array().unwrap().len(), 4);
        assert_eq!(config["heat"]["points"].as_array().unwrap().len(), 2);
        assert_eq!(config["heat"]["minOpacity"], 0.55);
        assert_eq!(config["bounds"], json!([[35.68, 2.35], [48.85, 139.69]]));
        assert_eq!(
            config["tooltip"],
            json!([{"field": "path", "alias": "File"}, {"field": "datetime", "alias": "Datetime"}])
        );
        assert!(html.contains("window.__PHOTO_FEATURES__ = {\"type\":\"FeatureCollection\""));
        assert!(html.contains("leaflet-heat.js"));
        assert!(!html.contains("__GALLERY_MAX_ITEMS__"));
        assert!(html.contains("var MAX_ITEMS = 120;"));
    }

    #[test]
    fn test_build_without_points_uses_world_view() {
        let html = MapBuilder::default()
            .build(&[], &FeatureCollection::default())
            .unwrap();
        let config = extract_config(&html);

        assert_eq!(config["center"], json!([20.0, 0.0]));
        assert!(config["heat"].is_null());
        assert!(config["bounds"].is_null());
        assert_eq!(config["tooltip"], json!([]));
        assert!(html.contains("window.__PHOTO_FEATURES__ = {\"type\":\"FeatureCollection\",\"features\":[]};"));
    }

    #[test]
    fn test_options_are_honored() {
        let options = MapOptions {
            include_heat: false,
            cluster: false,
            point_radius: 9,
            default_zoom_start: 4,
            ..MapOptions::default()
        };
        let fc = FeatureCollection::new(vec![feature(1.0, 2.0, "a.jpg")]);
        let html = MapBuilder::new(options).build(&[(1.0, 2.0)], &fc).unwrap();
        let config = extract_config(&html);

        assert!(config["heat"].is_null());
        assert_eq!(config["cluster"], false);
        assert_eq!(config["pointRadius"], 9);
        assert_eq!(config["zoom"], 4);
    }

    #[test]
    fn test_map_id_is_deterministic() {
        let fc = FeatureCollection::new(vec![feature(1.0, 2.0, "a.jpg")]);
        let a = map_id(&[(1.0, 2.0)], &fc).unwrap();
        let b = map_id(&[(1.0, 2.0)], &fc).unwrap();
        let c = map_id(&[(1.0, 3.0)], &fc).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), "map_".len() + 16);
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        let escaped = script_json(&json!({"path": "</script><b>x\u{2028}"})).unwrap();
        assert!(!escaped.contains("</script>"));
        assert!(escaped.contains("<\\/script>"));
        assert!(escaped.contains("\\u2028"));

        let back: Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(back["path"], "</script><b>x\u{2028}");
    }
}
