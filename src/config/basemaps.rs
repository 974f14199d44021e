use serde::{Deserialize, Serialize};

pub const DEFAULT_BASEMAP: &str = "CartoDB Positron";

/// An XYZ tile source offered in the layer switcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basemap {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
}

impl Basemap {
    fn new(name: &str, url: &str, attribution: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            attribution: attribution.to_string(),
            subdomains: None,
            max_zoom: None,
        }
    }

    fn subdomains(mut self, subdomains: &str) -> Self {
        self.subdomains = Some(subdomains.to_string());
        self
    }

    fn max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }
}

/// Attribution-compliant public tile sources. Respect each provider's terms when publishing.
pub fn default_basemaps() -> Vec<Basemap> {
    const CARTO_ATTR: &str = "&copy; OpenStreetMap contributors &copy; CARTO";

    vec![
        Basemap::new(
            "CartoDB Positron",
            "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            CARTO_ATTR,
        )
        .subdomains("abcd")
        .max_zoom(20),
        Basemap::new(
            "CartoDB Dark Matter",
            "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            CARTO_ATTR,
        )
        .subdomains("abcd")
        .max_zoom(20),
        Basemap::new(
            "OpenStreetMap",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            "&copy; OpenStreetMap contributors",
        )
        .subdomains("abc")
        .max_zoom(19),
        Basemap::new(
            "Esri WorldImagery (Satellite)",
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            "Tiles &copy; Esri, Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
        )
        .max_zoom(20),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::validate_tile_url;

    #[test]
    fn test_default_basemap_is_present() {
        let basemaps = default_basemaps();
        assert_eq!(basemaps.len(), 4);
        assert!(basemaps.iter().any(|b| b.name == DEFAULT_BASEMAP));
    }

    #[test]
    fn test_default_urls_are_valid_templates() {
        for basemap in default_basemaps() {
            assert!(validate_tile_url("basemaps.url", &basemap.url).is_ok(), "{}", basemap.name);
        }
    }
}
