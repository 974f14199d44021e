//! Static pieces of the generated page: CDN resources, layout CSS, the sidebar markup
//! and the two client scripts (map bootstrap and viewport gallery).

/// Stylesheets loaded in `<head>`, in order.
pub const CDN_STYLESHEETS: &[&str] = &[
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css",
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css",
    "https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.css",
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.css",
    "https://cdn.jsdelivr.net/gh/ljagis/leaflet-measure@2.1.7/dist/leaflet-measure.min.css",
];

/// Scripts loaded in `<head>`; Leaflet itself must come first.
pub const CDN_SCRIPTS: &[&str] = &[
    "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js",
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js",
    "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js",
    "https://unpkg.com/leaflet-minimap@3.6.1/dist/Control.MiniMap.min.js",
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.min.js",
    "https://cdn.jsdelivr.net/gh/ljagis/leaflet-measure@2.1.7/dist/leaflet-measure.min.js",
];

pub const SIDEBAR_WIDTH_PX: u32 = 420;

/// Maximum number of tiles rendered in the gallery at once.
pub const GALLERY_MAX_ITEMS: usize = 120;

pub fn css_for(map_id: &str) -> String {
    format!(
        r#"<style>
html, body {{
  margin: 0; padding: 0;
  width: 100%; height: 100%;
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, Arial, sans-serif;
}}
#{map_id} {{
  position: fixed;
  top: 0; left: 0; bottom: 0; right: {w}px;
}}
#gallery-panel {{
  position: fixed;
  top: 0; right: 0; bottom: 0;
  width: {w}px; max-width: 40%;
  overflow-y: auto;
  box-sizing: border-box;
  background: #fff;
  border-left: 1px solid #ddd;
  padding: 12px;
  box-shadow: -2px 0 8px rgba(0,0,0,0.08);
  z-index: 9999;
}}
#gallery-header {{ display: flex; align-items: center; justify-content: space-between; margin-bottom: 8px; }}
#gallery-header h3 {{ margin: 0; font-size: 16px; }}
#gallery-controls {{ display: flex; gap: 10px; align-items: center; font-size: 12px; }}
#gallery-controls label {{ display: flex; gap: 6px; align-items: center; cursor: pointer; user-select: none; }}
#gallery-refresh {{ padding: 4px 8px; border-radius: 8px; border: 1px solid rgba(0,0,0,0.1); background: #fff; cursor: pointer; }}
#gallery-count {{ font-size: 12px; color: #666; margin: 6px 0 8px; }}
.badge {{ background: #eee; border-radius: 999px; padding: 2px 8px; font-size: 11px; color: #333; }}
.grid {{ display: grid; grid-template-columns: 1fr; gap: 10px; }}
.grid img {{
  width: 100%; height: 330px; object-fit: cover;
  border-radius: 10px; border: 1px solid rgba(0,0,0,0.06); cursor: pointer;
}}
.tile {{
  height: 330px; display: flex; align-items: center; justify-content: center;
  font-size: 13px; color: #444; text-align: center; padding: 10px; box-sizing: border-box;
  border: 1px solid rgba(0,0,0,0.06); border-radius: 10px; background: #f7f7f7; cursor: pointer;
}}
#gallery-grid img.selected, #gallery-grid .tile.selected {{
  outline: 3px solid #2b8a3e;
  box-shadow: 0 0 0 3px rgba(43,138,62,0.25);
}}
.leaflet-top.leaflet-left .leaflet-control, .leaflet-bottom.leaflet-left .leaflet-control {{ margin-left: 12px; }}
.leaflet-control-attribution {{ display: none !important; }}
.leaflet-popup.photo-popup,
.leaflet-popup.photo-popup .leaflet-popup-content-wrapper,
.leaflet-popup.photo-popup .leaflet-popup-content {{ max-width: none !important; width: auto !important; }}
.photo-tooltip th {{ text-align: left; padding-right: 8px; }}
#photo-overlay {{
  position: fixed; inset: 0;
  background: rgba(0,0,0,0.8);
  display: none;
  align-items: center; justify-content: center;
  z-index: 10000;
}}
#photo-overlay img {{
  max-width: 95vw; max-height: 95vh; width: auto; height: auto;
  border-radius: 10px; box-shadow: 0 10px 30px rgba(0,0,0,0.5);
}}
#photo-overlay .close {{
  position: absolute; top: 14px; right: 14px;
  background: rgba(255,255,255,0.9); border: 0; border-radius: 999px;
  padding: 8px 12px; font-size: 14px; cursor: pointer;
  box-shadow: 0 2px 8px rgba(0,0,0,0.3);
}}
</style>"#,
        map_id = map_id,
        w = SIDEBAR_WIDTH_PX
    )
}

pub const SIDEBAR_HTML: &str = r#"<div id="gallery-panel">
  <div id="gallery-header">
    <h3>Photos</h3>
    <div id="gallery-controls">
      <label><input type="checkbox" id="follow-map" checked/> Follow</label>
      <label><input type="checkbox" id="show-all"/> Show all</label>
      <button id="gallery-refresh" type="button">Refresh</button>
    </div>
  </div>
  <div id="gallery-count">
    Loaded: <span class="badge" id="total-count">0</span>
    <span style="margin-left:8px;">In view: <span class="badge" id="inview-count">0</span></span>
  </div>
  <div id="gallery-empty">Pan or zoom the map; photos inside the current view are listed here.</div>
  <div class="grid" id="gallery-grid"></div>
</div>"#;

/// Builds the Leaflet map from `window.__PHOTO_MAP_CONFIG__` and `window.__PHOTO_FEATURES__`.
pub const MAP_BOOTSTRAP_JS: &str = r#"<script>
(function () {
  var cfg = window.__PHOTO_MAP_CONFIG__;
  var map = L.map(cfg.mapId, { center: cfg.center, zoom: cfg.zoom });
  window[cfg.mapId] = map;
  L.control.scale().addTo(map);

  function makeTiles(b) {
    var opts = { attribution: b.attribution || "" };
    if (b.subdomains) opts.subdomains = b.subdomains;
    if (b.max_zoom !== undefined && b.max_zoom !== null) opts.maxZoom = b.max_zoom;
    return L.tileLayer(b.url, opts);
  }

  var baseLayers = {};
  var shownBasemap = null;
  cfg.basemaps.forEach(function (b) {
    var layer = makeTiles(b);
    baseLayers[b.name] = layer;
    if (b.name === cfg.defaultBasemap) {
      layer.addTo(map);
      shownBasemap = b;
    }
  });

  var overlays = {};
  if (cfg.heat && typeof L.heatLayer === "function") {
    overlays["Heatmap"] = L.heatLayer(cfg.heat.points, {
      minOpacity: cfg.heat.minOpacity,
      radius: cfg.heat.radius,
      blur: cfg.heat.blur,
      maxZoom: cfg.heat.maxZoom
    }).addTo(map);
  }

  function escapeHtml(value) {
    return String(value === null || value === undefined ? "" : value).replace(/[&<>"']/g, function (c) {
      return { "&": "&amp;", "<": "&lt;", ">": "&gt;", "\"": "&quot;", "'": "&#39;" }[c];
    });
  }

  function tooltipHtml(props) {
    var rows = cfg.tooltip.map(function (f) {
      return "<tr><th>" + escapeHtml(f.alias) + "</th><td>" + escapeHtml(props[f.field]) + "</td></tr>";
    });
    return "<table class=\"photo-tooltip\">" + rows.join("") + "</table>";
  }

  var collection = window.__PHOTO_FEATURES__ || { type: "FeatureCollection", features: [] };
  if (collection.features && collection.features.length) {
    var points = L.geoJSON(collection, {
      pointToLayer: function (feature, latlng) {
        return L.circleMarker(latlng, { radius: cfg.pointRadius, weight: 1, fillOpacity: 0.8 });
      },
      onEachFeature: function (feature, layer) {
        if (cfg.tooltip.length) layer.bindTooltip(tooltipHtml(feature.properties || {}), { sticky: false });
      }
    });
    if (cfg.cluster && typeof L.markerClusterGroup === "function") {
      var clusters = L.markerClusterGroup();
      clusters.addLayer(points);
      clusters.addTo(map);
      overlays["Clusters"] = clusters;
    } else {
      points.addTo(map);
      overlays["Photo points"] = points;
    }
  }

  if (shownBasemap && L.Control.MiniMap) {
    new L.Control.MiniMap(makeTiles(shownBasemap), { toggleDisplay: true, position: "bottomleft" }).addTo(map);
  }
  if (typeof L.control.fullscreen === "function") {
    L.control.fullscreen({ position: "topleft" }).addTo(map);
  }
  if (typeof L.control.measure === "function") {
    L.control.measure({ position: "topleft", primaryLengthUnit: "kilometers" }).addTo(map);
  }
  L.control.layers(baseLayers, overlays, { position: "topleft", collapsed: false }).addTo(map);

  if (cfg.bounds) map.fitBounds(cfg.bounds);
})();
</script>"#;

/// Sidebar gallery that follows the visible map area, plus the selection marker,
/// thumbnail popups and the full-size lightbox.
pub const VIEWPORT_GALLERY_JS: &str = r##"<script>
(function () {
  var MAX_ITEMS = __GALLERY_MAX_ITEMS__;

  function mapKey() {
    return Object.keys(window).find(function (k) {
      return k.indexOf("map_") === 0 && window[k] && typeof window[k].setView === "function";
    });
  }
  function leafletMap() { var k = mapKey(); return k ? window[k] : null; }
  function whenMapReady(retries) {
    var map = leafletMap();
    if (map) return init(map);
    if (retries > 0) return setTimeout(function () { whenMapReady(retries - 1); }, 100);
    console.warn("[photomap] Leaflet map not found.");
  }

  // Lightbox for originals.
  var overlay = null, overlayImg = null;
  function hideOverlay() { if (!overlay) return; overlay.style.display = "none"; overlayImg.removeAttribute("src"); }
  function ensureOverlay() {
    if (overlay) return;
    overlay = document.createElement("div");
    overlay.id = "photo-overlay";
    overlay.innerHTML = '<button class="close" aria-label="Close">Close &#x2715;</button><img alt="photo" />';
    document.body.appendChild(overlay);
    overlayImg = overlay.querySelector("img");
    var closeBtn = overlay.querySelector(".close");
    overlay.addEventListener("click", function (e) { if (e.target === overlay || e.target === closeBtn) hideOverlay(); });
    document.addEventListener("keydown", function (e) { if (e.key === "Escape") hideOverlay(); });
  }
  window.__PHOTO_OPEN_ORIGINAL = function (src, title) {
    if (!src) return;
    ensureOverlay();
    overlayImg.alt = title || "photo";
    overlayImg.src = src;
    overlay.style.display = "flex";
  };

  var selectionLayer = null, selectionMarker = null, selectedId = null;

  function featureId(f) {
    if (!f) return null;
    var c = (f.geometry && f.geometry.coordinates) || [];
    var p = (f.properties && f.properties.path) || "";
    return [String(c[0] || ""), String(c[1] || ""), String(p)].join("|");
  }
  function clearSelection() {
    selectedId = null;
    document.querySelectorAll("#gallery-grid [data-fid]").forEach(function (el) { el.classList.remove("selected"); });
  }
  function highlight(id) {
    document.querySelectorAll("#gallery-grid [data-fid]").forEach(function (el) {
      el.classList.toggle("selected", el.getAttribute("data-fid") === id);
    });
  }

  // The sidebar overlaps the right edge of the map on narrow screens; only the
  // uncovered part counts as "in view".
  function uncoveredBounds(map) {
    var c = map.getContainer();
    var width = c.clientWidth, height = c.clientHeight, right = width;
    var panel = document.getElementById("gallery-panel");
    if (panel) {
      var mr = c.getBoundingClientRect(), pr = panel.getBoundingClientRect();
      var ox = Math.max(0, Math.min(mr.right, pr.right) - Math.max(mr.left, pr.left));
      var oy = Math.max(0, Math.min(mr.bottom, pr.bottom) - Math.max(mr.top, pr.top));
      if (ox > 0 && oy > 0) right = Math.max(0, width - ox);
    }
    return L.bounds(L.point(0, 0), L.point(right, height));
  }
  function inView(map, features) {
    var bounds = uncoveredBounds(map);
    return (features || []).filter(function (f) {
      var c = f.geometry && f.geometry.coordinates;
      if (!c) return false;
      try { return bounds.contains(map.latLngToContainerPoint([c[1], c[0]])); } catch (e) { return false; }
    });
  }

  function attr(s) { return String(s || "").replace(/&/g, "&amp;").replace(/"/g, "&quot;").replace(/</g, "&lt;"); }
  function popupHtml(props) {
    var title = (props && props.path) || "photo";
    var thumb = props && props.thumb;
    var full = props && props.img_rel;
    var html = '<div style="font-size:12px; text-align:center; max-width:60vw;">';
    var style = "max-width:520px; max-height:400px; width:auto; height:auto; border-radius:10px; display:block; margin:0 auto 6px;";
    if (thumb && full) {
      html += '<img src="' + attr(thumb) + '" alt="' + attr(title) + '" data-full="' + attr(full) + '"' +
        " onclick=\"window.__PHOTO_OPEN_ORIGINAL(this.getAttribute('data-full'), this.alt)\"" +
        ' style="' + style + ' cursor:zoom-in;" />' +
        '<div style="font-size:11px; color:#555;">Click the image to view full size</div>';
    } else if (thumb) {
      html += '<img src="' + attr(thumb) + '" alt="' + attr(title) + '" style="' + style + '" />';
    } else {
      html += '<div style="padding:8px 0; color:#666;">No thumbnail available.</div>';
    }
    return html + "<div>" + attr(title) + "</div></div>";
  }

  function select(map, lat, lon, props, fid) {
    if (!selectionLayer) selectionLayer = L.layerGroup().addTo(map);
    if (selectionMarker) { selectionLayer.removeLayer(selectionMarker); selectionMarker = null; }

    selectionMarker = L.marker([lat, lon], {
      title: (props && props.path) || "photo",
      icon: L.icon({
        iconUrl: "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-red.png",
        shadowUrl: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-shadow.png",
        iconSize: [25, 41], iconAnchor: [12, 41], popupAnchor: [1, -34]
      })
    });
    selectionMarker.addTo(selectionLayer)
      .bindPopup(popupHtml(props), { maxWidth: 560, keepInView: true, className: "photo-popup" })
      .openPopup();
    selectionMarker.on("popupclose", function () {
      if (selectionMarker) selectionLayer.removeLayer(selectionMarker);
      selectionMarker = null;
      clearSelection();
    });

    map.setView([lat, lon], Math.max(12, map.getZoom()), { animate: true });
    selectedId = fid || null;
    if (selectedId) highlight(selectedId);
  }

  function textTile(text, fid, onClick) {
    var div = document.createElement("div");
    div.className = "tile";
    div.setAttribute("data-fid", fid || "");
    div.textContent = text || "No preview";
    div.onclick = onClick;
    return div;
  }

  function render(features) {
    var grid = document.getElementById("gallery-grid");
    var empty = document.getElementById("gallery-empty");
    grid.innerHTML = "";
    document.getElementById("inview-count").textContent = String(features.length);
    if (!features.length) { if (empty) empty.style.display = "block"; return; }
    if (empty) empty.style.display = "none";

    features.slice(0, MAX_ITEMS).forEach(function (f) {
      var fid = featureId(f), props = f.properties || {}, label = props.path || "photo";
      var c = f.geometry && f.geometry.coordinates;
      var onClick = function () {
        var map = leafletMap();
        if (map && c && c.length >= 2) select(map, c[1], c[0], props, fid);
      };
      var el;
      if (props.thumb) {
        el = document.createElement("img");
        el.src = props.thumb;
        el.alt = label;
        el.title = label;
        el.setAttribute("data-fid", fid || "");
        el.onclick = onClick;
        el.onerror = function () {
          var t = textTile(label, fid, onClick);
          if (selectedId === fid) t.classList.add("selected");
          el.replaceWith(t);
        };
      } else {
        el = textTile(label, fid, onClick);
      }
      if (selectedId === fid) el.classList.add("selected");
      grid.appendChild(el);
    });
  }

  function bindPointPopups(map) {
    map.eachLayer(function (group) {
      if (!group || typeof group.eachLayer !== "function") return;
      group.eachLayer(function (layer) {
        if (!layer || !layer.feature) return;
        var props = layer.feature.properties || {}, fid = featureId(layer.feature);
        layer.bindPopup(popupHtml(props), { maxWidth: 560, keepInView: true, className: "photo-popup" });
        layer.on("popupopen", function () { selectedId = fid; highlight(fid); });
        layer.on("popupclose", clearSelection);
      });
    });
  }

  function init(map) {
    var all = (window.__PHOTO_FEATURES__ && window.__PHOTO_FEATURES__.features) || [];
    document.getElementById("total-count").textContent = String(all.length);

    var follow = document.getElementById("follow-map");
    var showAll = document.getElementById("show-all");
    var refresh = function () {
      render(showAll && showAll.checked ? all : inView(map, all));
      if (selectedId) highlight(selectedId);
    };

    refresh();
    map.on("moveend", function () { if (follow && follow.checked) refresh(); });
    document.getElementById("gallery-refresh").addEventListener("click", refresh);
    if (showAll) showAll.addEventListener("change", refresh);
    window.addEventListener("resize", refresh);

    bindPointPopups(map);
    console.debug("[photomap] features loaded:", all.length);
  }

  whenMapReady(30);
})();
</script>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_targets_map_id() {
        let css = css_for("map_0123abcd");
        assert!(css.contains("#map_0123abcd {"));
        assert!(css.contains("right: 420px;"));
        assert!(css.starts_with("<style>"));
    }

    #[test]
    fn test_gallery_script_is_complete() {
        assert!(VIEWPORT_GALLERY_JS.starts_with("<script>"));
        assert!(VIEWPORT_GALLERY_JS.ends_with("</script>"));
        assert!(VIEWPORT_GALLERY_JS.contains("querySelectorAll(\"#gallery-grid [data-fid]\")"));
        assert!(VIEWPORT_GALLERY_JS.contains("whenMapReady(30);"));
        assert!(MAP_BOOTSTRAP_JS.ends_with("</script>"));
    }

    #[test]
    fn test_leaflet_loads_first() {
        assert!(CDN_SCRIPTS[0].ends_with("/leaflet.js"));
    }
}
