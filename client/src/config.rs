use citymap_shared::SizeOverrides;
use citymap_shared::query::query_param;

/// Style identifier handed to the map renderer.
pub const MAP_STYLE: &str = "mapbox://styles/mapbox/satellite-streets-v9";

pub const CATALOG_URL: &str = "/api/cities";

/// Optional query keys pinning the viewport size, e.g. `?id=sf&w=800&h=600` for embeds.
pub const WIDTH_OVERRIDE_KEY: &str = "w";
pub const HEIGHT_OVERRIDE_KEY: &str = "h";

/// Read size overrides from the page query string. Only positive, finite numbers count.
pub fn size_overrides_from_query(raw_query: &str) -> SizeOverrides {
    SizeOverrides {
        width: positive_param(raw_query, WIDTH_OVERRIDE_KEY),
        height: positive_param(raw_query, HEIGHT_OVERRIDE_KEY),
    }
}

fn positive_param(raw_query: &str, key: &str) -> Option<f64> {
    query_param(raw_query, key)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}
