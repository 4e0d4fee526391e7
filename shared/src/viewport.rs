use serde::{Deserialize, Serialize};

use crate::city::CityRecord;

/// Camera state of the map: rendered size in CSS pixels plus geographic center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Viewport centered on `city` with the given rendered size.
    pub fn for_city(city: &CityRecord, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            latitude: city.center.lat,
            longitude: city.center.lon,
            zoom: city.zoom,
        }
    }

    /// Field-wise merge: every field present in `update` overwrites the
    /// current value, absent fields are left untouched. No clamping.
    pub fn apply(&mut self, update: &ViewportUpdate) {
        if let Some(width) = update.width {
            self.width = width;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
        if let Some(zoom) = update.zoom {
            self.zoom = zoom;
        }
    }

    /// Copy with `update` merged in.
    pub fn merged(mut self, update: &ViewportUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// Partial viewport. Fields left `None` keep their current value on merge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl ViewportUpdate {
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn center(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fixed viewport dimensions. A dimension given here wins over the display surface
/// and is never changed by resize.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeOverrides {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl SizeOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve the effective size given the surface's current size.
    pub fn apply(&self, surface_width: f64, surface_height: f64) -> (f64, f64) {
        (
            self.width.unwrap_or(surface_width),
            self.height.unwrap_or(surface_height),
        )
    }
}
