use serde::{Deserialize, Serialize};

use crate::query::query_param;

/// Query string key carrying the selected city's `internal_id`.
pub const CITY_QUERY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub internal_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub path: String,
    pub center: LatLon,
    pub zoom: f64,
}

/// Ordered, non-empty list of selectable cities. The first record is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CityRecord>", into = "Vec<CityRecord>")]
pub struct Catalog {
    records: Vec<CityRecord>,
}

impl Catalog {
    pub fn new(records: Vec<CityRecord>) -> Result<Self, String> {
        if records.is_empty() {
            return Err("city catalog is empty".to_string());
        }
        Ok(Self { records })
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid city catalog: {e}"))
    }

    /// The default record.
    pub fn first(&self) -> &CityRecord {
        // Non-empty by construction.
        &self.records[0]
    }

    /// First record whose `internal_id` equals `id` exactly.
    pub fn find(&self, id: &str) -> Option<&CityRecord> {
        self.records.iter().find(|city| city.internal_id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CityRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }
}

impl TryFrom<Vec<CityRecord>> for Catalog {
    type Error = String;

    fn try_from(records: Vec<CityRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<Catalog> for Vec<CityRecord> {
    fn from(catalog: Catalog) -> Self {
        catalog.records
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CityRecord;
    type IntoIter = std::slice::Iter<'a, CityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Pick the city named by the `id` query parameter of `raw_query`.
///
/// Falls back to the catalog's first record when `id` is absent, repeated,
/// malformed, or matches nothing. Never fails.
pub fn resolve<'a>(catalog: &'a Catalog, raw_query: &str) -> &'a CityRecord {
    let Some(id) = query_param(raw_query, CITY_QUERY_KEY) else {
        tracing::debug!("no city id in query, using default city");
        return catalog.first();
    };

    match catalog.find(&id) {
        Some(city) => city,
        None => {
            tracing::debug!(%id, "unknown city id, using default city");
            catalog.first()
        }
    }
}
