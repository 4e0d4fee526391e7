use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use citymap_shared::Catalog;

/// Catalog loaded at startup. Serialized once and shared by all requests via Arc.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub catalog_json: Arc<Bytes>,
    pub catalog_etag: Arc<str>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Result<Self, String> {
        let json = serde_json::to_vec(&catalog)
            .map(Bytes::from)
            .map_err(|e| format!("failed to serialize city catalog: {e}"))?;
        let etag = catalog_etag(&json);
        Ok(Self {
            catalog: Arc::new(catalog),
            catalog_json: Arc::new(json),
            catalog_etag: Arc::from(etag),
        })
    }
}

/// Read and validate the catalog file. An empty catalog is a configuration error.
pub async fn load_catalog(path: &Path) -> Result<Catalog, String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Catalog::from_json(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

fn catalog_etag(json: &[u8]) -> String {
    format!("\"cities-{:08x}\"", crc32fast::hash(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"internalId":"nyc","name":"New York","country":"US","path":"/new-york",
         "center":{"lat":40.7,"lon":-74.0},"zoom":10}
    ]"#;

    #[test]
    fn etag_tracks_catalog_content() {
        let a = AppState::new(Catalog::from_json(CATALOG).expect("catalog")).expect("state");
        let b = AppState::new(Catalog::from_json(CATALOG).expect("catalog")).expect("state");
        assert_eq!(a.catalog_etag, b.catalog_etag);
        assert!(a.catalog_etag.starts_with("\"cities-"));

        let other = CATALOG.replace("\"zoom\":10", "\"zoom\":12");
        let c = AppState::new(Catalog::from_json(&other).expect("catalog")).expect("state");
        assert_ne!(a.catalog_etag, c.catalog_etag);
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../data/cities.json"));
        let catalog = Catalog::from_json(raw).expect("bundled catalog");
        assert!(catalog.len() > 1);
        let mut ids: Vec<&str> = catalog.iter().map(|c| c.internal_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[tokio::test]
    async fn load_catalog_rejects_empty_file() {
        let path = std::env::temp_dir().join(format!("citymap-empty-{}.json", std::process::id()));
        tokio::fs::write(&path, "[]").await.expect("write temp catalog");
        let result = load_catalog(&path).await;
        let _ = tokio::fs::remove_file(&path).await;
        let err = result.expect_err("empty catalog must fail");
        assert!(err.contains("empty"));
    }

    #[tokio::test]
    async fn load_catalog_reports_missing_file() {
        let err = load_catalog(Path::new("/definitely/not/here/cities.json"))
            .await
            .expect_err("missing file must fail");
        assert!(err.contains("failed to read"));
    }

    #[tokio::test]
    async fn load_catalog_reads_records_in_order() {
        let path = std::env::temp_dir().join(format!("citymap-ok-{}.json", std::process::id()));
        tokio::fs::write(&path, CATALOG).await.expect("write temp catalog");
        let result = load_catalog(&path).await;
        let _ = tokio::fs::remove_file(&path).await;
        let catalog = result.expect("valid catalog");
        assert_eq!(catalog.first().internal_id, "nyc");
    }
}
