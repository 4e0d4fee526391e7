use citymap_shared::Catalog;

use crate::config::CATALOG_URL;

/// Fetch the city catalog. An empty catalog is reported as an error.
pub async fn fetch_catalog() -> Result<Catalog, String> {
    let resp = gloo_net::http::Request::get(CATALOG_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body = resp.text().await.map_err(|e| format!("read error: {e}"))?;
    Catalog::from_json(&body)
}
