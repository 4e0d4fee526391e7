use axum::Json;
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use citymap_shared::{CityRecord, resolve};

use crate::config::CATALOG_CACHE_CONTROL;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "cities": state.catalog.len(),
        "default_city": state.catalog.first().internal_id,
    }))
}

/// Full catalog as a JSON array, in catalog order.
pub async fn get_cities(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let etag: &str = &state.catalog_etag;
    if if_none_match_matches(&headers, etag) {
        return not_modified_response(CATALOG_CACHE_CONTROL, Some(etag));
    }

    json_bytes_response(
        (*state.catalog_json).clone(),
        CATALOG_CACHE_CONTROL,
        Some(etag),
    )
}

/// The city a page with this query string would show (`?id=...`, falling back to the default).
pub async fn get_resolved_city(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<CityRecord> {
    let city = resolve(&state.catalog, query.as_deref().unwrap_or_default());
    Json(city.clone())
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use axum::http::{HeaderMap, HeaderValue, header};
    use citymap_shared::{Catalog, CityRecord};

    use super::{StatusCode, if_none_match_matches};
    use crate::state::AppState;

    fn test_state() -> AppState {
        let catalog = Catalog::from_json(
            r#"[
                {"internalId":"nyc","name":"New York","country":"US","path":"/new-york",
                 "center":{"lat":40.7,"lon":-74.0},"zoom":10},
                {"internalId":"sf","name":"San Francisco","country":"US","path":"/san-francisco",
                 "center":{"lat":37.7,"lon":-122.4},"zoom":11}
            ]"#,
        )
        .expect("test catalog");
        AppState::new(catalog).expect("test state")
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state, PathBuf::from("does-not-exist"));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn if_none_match_handles_weak_and_wildcard() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("W/\"cities-1\", \"other\""),
        );
        assert!(if_none_match_matches(&headers, "\"cities-1\""));
        assert!(!if_none_match_matches(&headers, "\"cities-2\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"anything\""));

        assert!(!if_none_match_matches(&HeaderMap::new(), "\"cities-1\""));
    }

    #[tokio::test]
    async fn cities_endpoint_returns_catalog_in_order() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let response = reqwest::get(format!("http://{addr}/api/cities"))
            .await
            .expect("cities request")
            .error_for_status()
            .expect("cities status");
        assert!(response.headers().get(header::ETAG).is_some());
        let cities: Vec<CityRecord> = response.json().await.expect("cities body");
        let ids: Vec<&str> = cities.iter().map(|c| c.internal_id.as_str()).collect();
        assert_eq!(ids, vec!["nyc", "sf"]);
        server_handle.abort();
    }

    #[tokio::test]
    async fn cities_endpoint_returns_not_modified_when_etag_matches() {
        let state = test_state();
        let etag = state.catalog_etag.to_string();
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/api/cities"))
            .header(header::IF_NONE_MATCH, etag.as_str())
            .send()
            .await
            .expect("conditional request");
        assert_eq!(response.status().as_u16(), StatusCode::NOT_MODIFIED.as_u16());
        server_handle.abort();
    }

    #[tokio::test]
    async fn resolve_endpoint_matches_id_or_falls_back() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let client = reqwest::Client::new();

        for (query, expected) in [
            ("?id=sf", "sf"),
            ("?id=la", "nyc"),
            ("", "nyc"),
            ("?id=sf&id=sf", "nyc"),
        ] {
            let city: CityRecord = client
                .get(format!("http://{addr}/api/city{query}"))
                .send()
                .await
                .expect("resolve request")
                .error_for_status()
                .expect("resolve status")
                .json()
                .await
                .expect("resolve body");
            assert_eq!(city.internal_id, expected, "query {query:?}");
        }
        server_handle.abort();
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let health: serde_json::Value = reqwest::get(format!("http://{addr}/api/health"))
            .await
            .expect("health request")
            .json()
            .await
            .expect("health body");
        assert_eq!(health["status"], "ok");
        assert_eq!(health["cities"], 2);
        assert_eq!(health["default_city"], "nyc");
        server_handle.abort();
    }
}
