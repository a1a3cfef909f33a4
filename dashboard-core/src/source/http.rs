use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client, Url,
    header::{CACHE_CONTROL, PRAGMA},
};

use crate::{LoadError, Snapshot};

use super::SnapshotSource;

/// Fetches the snapshot over HTTP, bypassing every cache on the way.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: Url,
    http: Client,
}

impl HttpSource {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<Snapshot, LoadError> {
        let cache_buster = Utc::now().timestamp_millis().to_string();

        let res = self
            .http
            .get(self.url.clone())
            .query(&[("t", cache_buster.as_str())])
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let snapshot: Snapshot = serde_json::from_str(&body)?;

        tracing::debug!(url = %self.url, cities = snapshot.cities.len(), "fetched snapshot");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    const OSLO_SNAPSHOT: &str =
        r#"{"generated_utc":"2024-05-01T12:00:00Z","cities":[{"city":"Oslo","temp_c":-3.0}]}"#;

    fn endpoint(server: &MockServer) -> Url {
        format!("{}/latest.json", server.uri()).parse().unwrap()
    }

    #[tokio::test]
    async fn fetch_sends_cache_busting_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .and(header("cache-control", "no-store"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OSLO_SNAPSHOT))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = HttpSource::new(endpoint(&server))
            .fetch()
            .await
            .expect("fetch should succeed");
        assert_eq!(snapshot.cities.len(), 1);
        assert_eq!(snapshot.cities[0].temp_c, Some(-3.0));

        let requests = server.received_requests().await.unwrap();
        let has_t = requests[0]
            .url
            .query_pairs()
            .any(|(k, v)| k == "t" && !v.is_empty());
        assert!(has_t, "request should carry a cache-busting `t` parameter");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpSource::new(endpoint(&server));
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"cities\": ["))
            .mount(&server)
            .await;

        let source = HttpSource::new(endpoint(&server));
        let err = source.fetch().await.unwrap_err();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let server = MockServer::start().await;
        let url = endpoint(&server);
        drop(server);

        let err = HttpSource::new(url).fetch().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.status(), None);
    }
}
