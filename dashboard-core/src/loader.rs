use serde::Serialize;
use std::sync::Arc;

use crate::{LoadError, Snapshot, source::SnapshotSource};

/// Latest snapshot plus the one it replaced, kept for trend deltas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub current: Option<Snapshot>,
    pub previous: Option<Snapshot>,
}

impl DashboardState {
    /// Install a freshly loaded snapshot; the old current becomes `previous`.
    pub fn install(&mut self, snapshot: Snapshot) {
        self.previous = self.current.replace(snapshot);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ok,
    Error,
}

impl LoadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Idle => "Idle",
            LoadStatus::Loading => "Loading…",
            LoadStatus::Ok => "Live",
            LoadStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Owns the dashboard state and is the only thing that writes it.
#[derive(Debug)]
pub struct SnapshotLoader {
    source: Arc<dyn SnapshotSource>,
    state: DashboardState,
    status: LoadStatus,
}

impl SnapshotLoader {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            state: DashboardState::default(),
            status: LoadStatus::Idle,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Handle to the source, for running a fetch outside the loader.
    pub fn source(&self) -> Arc<dyn SnapshotSource> {
        Arc::clone(&self.source)
    }

    /// Fetch and install a snapshot in one step.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        self.begin();
        let result = self.source.fetch().await;
        self.complete(result)
    }

    /// Mark a fetch as in flight.
    pub fn begin(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Apply the outcome of a fetch. Failures leave the state untouched.
    pub fn complete(&mut self, result: Result<Snapshot, LoadError>) -> Result<(), LoadError> {
        match result {
            Ok(snapshot) => {
                tracing::info!(
                    generated_utc = snapshot.generated_utc.as_deref().unwrap_or("-"),
                    cities = snapshot.cities.len(),
                    "snapshot installed"
                );
                self.state.install(snapshot);
                self.status = LoadStatus::Ok;
                Ok(())
            }
            Err(err) => {
                if err.is_parse() {
                    tracing::error!(error = %err, "snapshot body is not valid JSON");
                } else {
                    tracing::warn!(error = %err, "snapshot fetch failed");
                }
                self.status = LoadStatus::Error;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CityReading, source::http::HttpSource};
    use reqwest::Url;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    const LIMA_SNAPSHOT: &str =
        r#"{"generated_utc":"2024-05-01T12:00:00Z","cities":[{"city":"Lima","temp_c":19}]}"#;

    fn snapshot(stamp: &str) -> Snapshot {
        Snapshot {
            generated_utc: Some(stamp.to_string()),
            cities: vec![CityReading {
                city: "Lima".into(),
                temp_c: Some(19.0),
                ..Default::default()
            }],
        }
    }

    #[derive(Debug)]
    struct Unused;

    #[async_trait::async_trait]
    impl SnapshotSource for Unused {
        async fn fetch(&self) -> Result<Snapshot, LoadError> {
            Err(LoadError::Status { status: 500 })
        }
    }

    #[test]
    fn install_shifts_current_to_previous() {
        let mut state = DashboardState::default();

        state.install(snapshot("a"));
        assert_eq!(state.previous, None);

        state.install(snapshot("b"));
        state.install(snapshot("c"));
        assert_eq!(state.current, Some(snapshot("c")));
        assert_eq!(state.previous, Some(snapshot("b")));
    }

    #[test]
    fn failed_completion_keeps_state() {
        let mut loader = SnapshotLoader::new(Arc::new(Unused));
        loader.complete(Ok(snapshot("a"))).unwrap();
        loader.complete(Ok(snapshot("b"))).unwrap();
        let before = loader.state().clone();

        loader.begin();
        assert_eq!(loader.status(), LoadStatus::Loading);

        let err = loader
            .complete(Err(LoadError::Status { status: 502 }))
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(loader.status(), LoadStatus::Error);
        assert_eq!(loader.state(), &before);
    }

    #[test]
    fn last_completion_wins() {
        let mut loader = SnapshotLoader::new(Arc::new(Unused));
        loader.begin();
        loader.begin();

        loader.complete(Ok(snapshot("later-request"))).unwrap();
        loader.complete(Ok(snapshot("earlier-request"))).unwrap();

        let current = loader.state().current.as_ref().unwrap();
        assert_eq!(current.generated_utc.as_deref(), Some("earlier-request"));
    }

    #[tokio::test]
    async fn malformed_json_sets_error_and_keeps_snapshot() {
        let server = MockServer::start().await;
        let url: Url = format!("{}/latest.json", server.uri()).parse().unwrap();
        let mut loader = SnapshotLoader::new(Arc::new(HttpSource::new(url)));

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LIMA_SNAPSHOT))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        loader.load().await.expect("first load should succeed");
        assert_eq!(loader.status(), LoadStatus::Ok);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        let err = loader.load().await.unwrap_err();

        assert!(err.is_parse());
        assert_eq!(loader.status(), LoadStatus::Error);
        assert_eq!(loader.status().label(), "Error");
        let current = loader
            .state()
            .current
            .as_ref()
            .expect("snapshot should survive");
        assert_eq!(current.cities[0].temp_c, Some(19.0));
        assert_eq!(loader.state().previous, None);
    }
}
