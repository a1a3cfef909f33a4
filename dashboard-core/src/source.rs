use crate::{
    Config, LoadError, Snapshot,
    source::{file::FileSource, http::HttpSource},
};
use async_trait::async_trait;
use reqwest::Url;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod file;
pub mod http;

/// Transport used to reach the snapshot document, derived from the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Http,
    File,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Http => "http",
            SourceKind::File => "file",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&Url> for SourceKind {
    type Error = anyhow::Error;

    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        match url.scheme() {
            "http" | "https" => Ok(SourceKind::Http),
            "file" => Ok(SourceKind::File),
            other => Err(anyhow::anyhow!(
                "Unsupported endpoint scheme '{other}' in '{url}'.\n\
                 Supported schemes: http, https, file."
            )),
        }
    }
}

/// Something that can produce the latest snapshot document.
#[async_trait]
pub trait SnapshotSource: Send + Sync + Debug {
    async fn fetch(&self) -> Result<Snapshot, LoadError>;
}

/// Construct the snapshot source for the configured endpoint.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn SnapshotSource>> {
    let url = config.resolve_endpoint()?;
    source_for_url(url)
}

pub fn source_for_url(url: Url) -> anyhow::Result<Arc<dyn SnapshotSource>> {
    let kind = SourceKind::try_from(&url)?;
    tracing::debug!(%url, %kind, "using snapshot source");

    let source: Arc<dyn SnapshotSource> = match kind {
        SourceKind::Http => Arc::new(HttpSource::new(url)),
        SourceKind::File => {
            let path = url
                .to_file_path()
                .map_err(|()| anyhow::anyhow!("Endpoint '{url}' is not a valid local file path"))?;
            Arc::new(FileSource::new(path))
        }
    };

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_scheme() {
        let http = Url::parse("https://example.com/latest.json").unwrap();
        let file = Url::parse("file:///var/www/latest.json").unwrap();

        assert_eq!(SourceKind::try_from(&http).unwrap(), SourceKind::Http);
        assert_eq!(SourceKind::try_from(&file).unwrap(), SourceKind::File);
    }

    #[test]
    fn unsupported_scheme_error() {
        let url = Url::parse("ftp://example.com/latest.json").unwrap();
        let err = SourceKind::try_from(&url).unwrap_err();
        assert!(err.to_string().contains("Unsupported endpoint scheme 'ftp'"));
    }

    #[test]
    fn source_from_config_errors_without_origin() {
        let err = source_from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("no origin is configured"));
    }

    #[test]
    fn source_from_config_works_with_origin() {
        let cfg = Config {
            origin: Some("http://localhost:8080".into()),
            ..Config::default()
        };
        assert!(source_from_config(&cfg).is_ok());
    }
}
