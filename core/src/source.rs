//! Where the raw CSV text comes from.
//!
//! The fetch is a single round trip with no retry. Timeouts are the
//! caller's to set (see `HttpSource::new`).

use crate::error::{MonitorError, MonitorResult};
use std::path::PathBuf;
use std::time::Duration;

pub trait DataSource: Send + Sync {
    /// Fetch the whole source document.
    fn fetch(&self) -> MonitorResult<String>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// A CSV document served over HTTP(S).
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> MonitorResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl DataSource for HttpSource {
    fn fetch(&self) -> MonitorResult<String> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Fetch(format!(
                "{} returned {status}",
                self.url
            )));
        }
        Ok(response.text()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A CSV document on local disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> MonitorResult<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory text. Swappable at runtime so tests can simulate an outage
/// or a changed upstream document.
pub struct InlineSource {
    state: std::sync::Mutex<Option<String>>,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: std::sync::Mutex::new(Some(text.into())),
        }
    }

    /// A source whose every fetch fails.
    pub fn unreachable() -> Self {
        Self {
            state: std::sync::Mutex::new(None),
        }
    }

    pub fn replace(&self, text: Option<String>) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = text;
    }
}

impl DataSource for InlineSource {
    fn fetch(&self) -> MonitorResult<String> {
        self.state
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| MonitorError::Fetch("inline source is unreachable".into()))
    }

    fn describe(&self) -> String {
        "inline".to_string()
    }
}
