//! HTTP datasource adapter using reqwest.
//!
//! Requests are POSTed as JSON to a single endpoint. The endpoint answers
//! with `{ "frames": [...] }` on success or `{ "error": {...} }` on
//! failure.

use std::time::Duration;

use dashvar_application::ports::{DataSourceApi, DataSourceError, RunRequestOptions};
use dashvar_domain::{DataFrame, DataQueryError, DataQueryRequest, PanelData};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use reqwest::{Client, Url};
use serde::Deserialize;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    frames: Vec<DataFrame>,
    #[serde(default)]
    error: Option<DataQueryError>,
}

/// Datasource backed by an HTTP query endpoint.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    uid: String,
    endpoint: Url,
    client: Client,
    timeout: Duration,
}

impl HttpDataSource {
    /// Creates a datasource posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::Unavailable` if the HTTP client cannot be
    /// created.
    pub fn new(uid: impl Into<String>, endpoint: Url) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .user_agent(concat!("dashvar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataSourceError::Unavailable(e.to_string()))?;

        Ok(Self::with_client(uid, endpoint, client))
    }

    /// Creates a datasource with a custom reqwest client.
    #[must_use]
    pub fn with_client(uid: impl Into<String>, endpoint: Url, client: Client) -> Self {
        Self {
            uid: uid.into(),
            endpoint,
            client,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute(
        client: Client,
        endpoint: Url,
        timeout: Duration,
        request: DataQueryRequest,
    ) -> Result<Vec<DataFrame>, DataQueryError> {
        let response = client
            .post(endpoint)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DataQueryError::new(format!("failed to read response body: {e}")))?;
        let parsed = serde_json::from_slice::<QueryResponse>(&body);

        if !status.is_success() {
            let error = parsed
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| DataQueryError::new(format!("datasource responded with {status}")));
            return Err(error.with_status(status.as_u16()));
        }

        let parsed = parsed
            .map_err(|e| DataQueryError::new(format!("invalid datasource response: {e}")))?;
        match parsed.error {
            Some(error) => Err(error),
            None => Ok(parsed.frames),
        }
    }

    /// Maps reqwest errors to query errors.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> DataQueryError {
        if error.is_timeout() {
            return DataQueryError::new(format!(
                "request timed out after {} ms",
                timeout.as_millis()
            ));
        }
        if error.is_connect() {
            return DataQueryError::new(format!("connection failed: {error}"));
        }
        DataQueryError::new(error.to_string())
    }
}

impl DataSourceApi for HttpDataSource {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn run_request(
        &self,
        _options: RunRequestOptions,
        request: DataQueryRequest,
    ) -> BoxStream<'static, PanelData> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        let uid = self.uid.clone();

        let result = async move {
            let request_id = request.request_id.clone();
            match Self::execute(client, endpoint, timeout, request).await {
                Ok(frames) => PanelData::done(frames),
                Err(error) => {
                    tracing::debug!(%uid, %request_id, %error, "HTTP datasource query failed");
                    PanelData::error(error)
                }
            }
        };

        stream::once(async { PanelData::loading() })
            .chain(stream::once(result))
            .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dashvar_domain::{CoreApp, DataQuery, Field, LoadingState, ScopedVars, TimeRange};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn request() -> DataQueryRequest {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        DataQueryRequest {
            app: CoreApp::Dashboard,
            request_id: "req-42".to_string(),
            timezone: String::new(),
            range: TimeRange::default_at(now),
            interval: String::new(),
            interval_ms: 0,
            targets: vec![DataQuery::new("A", json!("hosts"))],
            scoped_vars: ScopedVars::new(),
            start_time: now,
        }
    }

    async fn read_body(stream: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let read = stream.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                let body = &buffer[header_end + 4..];
                if body.len() >= length {
                    return String::from_utf8_lossy(&body[..length]).to_string();
                }
            }
        }
        String::new()
    }

    /// Serves one canned response and hands back the request body.
    async fn serve_once(status: &'static str, body: String) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (sender, receiver) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let received = read_body(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            let _ = sender.send(received);
        });

        let url = Url::parse(&format!("http://{address}/query")).unwrap();
        (url, receiver)
    }

    async fn run(source: &HttpDataSource) -> Vec<PanelData> {
        source
            .run_request(RunRequestOptions::default(), request())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_frames_response() {
        let body = json!({
            "frames": [{ "fields": [{ "name": "text", "values": ["web-1", "web-2"] }] }]
        })
        .to_string();
        let (url, received) = serve_once("200 OK", body).await;
        let source = HttpDataSource::new("http", url).unwrap();

        let snapshots = run(&source).await;

        assert_eq!(snapshots[0].state, LoadingState::Loading);
        assert_eq!(
            snapshots[1],
            PanelData::done(vec![DataFrame::new(vec![Field::new(
                "text",
                vec![json!("web-1"), json!("web-2")]
            )])])
        );

        let sent: serde_json::Value = serde_json::from_str(&received.await.unwrap()).unwrap();
        assert_eq!(sent["requestId"], json!("req-42"));
        assert_eq!(sent["app"], json!("dashboard"));
        assert_eq!(sent["targets"][0]["refId"], json!("A"));
    }

    #[tokio::test]
    async fn test_error_response() {
        let body = json!({ "error": { "message": "parse error", "cancelled": false } }).to_string();
        let (url, _received) = serve_once("400 Bad Request", body).await;
        let source = HttpDataSource::new("http", url).unwrap();

        let snapshots = run(&source).await;
        let error = snapshots[1].error.clone().unwrap();

        assert_eq!(error.message, "parse error");
        assert_eq!(error.status, Some(400));
    }

    #[tokio::test]
    async fn test_cancelled_error_in_body() {
        let body = json!({ "error": { "message": "cancelled", "cancelled": true } }).to_string();
        let (url, _received) = serve_once("200 OK", body).await;
        let source = HttpDataSource::new("http", url).unwrap();

        let snapshots = run(&source).await;
        assert!(snapshots[1].error.as_ref().unwrap().cancelled);
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let (url, _received) = serve_once("200 OK", "not json".to_string()).await;
        let source = HttpDataSource::new("http", url).unwrap();

        let snapshots = run(&source).await;
        let error = snapshots[1].error.clone().unwrap();
        assert!(error.message.starts_with("invalid datasource response"));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{address}/query")).unwrap();
        let source = HttpDataSource::new("http", url)
            .unwrap()
            .with_timeout(Duration::from_secs(2));

        let snapshots = run(&source).await;
        assert_eq!(snapshots[1].state, LoadingState::Error);
    }
}
