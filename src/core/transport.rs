//! HTTP transport implementations
//!
//! Every request goes over the wire as a POST; the logical verb travels in
//! the `X-HTTP-Method-Override` header so intermediaries that mishandle PUT
//! or DELETE bodies never see them. Two variants implement the same send
//! contract: [`HttpTransport`] runs on a keep-alive connection pool, while
//! [`FetchTransport`] is the plain fetch-style client used on wasm targets.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::core::config::BaseUrl;
use crate::core::errors::{LaraError, Result};

/// A file-like input accepted by multipart operations
#[derive(Debug, Clone)]
pub enum FileInput {
    /// Path of a file on disk, read when the request is built
    Path(PathBuf),
    /// Named in-memory content
    Content {
        /// File name reported in the multipart part
        filename: String,
        /// Raw file bytes
        bytes: Vec<u8>,
    },
}

impl FileInput {
    /// Build a file input from in-memory bytes
    pub fn bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Content {
            filename: filename.into(),
            bytes,
        }
    }
}

impl From<PathBuf> for FileInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&std::path::Path> for FileInput {
    fn from(path: &std::path::Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for FileInput {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Serialized request body handed to the transport.
///
/// JSON bodies carry the exact string the checksum was computed over, so
/// the signed digest always covers the bytes that hit the wire.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    /// Pre-serialized JSON body
    Json(String),
    /// Multipart body: scalar fields riding alongside file parts
    Multipart {
        /// Non-file form fields
        fields: Map<String, Value>,
        /// Named file attachments
        files: HashMap<String, FileInput>,
    },
}

/// Raw exchange result before envelope handling
#[derive(Debug, Clone)]
pub(crate) struct TransportResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Decoded response body
    pub body: Value,
}

/// One HTTP exchange with the verb override already embedded in `headers`
#[async_trait]
pub(crate) trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform exactly one exchange and decode the response body
    async fn send(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
        body: Option<Payload>,
    ) -> Result<TransportResponse>;
}

/// Transport backed by a keep-alive connection pool, reused across calls
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub(crate) struct HttpTransport {
    origin: String,
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpTransport {
    /// Create a transport for the given endpoint
    pub fn new(base_url: &BaseUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(std::time::Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            origin: base_url.origin(),
            client,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
        body: Option<Payload>,
    ) -> Result<TransportResponse> {
        dispatch(&self.client, &self.origin, path, headers, body).await
    }
}

/// Fetch-style transport without pool tuning; connection reuse is left to
/// the underlying platform
#[derive(Debug)]
pub(crate) struct FetchTransport {
    origin: String,
    client: reqwest::Client,
}

impl FetchTransport {
    /// Create a transport for the given endpoint
    pub fn new(base_url: &BaseUrl) -> Self {
        Self {
            origin: base_url.origin(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for FetchTransport {
    async fn send(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
        body: Option<Payload>,
    ) -> Result<TransportResponse> {
        dispatch(&self.client, &self.origin, path, headers, body).await
    }
}

/// Pick the transport variant for the current platform
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn create(base_url: &BaseUrl) -> Result<std::sync::Arc<dyn Transport>> {
    Ok(std::sync::Arc::new(HttpTransport::new(base_url)?))
}

/// Pick the transport variant for the current platform
#[cfg(target_arch = "wasm32")]
pub(crate) fn create(base_url: &BaseUrl) -> Result<std::sync::Arc<dyn Transport>> {
    Ok(std::sync::Arc::new(FetchTransport::new(base_url)))
}

async fn dispatch(
    client: &reqwest::Client,
    origin: &str,
    path: &str,
    headers: &HashMap<String, String>,
    body: Option<Payload>,
) -> Result<TransportResponse> {
    let url = format!("{origin}{path}");

    // For multipart the bare Content-Type is dropped so the encoder can
    // attach the boundary parameter itself.
    let is_multipart = matches!(body, Some(Payload::Multipart { .. }));
    let mut request = client.post(&url).headers(header_map(headers, is_multipart)?);

    match body {
        Some(Payload::Json(json)) => request = request.body(json),
        Some(Payload::Multipart { fields, files }) => {
            request = request.multipart(build_form(fields, files).await?);
        }
        None => {}
    }

    debug!("POST {path}");
    let response = request.send().await?;
    read_response(response).await
}

fn header_map(headers: &HashMap<String, String>, skip_content_type: bool) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        if skip_content_type && name.eq_ignore_ascii_case("content-type") {
            continue;
        }

        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| LaraError::InvalidInput {
            message: format!("Invalid header name {name:?}: {e}"),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| LaraError::InvalidInput {
            message: format!("Invalid header value for {name}: {e}"),
        })?;

        map.insert(name, value);
    }

    Ok(map)
}

async fn build_form(fields: Map<String, Value>, files: HashMap<String, FileInput>) -> Result<Form> {
    let mut form = Form::new();

    for (name, value) in fields {
        if is_falsy(&value) {
            continue;
        }

        match value {
            Value::Array(items) => {
                for item in items {
                    if !is_falsy(&item) {
                        form = form.text(name.clone(), scalar_text(&item));
                    }
                }
            }
            other => form = form.text(name, scalar_text(&other)),
        }
    }

    for (name, file) in files {
        form = form.part(name, wrap_multipart_file(file).await?);
    }

    Ok(form)
}

/// Convert a file-like input into the part the multipart encoder requires.
///
/// Path inputs are read from disk; missing or unreadable files surface as
/// IO errors to the caller.
pub(crate) async fn wrap_multipart_file(file: FileInput) -> Result<Part> {
    match file {
        FileInput::Path(path) => {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            let bytes = tokio::fs::read(&path).await?;

            Ok(Part::bytes(bytes).file_name(filename))
        }
        FileInput::Content { filename, bytes } => Ok(Part::bytes(bytes).file_name(filename)),
    }
}

/// Fields with no usable value are left out of multipart bodies
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn read_response(response: reqwest::Response) -> Result<TransportResponse> {
    let status_code = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let text = response.text().await?;

    // CSV exports come back as raw text, not an envelope
    if content_type.contains("text/csv") {
        return Ok(TransportResponse {
            status_code,
            body: json!({ "content": text }),
        });
    }

    let body = serde_json::from_str(&text).map_err(|_| LaraError::InvalidResponse {
        message: "Invalid JSON response".to_string(),
    })?;

    Ok(TransportResponse { status_code, body })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// One request captured by the stub, as the dispatcher handed it over
    #[derive(Debug)]
    pub(crate) struct RecordedRequest {
        pub path: String,
        pub headers: HashMap<String, String>,
        pub body: Option<Payload>,
    }

    /// In-memory transport replaying canned responses
    #[derive(Debug, Default)]
    pub(crate) struct StubTransport {
        requests: Mutex<Vec<RecordedRequest>>,
        responses: Mutex<VecDeque<TransportResponse>>,
    }

    impl StubTransport {
        pub fn replying(status_code: u16, body: Value) -> Arc<Self> {
            let stub = Self::default();
            stub.push_response(status_code, body);
            Arc::new(stub)
        }

        pub fn push_response(&self, status_code: u16, body: Value) {
            self.responses
                .lock()
                .unwrap()
                .push_back(TransportResponse { status_code, body });
        }

        pub fn take_requests(&self) -> Vec<RecordedRequest> {
            std::mem::take(&mut *self.requests.lock().unwrap())
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(
            &self,
            path: &str,
            headers: &HashMap<String, String>,
            body: Option<Payload>,
        ) -> Result<TransportResponse> {
            self.requests.lock().unwrap().push(RecordedRequest {
                path: path.to_string(),
                headers: headers.clone(),
                body,
            });

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LaraError::InvalidResponse {
                    message: "stub transport has no response queued".to_string(),
                })
        }
    }
}
