//! Request signer and dispatcher
//!
//! Builds the canonical header set, signs it with the access key secret,
//! hands the serialized body to a transport, and normalizes the response
//! envelope. The dispatcher holds no mutable state across calls; any number
//! of requests may be in flight concurrently on one instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::credentials::Credentials;
use crate::core::crypto::{self, PortableCrypto};
use crate::core::errors::{LaraError, Result};
use crate::core::transport::{FileInput, Payload, Transport};
use crate::utils::case::camelize_keys;

/// SDK name reported in the `X-Lara-SDK-Name` header
pub const SDK_NAME: &str = "lara-rust";

/// Logical HTTP verb, conveyed via `X-HTTP-Method-Override`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named file attachments for multipart requests
pub(crate) type Files = HashMap<String, FileInput>;

/// Signing and dispatch client shared by all domain services
#[derive(Debug)]
pub(crate) struct LaraClient {
    access_key_id: String,
    access_key_secret: String,
    crypto: &'static (dyn PortableCrypto + Send + Sync),
    transport: Arc<dyn Transport>,
    extra_headers: HashMap<String, String>,
}

impl LaraClient {
    /// Create a client over the given transport.
    ///
    /// `extra_headers` is a per-instance overlay merged beneath per-call
    /// headers on every request; it is read-only after construction.
    pub fn new(
        credentials: Credentials,
        transport: Arc<dyn Transport>,
        extra_headers: HashMap<String, String>,
    ) -> Self {
        Self {
            access_key_id: credentials.access_key_id,
            access_key_secret: credentials.access_key_secret,
            crypto: crypto::provider(),
            transport,
            extra_headers,
        }
    }

    /// GET-style request; `body` acts as a query-like payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(HttpMethod::Get, path, body, None, None).await
    }

    /// DELETE-style request; `body` acts as a query-like payload
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(HttpMethod::Delete, path, body, None, None)
            .await
    }

    /// POST request with optional body, file attachments, and extra headers
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        files: Option<Files>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<T> {
        self.request(HttpMethod::Post, path, body, files, headers)
            .await
    }

    /// PUT request with optional body, file attachments, and extra headers
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
        files: Option<Files>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<T> {
        self.request(HttpMethod::Put, path, body, files, headers)
            .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        files: Option<Files>,
        call_headers: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert(
            "X-HTTP-Method-Override".to_string(),
            method.as_str().to_string(),
        );
        headers.insert("X-Lara-Date".to_string(), http_date());
        headers.insert("X-Lara-SDK-Name".to_string(), SDK_NAME.to_string());
        headers.insert(
            "X-Lara-SDK-Version".to_string(),
            crate::VERSION.to_string(),
        );

        for (name, value) in &self.extra_headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(extra) = call_headers {
            for (name, value) in extra {
                headers.insert(name, value);
            }
        }

        // Null fields never reach the checksum input or the wire body.
        let body = match body {
            Some(value) => strip_nulls(value)?,
            None => None,
        };

        // Serialized once: the digest below and the transport both use this
        // exact string.
        let json_body = match &body {
            Some(map) => Some(serde_json::to_string(map)?),
            None => None,
        };
        if let Some(json) = &json_body {
            headers.insert("Content-MD5".to_string(), self.crypto.digest(json));
        }

        let content_type = if files.is_some() {
            "multipart/form-data"
        } else {
            "application/json"
        };
        headers.insert("Content-Type".to_string(), content_type.to_string());

        let signature = self.sign(method, &path, &headers);
        headers.insert(
            "Authorization".to_string(),
            format!("Lara {}:{}", self.access_key_id, signature),
        );

        let payload = match files {
            Some(files) => Some(Payload::Multipart {
                fields: body.unwrap_or_default(),
                files,
            }),
            None => json_body.map(Payload::Json),
        };

        let response = self.transport.send(&path, &headers, payload).await?;
        debug!(status = response.status_code, "{method} {path}");

        if (200..300).contains(&response.status_code) {
            let content = response.body.get("content").cloned().unwrap_or(Value::Null);
            serde_json::from_value(camelize_keys(content)).map_err(|e| {
                LaraError::InvalidResponse {
                    message: format!("Unexpected response shape: {e}"),
                }
            })
        } else {
            let error = response.body.get("error").cloned().unwrap_or(Value::Null);
            let error_type = error
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("UnknownError")
                .to_string();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("An unknown error occurred")
                .to_string();

            warn!(
                status = response.status_code,
                error_type, "{method} {path} failed"
            );

            Err(LaraError::Api {
                status: response.status_code,
                error_type,
                message,
                details: error.get("details").cloned().filter(|d| !d.is_null()),
            })
        }
    }

    /// Signature over the fixed five-line canonical string.
    ///
    /// Checksum and content type are taken back out of the header set, so
    /// the signed values are exactly the ones sent on the wire.
    fn sign(&self, method: HttpMethod, path: &str, headers: &HashMap<String, String>) -> String {
        let date = header_value(headers, "X-Lara-Date");
        let content_md5 = header_value(headers, "Content-MD5");
        let content_type = header_value(headers, "Content-Type");
        let http_method = headers
            .get("X-HTTP-Method-Override")
            .map(|v| v.trim())
            .unwrap_or(method.as_str())
            .to_uppercase();

        let challenge = format!("{http_method}\n{path}\n{content_md5}\n{content_type}\n{date}");
        self.crypto.hmac(&self.access_key_secret, &challenge)
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> &'a str {
    headers.get(name).map(|v| v.trim()).unwrap_or("")
}

/// Current UTC time in RFC 1123 form
fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Drop null fields; an empty mapping counts as no body at all
fn strip_nulls(body: Value) -> Result<Option<Map<String, Value>>> {
    let map = match body {
        Value::Object(map) => map,
        other => {
            return Err(LaraError::InvalidInput {
                message: format!("Request body must be a JSON object, got {other}"),
            })
        }
    };

    let stripped: Map<String, Value> = map.into_iter().filter(|(_, v)| !v.is_null()).collect();
    Ok(if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::transport::testing::StubTransport;

    fn client(stub: Arc<StubTransport>) -> LaraClient {
        LaraClient::new(
            Credentials::new("test-key-id", "test-key-secret"),
            stub,
            HashMap::new(),
        )
    }

    #[tokio::test]
    async fn test_null_fields_are_stripped_from_body_and_checksum() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        let lara = client(stub.clone());

        let _: Value = lara
            .post(
                "/memories",
                Some(json!({"name": "My memory", "external_id": null})),
                None,
                None,
            )
            .await
            .unwrap();

        let requests = stub.take_requests();
        let sent = &requests[0];

        let Some(Payload::Json(body)) = &sent.body else {
            panic!("expected a JSON payload");
        };
        assert_eq!(body, r#"{"name":"My memory"}"#);
        assert_eq!(
            sent.headers.get("Content-MD5").unwrap(),
            &crypto::provider().digest(body)
        );
    }

    #[tokio::test]
    async fn test_all_null_body_is_treated_as_absent() {
        let stub = StubTransport::replying(200, json!({"content": []}));
        let lara = client(stub.clone());

        let _: Value = lara
            .get("/memories", Some(json!({"external_id": null})))
            .await
            .unwrap();

        let sent = &stub.take_requests()[0];
        assert!(sent.body.is_none());
        assert!(!sent.headers.contains_key("Content-MD5"));
    }

    #[tokio::test]
    async fn test_path_is_normalized_and_verb_is_overridden() {
        let stub = StubTransport::replying(200, json!({"content": []}));
        let lara = client(stub.clone());

        let _: Value = lara.delete("memories/m1", None).await.unwrap();

        let sent = &stub.take_requests()[0];
        assert_eq!(sent.path, "/memories/m1");
        assert_eq!(sent.headers.get("X-HTTP-Method-Override").unwrap(), "DELETE");
        assert_eq!(sent.headers.get("X-Lara-SDK-Name").unwrap(), SDK_NAME);
        assert_eq!(sent.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_signature_covers_the_canonical_string() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        let lara = client(stub.clone());

        let _: Value = lara
            .post("/translate", Some(json!({"q": "Hello"})), None, None)
            .await
            .unwrap();

        let sent = &stub.take_requests()[0];
        let challenge = format!(
            "POST\n/translate\n{}\n{}\n{}",
            sent.headers.get("Content-MD5").unwrap(),
            sent.headers.get("Content-Type").unwrap(),
            sent.headers.get("X-Lara-Date").unwrap(),
        );
        let expected = crypto::provider().hmac("test-key-secret", &challenge);

        assert_eq!(
            sent.headers.get("Authorization").unwrap(),
            &format!("Lara test-key-id:{expected}")
        );
    }

    #[tokio::test]
    async fn test_signature_changes_with_the_path() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        stub.push_response(200, json!({"content": {}}));
        let lara = client(stub.clone());

        let _: Value = lara.get("/memories", None).await.unwrap();
        let _: Value = lara.get("/glossaries", None).await.unwrap();

        let requests = stub.take_requests();
        assert_ne!(
            requests[0].headers.get("Authorization"),
            requests[1].headers.get("Authorization")
        );
    }

    #[tokio::test]
    async fn test_status_code_boundaries() {
        for (status, ok) in [(199, false), (200, true), (299, true), (300, false)] {
            let stub = StubTransport::replying(status, json!({"content": {}, "error": {}}));
            let lara = client(stub);

            let result: Result<Value> = lara.get("/memories", None).await;
            assert_eq!(result.is_ok(), ok, "status {status}");

            if !ok {
                match result {
                    Err(LaraError::Api {
                        status: got,
                        error_type,
                        message,
                        ..
                    }) => {
                        assert_eq!(got, status);
                        assert_eq!(error_type, "UnknownError");
                        assert_eq!(message, "An unknown error occurred");
                    }
                    other => panic!("expected an API error, got {other:?}"),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_api_error_carries_server_fields() {
        let stub = StubTransport::replying(
            403,
            json!({"error": {"type": "AuthError", "message": "bad key", "details": {"hint": "rotate"}}}),
        );
        let lara = client(stub);

        let result: Result<Value> = lara.get("/memories", None).await;
        match result {
            Err(LaraError::Api {
                status,
                error_type,
                message,
                details,
            }) => {
                assert_eq!(status, 403);
                assert_eq!(error_type, "AuthError");
                assert_eq!(message, "bad key");
                assert_eq!(details, Some(json!({"hint": "rotate"})));
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_response_keys_are_camelized() {
        let stub = StubTransport::replying(
            200,
            json!({"content": {"source_language": "en-US", "translated_chars": 5}}),
        );
        let lara = client(stub);

        let content: Value = lara.get("/documents/d1", None).await.unwrap();
        assert_eq!(
            content,
            json!({"sourceLanguage": "en-US", "translatedChars": 5})
        );
    }

    #[tokio::test]
    async fn test_multipart_keeps_scalar_fields_and_checksum() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        let lara = client(stub.clone());

        let mut files = HashMap::new();
        files.insert(
            "tmx".to_string(),
            FileInput::bytes("memory.tmx", b"<tmx/>".to_vec()),
        );

        let _: Value = lara
            .post(
                "/memories/m1/import",
                Some(json!({"compression": "gzip"})),
                Some(files),
                None,
            )
            .await
            .unwrap();

        let sent = &stub.take_requests()[0];
        assert_eq!(
            sent.headers.get("Content-Type").unwrap(),
            "multipart/form-data"
        );
        assert!(sent.headers.contains_key("Content-MD5"));

        let Some(Payload::Multipart { fields, files }) = &sent.body else {
            panic!("expected a multipart payload");
        };
        assert_eq!(fields.get("compression"), Some(&json!("gzip")));
        assert!(files.contains_key("tmx"));
    }

    #[tokio::test]
    async fn test_per_call_headers_override_instance_overlay() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        let mut overlay = HashMap::new();
        overlay.insert("X-No-Trace".to_string(), "false".to_string());
        let lara = LaraClient::new(
            Credentials::new("id", "secret"),
            stub.clone(),
            overlay,
        );

        let mut call_headers = HashMap::new();
        call_headers.insert("X-No-Trace".to_string(), "true".to_string());

        let _: Value = lara
            .post("/translate", Some(json!({"q": "x"})), None, Some(call_headers))
            .await
            .unwrap();

        let sent = &stub.take_requests()[0];
        assert_eq!(sent.headers.get("X-No-Trace").unwrap(), "true");
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let stub = StubTransport::replying(200, json!({"content": {}}));
        let lara = client(stub);

        let result: Result<Value> = lara.post("/translate", Some(json!("q")), None, None).await;
        assert!(matches!(result, Err(LaraError::InvalidInput { .. })));
    }
}
