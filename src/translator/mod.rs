//! Domain services: text translation, memories, glossaries, documents
//!
//! Façades are thin request builders over the signing client; they assemble
//! wire fields and leave transport, signing, and normalization to the core.

pub mod models;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use crate::core::client::LaraClient;
use crate::core::config::{BaseUrl, DEFAULT_BASE_URL};
use crate::core::credentials::Credentials;
use crate::core::errors::{LaraError, Result};
use crate::core::jobs::{wait_for_completion, POLLING_INTERVAL};
use crate::core::s3::BlobTransfer;
use crate::core::transport::FileInput;
use crate::core::{s3, transport};
use crate::utils::case::snakeize_keys;

use models::{
    Document, DocumentDownloadOptions, DocumentStatus, DocumentTranslateOptions,
    DocumentUploadOptions, Glossary, GlossaryCounts, GlossaryImport, Memory, MemoryImport,
    TextResult, TranslateOptions, TranslateQuery, TranslationUnit,
};

/// Maximum wait applied by the document translate-and-wait convenience method
const MAX_DOCUMENT_TRANSLATE_WAIT: Duration = Duration::from_secs(15 * 60);

/// Client construction options
#[derive(Debug, Clone, Default)]
pub struct TranslatorOptions {
    /// Base URL override; the production origin when absent
    pub server_url: Option<String>,
    /// Per-instance extra headers merged beneath per-call headers
    pub headers: Option<HashMap<String, String>>,
}

/// Entry point to the Lara API
#[derive(Debug)]
pub struct Translator {
    client: Arc<LaraClient>,
    /// Translation-memory operations
    pub memories: Memories,
    /// Document translation operations
    pub documents: Documents,
    /// Glossary operations
    pub glossaries: Glossaries,
}

impl Translator {
    /// Create a client against the production endpoint
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_options(credentials, TranslatorOptions::default())
    }

    /// Create a client with an endpoint override and header overlay
    pub fn with_options(credentials: Credentials, options: TranslatorOptions) -> Result<Self> {
        let base_url =
            BaseUrl::parse(options.server_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let transport = transport::create(&base_url)?;
        let blob = s3::create()?;
        let client = Arc::new(LaraClient::new(
            credentials,
            transport,
            options.headers.unwrap_or_default(),
        ));

        Ok(Self::assemble(client, blob))
    }

    fn assemble(client: Arc<LaraClient>, blob: Arc<dyn BlobTransfer>) -> Self {
        Self {
            memories: Memories::new(client.clone()),
            documents: Documents::new(client.clone(), blob),
            glossaries: Glossaries::new(client.clone()),
            client,
        }
    }

    /// List the language codes the service supports
    pub async fn languages(&self) -> Result<Vec<String>> {
        self.client.get("/languages", None).await
    }

    /// Translate text from `source` (auto-detected when `None`) into `target`
    pub async fn translate(
        &self,
        q: impl Into<TranslateQuery>,
        source: Option<&str>,
        target: &str,
        options: TranslateOptions,
    ) -> Result<TextResult> {
        let mut headers = options.headers.unwrap_or_default();
        if options.no_trace {
            headers.insert("X-No-Trace".to_string(), "true".to_string());
        }

        let body = json!({
            "q": q.into(),
            "source": source,
            "target": target,
            "source_hint": options.source_hint,
            "content_type": options.content_type,
            "multiline": options.multiline.unwrap_or(true),
            "adapt_to": options.adapt_to,
            "glossaries": options.glossaries,
            "instructions": options.instructions,
            "timeout": options.timeout_in_millis,
            "priority": options.priority,
            "use_cache": options.use_cache,
            "cache_ttl": options.cache_ttl_seconds,
            "verbose": options.verbose,
            "style": options.style,
        });

        self.client
            .post("/translate", Some(body), None, Some(headers))
            .await
    }
}

/// Translation-memory management
#[derive(Debug)]
pub struct Memories {
    client: Arc<LaraClient>,
}

impl Memories {
    fn new(client: Arc<LaraClient>) -> Self {
        Self { client }
    }

    /// List all memories owned by or shared with the caller
    pub async fn list(&self) -> Result<Vec<Memory>> {
        self.client.get("/memories", None).await
    }

    /// Create a memory, optionally tagged with an external identifier
    pub async fn create(&self, name: &str, external_id: Option<&str>) -> Result<Memory> {
        self.client
            .post(
                "/memories",
                Some(json!({"name": name, "external_id": external_id})),
                None,
                None,
            )
            .await
    }

    /// Fetch a memory by id; `None` when it does not exist
    pub async fn get(&self, id: &str) -> Result<Option<Memory>> {
        match self.client.get(&format!("/memories/{id}"), None).await {
            Ok(memory) => Ok(Some(memory)),
            Err(LaraError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a memory
    pub async fn delete(&self, id: &str) -> Result<Memory> {
        self.client.delete(&format!("/memories/{id}"), None).await
    }

    /// Rename a memory
    pub async fn update(&self, id: &str, name: &str) -> Result<Memory> {
        self.client
            .put(
                &format!("/memories/{id}"),
                Some(json!({"name": name})),
                None,
                None,
            )
            .await
    }

    /// Connect externally shared memories to the caller's account
    pub async fn connect(&self, ids: &[&str]) -> Result<Vec<Memory>> {
        self.client
            .post("/memories/connect", Some(json!({"ids": ids})), None, None)
            .await
    }

    /// Start a TMX import into a memory
    pub async fn import_tmx(
        &self,
        id: &str,
        tmx: impl Into<FileInput>,
        gzip: bool,
    ) -> Result<MemoryImport> {
        let mut files = HashMap::new();
        files.insert("tmx".to_string(), tmx.into());

        self.client
            .post(
                &format!("/memories/{id}/import"),
                Some(json!({"compression": gzip.then_some("gzip")})),
                Some(files),
                None,
            )
            .await
    }

    /// Add a translation pair to one memory
    pub async fn add_translation(
        &self,
        id: &str,
        unit: &TranslationUnit,
    ) -> Result<MemoryImport> {
        self.client
            .put(
                &format!("/memories/{id}/content"),
                Some(unit_body(unit, None)),
                None,
                None,
            )
            .await
    }

    /// Add a translation pair to several memories at once
    pub async fn add_translation_multi(
        &self,
        ids: &[&str],
        unit: &TranslationUnit,
    ) -> Result<MemoryImport> {
        self.client
            .put(
                "/memories/content",
                Some(unit_body(unit, Some(ids))),
                None,
                None,
            )
            .await
    }

    /// Remove a translation pair from one memory
    pub async fn delete_translation(
        &self,
        id: &str,
        unit: &TranslationUnit,
    ) -> Result<MemoryImport> {
        self.client
            .delete(
                &format!("/memories/{id}/content"),
                Some(unit_body(unit, None)),
            )
            .await
    }

    /// Remove a translation pair from several memories at once
    pub async fn delete_translation_multi(
        &self,
        ids: &[&str],
        unit: &TranslationUnit,
    ) -> Result<MemoryImport> {
        self.client
            .delete("/memories/content", Some(unit_body(unit, Some(ids))))
            .await
    }

    /// Fetch the status of an import job
    pub async fn get_import_status(&self, id: &str) -> Result<MemoryImport> {
        self.client.get(&format!("/memories/imports/{id}"), None).await
    }

    /// Poll an import job until completion, a fetch error, or the deadline
    pub async fn wait_for_import(
        &self,
        import: MemoryImport,
        update_callback: Option<&mut dyn FnMut(&MemoryImport)>,
        max_wait: Option<Duration>,
    ) -> Result<MemoryImport> {
        wait_for_completion(
            import,
            |id| async move { self.get_import_status(&id).await },
            update_callback,
            max_wait,
        )
        .await
    }
}

fn unit_body(unit: &TranslationUnit, ids: Option<&[&str]>) -> serde_json::Value {
    json!({
        "ids": ids,
        "source": unit.source,
        "target": unit.target,
        "sentence": unit.sentence,
        "translation": unit.translation,
        "tuid": unit.tuid,
        "sentence_before": unit.sentence_before,
        "sentence_after": unit.sentence_after,
    })
}

/// Glossary management
#[derive(Debug)]
pub struct Glossaries {
    client: Arc<LaraClient>,
}

impl Glossaries {
    fn new(client: Arc<LaraClient>) -> Self {
        Self { client }
    }

    /// List all glossaries owned by the caller
    pub async fn list(&self) -> Result<Vec<Glossary>> {
        self.client.get("/glossaries", None).await
    }

    /// Create a glossary
    pub async fn create(&self, name: &str) -> Result<Glossary> {
        self.client
            .post("/glossaries", Some(json!({"name": name})), None, None)
            .await
    }

    /// Fetch a glossary by id; `None` when it does not exist
    pub async fn get(&self, id: &str) -> Result<Option<Glossary>> {
        match self.client.get(&format!("/glossaries/{id}"), None).await {
            Ok(glossary) => Ok(Some(glossary)),
            Err(LaraError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a glossary
    pub async fn delete(&self, id: &str) -> Result<Glossary> {
        self.client.delete(&format!("/glossaries/{id}"), None).await
    }

    /// Rename a glossary
    pub async fn update(&self, id: &str, name: &str) -> Result<Glossary> {
        self.client
            .put(
                &format!("/glossaries/{id}"),
                Some(json!({"name": name})),
                None,
                None,
            )
            .await
    }

    /// Start a CSV import into a glossary
    pub async fn import_csv(
        &self,
        id: &str,
        csv: impl Into<FileInput>,
        gzip: bool,
    ) -> Result<GlossaryImport> {
        let mut files = HashMap::new();
        files.insert("csv".to_string(), csv.into());

        self.client
            .post(
                &format!("/glossaries/{id}/import"),
                Some(json!({"compression": gzip.then_some("gzip")})),
                Some(files),
                None,
            )
            .await
    }

    /// Fetch the status of an import job
    pub async fn get_import_status(&self, id: &str) -> Result<GlossaryImport> {
        self.client
            .get(&format!("/glossaries/imports/{id}"), None)
            .await
    }

    /// Poll an import job until completion, a fetch error, or the deadline
    pub async fn wait_for_import(
        &self,
        import: GlossaryImport,
        update_callback: Option<&mut dyn FnMut(&GlossaryImport)>,
        max_wait: Option<Duration>,
    ) -> Result<GlossaryImport> {
        wait_for_completion(
            import,
            |id| async move { self.get_import_status(&id).await },
            update_callback,
            max_wait,
        )
        .await
    }

    /// Entry counts of a glossary
    pub async fn counts(&self, id: &str) -> Result<GlossaryCounts> {
        self.client.get(&format!("/glossaries/{id}/counts"), None).await
    }

    /// Export a glossary as CSV text
    pub async fn export(
        &self,
        id: &str,
        content_type: &str,
        source: Option<&str>,
    ) -> Result<String> {
        self.client
            .get(
                &format!("/glossaries/{id}/export"),
                Some(json!({"content_type": content_type, "source": source})),
            )
            .await
    }
}

#[derive(Debug, serde::Deserialize)]
struct UploadUrlData {
    url: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, serde::Deserialize)]
struct DownloadUrlData {
    url: String,
}

/// Document translation
#[derive(Debug)]
pub struct Documents {
    client: Arc<LaraClient>,
    blob: Arc<dyn BlobTransfer>,
}

impl Documents {
    fn new(client: Arc<LaraClient>, blob: Arc<dyn BlobTransfer>) -> Self {
        Self { client, blob }
    }

    /// Upload a document and register it for translation.
    ///
    /// The content goes to a pre-signed storage endpoint first; the API only
    /// ever sees the opaque storage key.
    pub async fn upload(
        &self,
        file: impl Into<FileInput>,
        filename: &str,
        source: Option<&str>,
        target: &str,
        options: DocumentUploadOptions,
    ) -> Result<Document> {
        let upload_url: UploadUrlData = self
            .client
            .get("/documents/upload-url", Some(json!({"filename": filename})))
            .await?;

        self.blob
            .upload(&upload_url.url, &upload_url.fields, file.into())
            .await?;

        let s3key = upload_url.fields.get("key").cloned().ok_or_else(|| {
            LaraError::InvalidResponse {
                message: "upload-url response is missing the storage key".to_string(),
            }
        })?;

        let mut headers = HashMap::new();
        if options.no_trace {
            headers.insert("X-No-Trace".to_string(), "true".to_string());
        }

        let body = json!({
            "source": source,
            "target": target,
            "s3key": s3key,
            "adapt_to": options.adapt_to,
            "glossaries": options.glossaries,
            "style": options.style,
            "password": options.password,
            "extraction_params": options.extraction_params.map(snakeize_keys),
        });

        self.client
            .post("/documents", Some(body), None, Some(headers))
            .await
    }

    /// Fetch the current translation state of a document
    pub async fn status(&self, id: &str) -> Result<Document> {
        self.client.get(&format!("/documents/{id}"), None).await
    }

    /// Download the translated result of a document
    pub async fn download(
        &self,
        id: &str,
        options: DocumentDownloadOptions,
    ) -> Result<Vec<u8>> {
        let download_url: DownloadUrlData = self
            .client
            .get(
                &format!("/documents/{id}/download-url"),
                Some(json!({"output_format": options.output_format})),
            )
            .await?;

        self.blob.download(&download_url.url).await
    }

    /// Upload a document, wait for its translation, and download the result.
    ///
    /// A server-reported `Error` status fails immediately with the server's
    /// reason; translations still pending after 15 minutes time out.
    pub async fn translate(
        &self,
        file: impl Into<FileInput>,
        filename: &str,
        source: Option<&str>,
        target: &str,
        options: DocumentTranslateOptions,
    ) -> Result<Vec<u8>> {
        let upload_options = DocumentUploadOptions {
            adapt_to: options.adapt_to,
            glossaries: options.glossaries,
            style: options.style,
            password: options.password,
            extraction_params: options.extraction_params,
            no_trace: options.no_trace,
        };
        let download_options = DocumentDownloadOptions {
            output_format: options.output_format,
        };

        let document = self
            .upload(file, filename, source, target, upload_options)
            .await?;

        let start = Instant::now();
        while start.elapsed() < MAX_DOCUMENT_TRANSLATE_WAIT {
            sleep(POLLING_INTERVAL).await;

            let current = self.status(&document.id).await?;
            debug!(id = %current.id, status = ?current.status, "document status refreshed");

            match current.status {
                DocumentStatus::Translated => {
                    return self.download(&document.id, download_options.clone()).await;
                }
                DocumentStatus::Error => {
                    return Err(LaraError::Api {
                        status: 500,
                        error_type: "DocumentError".to_string(),
                        message: current
                            .error_reason
                            .unwrap_or_else(|| "An unknown error occurred".to_string()),
                        details: None,
                    });
                }
                _ => {}
            }
        }

        Err(LaraError::Timeout)
    }
}
