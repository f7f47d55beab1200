//! Typed API models
//!
//! Response structs deserialize from the normalized (camel-cased) payload
//! the dispatcher produces; wire timestamps are coerced through the strict
//! ISO-8601 millisecond format.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::core::jobs::JobStatus;

/// A store of prior source/target sentence pairs used to bias translations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Memory identifier
    pub id: String,
    /// Creation time
    #[serde(with = "crate::utils::time::iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Last update time
    #[serde(with = "crate::utils::time::iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// Time the memory was shared with its owner team
    #[serde(with = "crate::utils::time::iso_millis")]
    pub shared_at: DateTime<Utc>,
    /// Display name
    pub name: String,
    /// Caller-supplied external identifier, when one was given at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Sharing secret, present only for owned memories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Owning user
    pub owner_id: String,
    /// Number of collaborators with access
    pub collaborators_count: u32,
}

/// Server-side TMX import job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryImport {
    /// Job identifier
    pub id: String,
    /// Import window start, when reported
    #[serde(default)]
    pub begin: Option<i64>,
    /// Import window end, when reported
    #[serde(default)]
    pub end: Option<i64>,
    /// Ingestion channel, when reported
    #[serde(default)]
    pub channel: Option<String>,
    /// Payload size in bytes, when reported
    #[serde(default)]
    pub size: Option<i64>,
    /// Fractional progress; `1.0` means complete
    pub progress: f32,
}

impl JobStatus for MemoryImport {
    fn id(&self) -> &str {
        &self.id
    }

    fn progress(&self) -> f32 {
        self.progress
    }
}

/// A store of enforced term-to-term translation mappings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Glossary {
    /// Glossary identifier
    pub id: String,
    /// Creation time
    #[serde(with = "crate::utils::time::iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Last update time
    #[serde(with = "crate::utils::time::iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// Display name
    pub name: String,
    /// Owning user
    pub owner_id: String,
}

/// Server-side CSV import job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryImport {
    /// Job identifier
    pub id: String,
    /// Import window start, when reported
    #[serde(default)]
    pub begin: Option<i64>,
    /// Import window end, when reported
    #[serde(default)]
    pub end: Option<i64>,
    /// Payload size in bytes, when reported
    #[serde(default)]
    pub size: Option<i64>,
    /// Fractional progress; `1.0` means complete
    pub progress: f32,
}

impl JobStatus for GlossaryImport {
    fn id(&self) -> &str {
        &self.id
    }

    fn progress(&self) -> f32 {
        self.progress
    }
}

/// Term counts of a glossary, keyed by source language
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryCounts {
    /// Unidirectional entry counts per source language
    #[serde(default)]
    pub unidirectional: Option<HashMap<String, u64>>,
}

/// Server-authoritative document translation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Upload acknowledged, nothing started yet
    Initialized,
    /// Content analysis in progress
    Analyzing,
    /// Waiting for caller action
    Paused,
    /// Analysis finished, translation not started
    Ready,
    /// Translation in progress
    Translating,
    /// Translation finished, result downloadable
    Translated,
    /// Translation failed; see `error_reason`
    Error,
}

/// A document submitted for translation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document identifier
    pub id: String,
    /// Current translation state
    pub status: DocumentStatus,
    /// Source language, absent when auto-detected
    #[serde(default)]
    pub source: Option<String>,
    /// Target language
    pub target: String,
    /// Original file name
    pub filename: String,
    /// Opaque per-document options echoed by the server
    #[serde(default)]
    pub options: Option<Value>,
    /// Characters translated so far
    #[serde(default)]
    pub translated_chars: Option<u64>,
    /// Total characters detected
    #[serde(default)]
    pub total_chars: Option<u64>,
    /// Failure reason, set only in the `Error` state
    #[serde(default)]
    pub error_reason: Option<String>,
}

/// One block of a structured translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block content
    pub text: String,
    /// Whether the block should be translated or passed through
    pub translatable: bool,
}

/// Text input accepted by the translate operation
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TranslateQuery {
    /// A single string
    Text(String),
    /// A list of independent strings
    Multiple(Vec<String>),
    /// A list of blocks, some of which may be untranslatable
    Blocks(Vec<TextBlock>),
}

impl From<&str> for TranslateQuery {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TranslateQuery {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for TranslateQuery {
    fn from(texts: Vec<String>) -> Self {
        Self::Multiple(texts)
    }
}

impl From<Vec<&str>> for TranslateQuery {
    fn from(texts: Vec<&str>) -> Self {
        Self::Multiple(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<TextBlock>> for TranslateQuery {
    fn from(blocks: Vec<TextBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

/// Translated content, mirroring the shape of the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    /// Translation of a single string
    Text(String),
    /// Translations of a list of strings
    Multiple(Vec<String>),
    /// Translated blocks
    Blocks(Vec<TextBlock>),
}

/// Result of a text translation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResult {
    /// Content type the input was interpreted as
    #[serde(default)]
    pub content_type: Option<String>,
    /// Source language, detected when not supplied
    pub source_language: String,
    /// The translated content
    pub translation: Translation,
    /// Memories the translation was adapted to
    #[serde(default)]
    pub adapted_to: Option<Vec<String>>,
    /// Glossaries applied
    #[serde(default)]
    pub glossaries: Option<Vec<String>>,
    /// Memory matches, present only for verbose requests
    #[serde(default)]
    pub adapted_to_matches: Option<Value>,
    /// Glossary matches, present only for verbose requests
    #[serde(default)]
    pub glossaries_matches: Option<Value>,
}

/// Translation register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStyle {
    /// Stay close to the source
    Faithful,
    /// Favor natural target-language phrasing
    Fluid,
    /// Allow free rephrasing
    Creative,
}

/// Request scheduling class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Interactive latency
    Normal,
    /// Batch latency
    Background,
}

/// Server-side result cache behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve cached results when available
    Enabled,
    /// Bypass the cache entirely
    Disabled,
    /// Recompute and overwrite any cached result
    Overwrite,
}

impl Serialize for CachePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CachePolicy::Enabled => serializer.serialize_bool(true),
            CachePolicy::Disabled => serializer.serialize_bool(false),
            CachePolicy::Overwrite => serializer.serialize_str("overwrite"),
        }
    }
}

/// Options for text translation
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Hint for source-language detection
    pub source_hint: Option<String>,
    /// Memories to adapt the translation to
    pub adapt_to: Option<Vec<String>>,
    /// Free-form instructions for the engine
    pub instructions: Option<Vec<String>>,
    /// Glossaries to enforce
    pub glossaries: Option<Vec<String>>,
    /// How to interpret the input (for example `text/xml`)
    pub content_type: Option<String>,
    /// Whether input may span multiple lines; the server default is on
    pub multiline: Option<bool>,
    /// Server-side translation timeout
    pub timeout_in_millis: Option<u64>,
    /// Scheduling class
    pub priority: Option<Priority>,
    /// Result cache behavior
    pub use_cache: Option<CachePolicy>,
    /// Cache entry lifetime in seconds
    pub cache_ttl_seconds: Option<u64>,
    /// Ask the service not to record the request content
    pub no_trace: bool,
    /// Include match details in the result
    pub verbose: Option<bool>,
    /// Extra headers for this call
    pub headers: Option<HashMap<String, String>>,
    /// Translation register
    pub style: Option<TranslationStyle>,
}

/// Options for document upload
#[derive(Debug, Clone, Default)]
pub struct DocumentUploadOptions {
    /// Memories to adapt the translation to
    pub adapt_to: Option<Vec<String>>,
    /// Glossaries to enforce
    pub glossaries: Option<Vec<String>>,
    /// Translation register
    pub style: Option<TranslationStyle>,
    /// Password for protected documents
    pub password: Option<String>,
    /// Extraction engine parameters, camel-cased; snakeized before sending
    pub extraction_params: Option<Value>,
    /// Ask the service not to record the document content
    pub no_trace: bool,
}

/// Options for document download
#[derive(Debug, Clone, Default)]
pub struct DocumentDownloadOptions {
    /// Requested output format, original format when absent
    pub output_format: Option<String>,
}

/// Options for the translate-and-wait convenience method
#[derive(Debug, Clone, Default)]
pub struct DocumentTranslateOptions {
    /// Memories to adapt the translation to
    pub adapt_to: Option<Vec<String>>,
    /// Glossaries to enforce
    pub glossaries: Option<Vec<String>>,
    /// Translation register
    pub style: Option<TranslationStyle>,
    /// Password for protected documents
    pub password: Option<String>,
    /// Extraction engine parameters, camel-cased; snakeized before sending
    pub extraction_params: Option<Value>,
    /// Ask the service not to record the document content
    pub no_trace: bool,
    /// Requested output format, original format when absent
    pub output_format: Option<String>,
}

/// One memory entry for content updates.
///
/// When a TUID is supplied, operations address that exact entry; without
/// one, matching falls back to content.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// Source language
    pub source: String,
    /// Target language
    pub target: String,
    /// Source sentence
    pub sentence: String,
    /// Target sentence
    pub translation: String,
    /// Translation-unit identifier
    pub tuid: Option<String>,
    /// Sentence preceding the pair in the original text
    pub sentence_before: Option<String>,
    /// Sentence following the pair in the original text
    pub sentence_after: Option<String>,
}

impl TranslationUnit {
    /// Create an entry matching by content
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        sentence: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            sentence: sentence.into(),
            translation: translation.into(),
            tuid: None,
            sentence_before: None,
            sentence_after: None,
        }
    }

    /// Address an exact entry by TUID
    pub fn with_tuid(mut self, tuid: impl Into<String>) -> Self {
        self.tuid = Some(tuid.into());
        self
    }

    /// Attach the surrounding sentences for context-aware matching
    pub fn with_context(
        mut self,
        sentence_before: impl Into<String>,
        sentence_after: impl Into<String>,
    ) -> Self {
        self.sentence_before = Some(sentence_before.into());
        self.sentence_after = Some(sentence_after.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_memory_deserializes_from_normalized_payload() {
        let memory: Memory = serde_json::from_value(json!({
            "id": "mem_1",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-02-01T10:30:00.500Z",
            "sharedAt": "2024-02-01T10:30:00.500Z",
            "name": "My memory",
            "ownerId": "user_1",
            "collaboratorsCount": 3
        }))
        .unwrap();

        assert_eq!(memory.id, "mem_1");
        assert_eq!(memory.external_id, None);
        assert_eq!(memory.collaborators_count, 3);
        assert_eq!(memory.created_at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_document_status_wire_values() {
        let document: Document = serde_json::from_value(json!({
            "id": "doc_1",
            "status": "translating",
            "target": "fr-FR",
            "filename": "report.docx",
            "translatedChars": 120,
            "totalChars": 480
        }))
        .unwrap();

        assert_eq!(document.status, DocumentStatus::Translating);
        assert_eq!(document.source, None);
        assert_eq!(document.translated_chars, Some(120));
    }

    #[test]
    fn test_translation_shape_follows_the_query() {
        let single: Translation = serde_json::from_value(json!("Bonjour")).unwrap();
        assert_eq!(single, Translation::Text("Bonjour".to_string()));

        let multiple: Translation = serde_json::from_value(json!(["Un", "Deux"])).unwrap();
        assert_eq!(
            multiple,
            Translation::Multiple(vec!["Un".to_string(), "Deux".to_string()])
        );

        let blocks: Translation =
            serde_json::from_value(json!([{"text": "Oui", "translatable": true}])).unwrap();
        assert_eq!(
            blocks,
            Translation::Blocks(vec![TextBlock {
                text: "Oui".to_string(),
                translatable: true
            }])
        );
    }

    #[test]
    fn test_cache_policy_wire_values() {
        assert_eq!(serde_json::to_value(CachePolicy::Enabled).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(CachePolicy::Disabled).unwrap(),
            json!(false)
        );
        assert_eq!(
            serde_json::to_value(CachePolicy::Overwrite).unwrap(),
            json!("overwrite")
        );
    }

    #[test]
    fn test_translation_unit_builder() {
        let unit = TranslationUnit::new("en-US", "fr-FR", "Hello", "Bonjour")
            .with_tuid("tu-42")
            .with_context("Before.", "After.");

        assert_eq!(unit.tuid.as_deref(), Some("tu-42"));
        assert_eq!(unit.sentence_before.as_deref(), Some("Before."));
        assert_eq!(unit.sentence_after.as_deref(), Some("After."));
    }

    #[test]
    fn test_import_job_status() {
        let import: MemoryImport = serde_json::from_value(json!({
            "id": "imp_1",
            "progress": 0.25
        }))
        .unwrap();

        assert_eq!(JobStatus::id(&import), "imp_1");
        assert_eq!(JobStatus::progress(&import), 0.25);
    }
}
