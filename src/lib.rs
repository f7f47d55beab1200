//! Lara Translate - Rust client for the Lara translation API
//!
//! This library provides asynchronous access to text translation, translation
//! memories, glossaries, and document translation, with request signing and
//! response normalization handled transparently.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod translator;
pub mod utils;

// Re-export key types for convenience
pub use crate::core::{
    credentials::Credentials,
    errors::{LaraError, Result},
    transport::FileInput,
};

pub use crate::translator::{
    models::{
        CachePolicy, Document, DocumentDownloadOptions, DocumentStatus,
        DocumentTranslateOptions, DocumentUploadOptions, Glossary, GlossaryCounts,
        GlossaryImport, Memory, MemoryImport, Priority, TextBlock, TextResult,
        TranslateOptions, TranslateQuery, Translation, TranslationStyle, TranslationUnit,
    },
    Documents, Glossaries, Memories, Translator, TranslatorOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
