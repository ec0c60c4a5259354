//! # staffing-documents
//!
//! Everything that turns a teaching contract into files.
//!
//! ## Features
//!
//! - Blob storage (local filesystem, in-memory) with a stable per-contract key layout
//! - Signature image intake with content sniffing
//! - Escaping `{{token}}` templates for the English and Khmer pages
//! - Khmer numeral transliteration and riel conversion
//! - PDF engines (headless Chromium, recording engine for tests)
//!
//! ## Example
//!
//! ```rust,ignore
//! use staffing_documents::{DocumentRenderer, TemplateSet, ChromiumEngine, render_with_timeout};
//!
//! let renderer = DocumentRenderer::new(TemplateSet::load("templates").await?);
//! let html = renderer.render_html(&document)?;
//! let pdf = render_with_timeout(engine, html, Duration::from_secs(30)).await?;
//! ```

pub mod engine;
pub mod figures;
pub mod khmer;
pub mod renderer;
pub mod storage;
pub mod template;
pub mod upload;

pub use engine::{render_with_timeout, ChromiumEngine, EngineError, PdfEngine, RecordingEngine};
pub use figures::{group_thousands, ContractFigures};
pub use renderer::{ContractDocument, DocumentRenderer};
pub use storage::{
    contract_prefix, document_key, sha256_hex, signature_key, FileMetadata, LocalStorage,
    MemoryStorage, Storage, StorageError, StorageResult,
};
pub use template::{TemplateError, TemplateSet, TemplateValue, TemplateValues};
pub use upload::{ImageKind, SignatureImage, SignaturePolicy, UploadError};
