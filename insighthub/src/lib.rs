// Core library for the InsightHub research paper assistant.
// The interactive surface lives in the ../cli crate.

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod extract;
pub mod gateway;
pub mod index;
pub mod models;
pub mod store;

pub use auth::{AuthOutcome, AuthProvider, MockAuthProvider, User};
pub use config::Config;
pub use controller::{AppController, AppView, SearchOutcome, UploadRequest};
pub use error::{InsightError, Result};
pub use export::{Report, ReportExporter, TextReportExporter};
pub use extract::{ExtractedPdf, PdfExtractor, PdfTextExtractor};
pub use gateway::AiGateway;
pub use index::SearchIndex;
pub use models::*;
pub use store::{DocumentStore, FileStore, KeyValueStore, MemoryStore};
