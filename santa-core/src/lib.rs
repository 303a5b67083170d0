//! Santa Certificates - Personalised HTML Certificate Generator
//!
//! # The Pipeline
//! 1. Assets load once (template text, two images as data URIs)
//! 2. Templates are contracts: exactly the known slots, nothing else
//! 3. Records are validated before anything is substituted
//! 4. Rendering is pure and deterministic
//! 5. Nothing is written unless the whole batch renders (default policy)

pub mod assets;
pub mod config;
pub mod error;
pub mod hashing;
pub mod pipeline;
pub mod records;
pub mod templates;
pub mod validation;

pub use assets::{CertificateAssets, EncodedAsset, ImageFormat};
pub use config::{FailurePolicy, RunConfig};
pub use error::{Result, SantaError};
pub use hashing::sha256_hex;
pub use pipeline::{render_certificate, BatchReport, CertificateBatch, CertificateRenderer, RenderedDocument, WrittenDocument};
pub use records::{builtin_records, load_records, ChildRecord};
pub use templates::{Slot, Template, TemplateError};
pub use validation::{ValidationRule, ValidationViolation, Validator};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
