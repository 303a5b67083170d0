//! Certificate Pipeline - Render Then Write
//!
//! CRITICAL: render_certificate validates the template contract and the record
//! before substituting anything. A failed render produces no document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::assets::CertificateAssets;
use crate::config::{FailurePolicy, RunConfig};
use crate::error::{Result, SantaError};
use crate::hashing::sha256_hex;
use crate::records::ChildRecord;
use crate::templates::{Segment, Slot};
use crate::validation::Validator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub filename: String,
    pub content: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WrittenDocument {
    pub filename: String,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: usize,
}

/// Renders records against one set of loaded assets.
pub struct CertificateRenderer<'a> {
    assets: &'a CertificateAssets,
    validator: Validator,
    tree_uri: String,
    seal_uri: String,
}

impl<'a> CertificateRenderer<'a> {
    pub fn new(assets: &'a CertificateAssets) -> Self {
        Self {
            assets,
            validator: Validator::new(),
            tree_uri: assets.tree.data_uri(),
            seal_uri: assets.seal.data_uri(),
        }
    }

    /// Pure: the same assets and record always give the same document.
    pub fn render(&self, record: &ChildRecord) -> Result<RenderedDocument> {
        let template = &self.assets.template;
        template.check_contract()?;
        self.validator.validate(record)?;

        let mut content = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => content.push_str(text),
                Segment::Known(slot) => content.push_str(self.value(*slot, record)?),
                // check_contract rejects these above
                Segment::Unknown(name) => {
                    return Err(SantaError::UnknownSlots { slots: vec![name.clone()] })
                }
            }
        }

        let sha256 = sha256_hex(content.as_bytes());
        debug!(record = record.label(), %sha256, "rendered certificate");
        Ok(RenderedDocument {
            filename: record.filename.clone(),
            content,
            sha256,
        })
    }

    fn value<'r>(&'r self, slot: Slot, record: &'r ChildRecord) -> Result<&'r str> {
        match slot {
            Slot::TreeImage => Ok(self.tree_uri.as_str()),
            Slot::SealImage => Ok(self.seal_uri.as_str()),
            _ => record.field(slot).ok_or_else(|| SantaError::MissingFields {
                record: record.label().to_string(),
                fields: vec![slot.key().to_string()],
            }),
        }
    }
}

/// Render a single record.
pub fn render_certificate(assets: &CertificateAssets, record: &ChildRecord) -> Result<RenderedDocument> {
    CertificateRenderer::new(assets).render(record)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<WrittenDocument>,
    pub failures: Vec<SantaError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<WrittenDocument>> {
        if self.failures.is_empty() {
            Ok(self.written)
        } else {
            Err(SantaError::Batch {
                total: self.written.len() + self.failures.len(),
                failures: self.failures,
            })
        }
    }
}

/// One run: loaded assets, an output directory and a failure policy.
pub struct CertificateBatch {
    assets: CertificateAssets,
    output_dir: PathBuf,
    policy: FailurePolicy,
}

impl CertificateBatch {
    pub fn new(assets: CertificateAssets, output_dir: impl Into<PathBuf>, policy: FailurePolicy) -> Self {
        Self {
            assets,
            output_dir: output_dir.into(),
            policy,
        }
    }

    /// Load the assets named by the config. Fails before any rendering.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let assets = CertificateAssets::load(&config.template, &config.tree_image, &config.seal_image)?;
        Ok(Self::new(assets, &config.output_dir, config.failure_policy))
    }

    pub fn assets(&self) -> &CertificateAssets {
        &self.assets
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every record in memory, stopping at the first failure.
    /// Output filenames must be unique within the batch.
    pub fn check(&self, records: &[ChildRecord]) -> Result<Vec<RenderedDocument>> {
        let renderer = CertificateRenderer::new(&self.assets);
        let mut claimed = HashSet::new();
        records
            .iter()
            .map(|record| {
                let document = renderer.render(record)?;
                claim_filename(&mut claimed, record)?;
                Ok(document)
            })
            .collect()
    }

    pub fn run(&self, records: &[ChildRecord]) -> Result<BatchReport> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SantaError::CreateOutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        match self.policy {
            FailurePolicy::Abort => {
                let documents = self.check(records)?;
                let mut report = BatchReport::default();
                for document in &documents {
                    match self.write(document) {
                        Ok(written) => report.written.push(written),
                        Err(e) => {
                            self.remove_written(&report.written);
                            return Err(e);
                        }
                    }
                }
                Ok(report)
            }
            FailurePolicy::Continue => {
                let renderer = CertificateRenderer::new(&self.assets);
                let mut claimed = HashSet::new();
                let mut report = BatchReport::default();
                for record in records {
                    let outcome = renderer.render(record).and_then(|doc| {
                        claim_filename(&mut claimed, record)?;
                        self.write(&doc)
                    });
                    match outcome {
                        Ok(written) => report.written.push(written),
                        Err(e) => {
                            warn!(record = record.label(), error = %e, "certificate skipped");
                            report.failures.push(e);
                        }
                    }
                }
                Ok(report)
            }
        }
    }

    /// Abort leaves no output behind, even when a later write fails.
    fn remove_written(&self, written: &[WrittenDocument]) {
        for doc in written {
            match fs::remove_file(&doc.path) {
                Ok(()) => debug!(path = %doc.path.display(), "removed partial output"),
                Err(e) => warn!(path = %doc.path.display(), error = %e, "could not remove partial output"),
            }
        }
    }

    fn write(&self, document: &RenderedDocument) -> Result<WrittenDocument> {
        let path = self.output_dir.join(&document.filename);
        fs::write(&path, &document.content).map_err(|e| SantaError::io(&path, e))?;
        info!(path = %path.display(), "wrote certificate");

        Ok(WrittenDocument {
            filename: document.filename.clone(),
            path,
            sha256: document.sha256.clone(),
            bytes: document.content.len(),
        })
    }
}

fn claim_filename(claimed: &mut HashSet<String>, record: &ChildRecord) -> Result<()> {
    if claimed.insert(record.filename.clone()) {
        Ok(())
    } else {
        Err(SantaError::DuplicateFilename {
            record: record.label().to_string(),
            filename: record.filename.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{EncodedAsset, ImageFormat};
    use crate::templates::Template;

    const TEMPLATE: &str = "<title>{{name}}</title><h1>{{ name }}</h1>\
        <div>{{message}}</div><b>{{gift}}</b><i>{{gift_note}}</i>\
        <img src=\"{{tree_image}}\"><img src=\"{{seal_image}}\">";

    fn assets(template: &str) -> CertificateAssets {
        CertificateAssets {
            template: Template::parse(template).unwrap(),
            tree: EncodedAsset::encode(ImageFormat::Png, b"tree"),
            seal: EncodedAsset::encode(ImageFormat::Jpeg, b"seal"),
        }
    }

    fn record() -> ChildRecord {
        ChildRecord::new("Lia", "<p>Ho <b>ho</b> & ho</p>", "R3,500", "For you", "lia.html")
    }

    #[test]
    fn test_substitutes_every_occurrence_verbatim() {
        let doc = render_certificate(&assets(TEMPLATE), &record()).unwrap();
        assert_eq!(
            doc.content,
            "<title>Lia</title><h1>Lia</h1><div><p>Ho <b>ho</b> & ho</p></div>\
             <b>R3,500</b><i>For you</i>\
             <img src=\"data:image/png;base64,dHJlZQ==\"><img src=\"data:image/jpeg;base64,c2VhbA==\">"
        );
        assert_eq!(doc.filename, "lia.html");
    }

    #[test]
    fn test_render_is_deterministic() {
        let assets = assets(TEMPLATE);
        let a = render_certificate(&assets, &record()).unwrap();
        let b = render_certificate(&assets, &record()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sha256, sha256_hex(a.content.as_bytes()));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut r = record();
        r.gift_note = Some("{{name}} {{unknown}}".into());
        let doc = render_certificate(&assets(TEMPLATE), &r).unwrap();
        assert!(doc.content.contains("<i>{{name}} {{unknown}}</i>"));
    }

    #[test]
    fn test_missing_field_fails_before_substitution() {
        let mut r = record();
        r.gift_note = None;
        let err = render_certificate(&assets(TEMPLATE), &r).unwrap_err();
        assert!(err.to_string().contains("gift_note"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let template = format!("{TEMPLATE}{{{{year}}}}");
        let err = render_certificate(&assets(&template), &record()).unwrap_err();
        assert!(matches!(err, SantaError::UnknownSlots { ref slots } if slots == &vec!["year".to_string()]));
    }

    #[test]
    fn test_template_without_images_breaks_contract() {
        let err = render_certificate(&assets("{{name}}{{message}}{{gift}}{{gift_note}}"), &record()).unwrap_err();
        assert!(matches!(err, SantaError::MissingSlots { .. }));
        assert!(err.to_string().contains("tree_image, seal_image"));
    }

    #[test]
    fn test_report_into_result() {
        let report = BatchReport {
            written: vec![],
            failures: vec![SantaError::MissingFields {
                record: "B".into(),
                fields: vec!["gift_note".into()],
            }],
        };
        assert!(!report.is_success());
        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 of 1 certificates failed");
        assert!(err.is_validation());
    }
}
