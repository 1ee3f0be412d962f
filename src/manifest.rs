use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;
use chrono::{DateTime, Utc};

use crate::processor::Generation;

/// Metadata for the generated manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Version of the manifest format
    pub version: String,

    /// Timestamp when the manifest was generated
    pub generated_at: DateTime<Utc>,

    /// Number of documents processed
    pub files_processed: usize,

    /// Number of documents that received a stylesheet
    pub documents_styled: usize,

    /// Tool version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

/// Per-document report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Distinct arbitrary-value classes found
    pub tokens_extracted: usize,

    /// Rules written into the stylesheet
    pub rules_emitted: usize,

    /// Bucket keys in emission order (`all` or a breakpoint sort key)
    pub bucket_keys: Vec<String>,

    /// Size of the generated stylesheet in bytes
    pub css_size_bytes: usize,

    /// Where the document was written, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

/// Totals across every document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestTotals {
    pub tokens_extracted: usize,
    pub rules_emitted: usize,
    pub css_size_bytes: usize,

    /// Processing time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
}

/// Complete manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the run
    pub metadata: ManifestMetadata,

    /// Document path to report, in processing order
    pub documents: IndexMap<String, DocumentReport>,

    /// Totals across all documents
    pub totals: ManifestTotals,
}

impl Manifest {
    /// Create a new manifest with default metadata
    pub fn new() -> Self {
        Self {
            metadata: ManifestMetadata {
                version: "1.0.0".to_string(),
                generated_at: Utc::now(),
                files_processed: 0,
                documents_styled: 0,
                tool_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            documents: IndexMap::new(),
            totals: ManifestTotals::default(),
        }
    }

    /// Record the outcome for one document
    pub fn add_document(
        &mut self,
        path: String,
        generation: Option<&Generation>,
        output_path: Option<String>,
    ) {
        let report = match generation {
            Some(generation) => DocumentReport {
                tokens_extracted: generation.tokens_extracted,
                rules_emitted: generation.rules_emitted,
                bucket_keys: generation.bucket_keys.clone(),
                css_size_bytes: generation.css.len(),
                output_path,
            },
            None => DocumentReport {
                tokens_extracted: 0,
                rules_emitted: 0,
                bucket_keys: Vec::new(),
                css_size_bytes: 0,
                output_path,
            },
        };

        self.documents.insert(path, report);
    }

    /// Recompute metadata counts and totals from the document reports
    pub fn calculate_totals(&mut self, processing_time_ms: Option<u64>) {
        let mut totals = ManifestTotals {
            processing_time_ms,
            ..ManifestTotals::default()
        };

        for report in self.documents.values() {
            totals.tokens_extracted += report.tokens_extracted;
            totals.rules_emitted += report.rules_emitted;
            totals.css_size_bytes += report.css_size_bytes;
        }

        self.metadata.documents_styled = self
            .documents
            .values()
            .filter(|report| report.rules_emitted > 0)
            .count();
        self.totals = totals;
    }

    /// Convert manifest to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Convert manifest to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for creating manifests
pub struct ManifestBuilder {
    manifest: Manifest,
    start_time: Option<std::time::Instant>,
}

impl ManifestBuilder {
    /// Create a new manifest builder
    pub fn new() -> Self {
        Self {
            manifest: Manifest::new(),
            start_time: Some(std::time::Instant::now()),
        }
    }

    /// Set the number of files processed
    pub fn with_files_processed(mut self, count: usize) -> Self {
        self.manifest.metadata.files_processed = count;
        self
    }

    /// Add a document outcome
    pub fn with_document(
        mut self,
        path: String,
        generation: Option<&Generation>,
        output_path: Option<String>,
    ) -> Self {
        self.manifest.add_document(path, generation, output_path);
        self
    }

    /// Build the final manifest with totals
    pub fn build(mut self) -> Manifest {
        let processing_time = self.start_time.map(|t| t.elapsed().as_millis() as u64);
        self.manifest.calculate_totals(processing_time);
        self.manifest
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation(rules: usize, css: &str) -> Generation {
        Generation {
            tokens_extracted: rules + 1,
            rules_emitted: rules,
            bucket_keys: vec!["991".to_string(), "all".to_string()],
            css: css.to_string(),
        }
    }

    #[test]
    fn test_manifest_creation() {
        let manifest = Manifest::new();
        assert_eq!(manifest.metadata.version, "1.0.0");
        assert_eq!(manifest.documents.len(), 0);
        assert_eq!(manifest.metadata.documents_styled, 0);
    }

    #[test]
    fn test_manifest_builder() {
        let styled = generation(2, "abcd");
        let manifest = ManifestBuilder::new()
            .with_files_processed(2)
            .with_document(
                "site/index.html".to_string(),
                Some(&styled),
                Some("out/index.html".to_string()),
            )
            .with_document("site/plain.html".to_string(), None, None)
            .build();

        assert_eq!(manifest.metadata.files_processed, 2);
        assert_eq!(manifest.metadata.documents_styled, 1);
        assert_eq!(manifest.totals.rules_emitted, 2);
        assert_eq!(manifest.totals.tokens_extracted, 3);
        assert_eq!(manifest.totals.css_size_bytes, 4);
        assert!(manifest.totals.processing_time_ms.is_some());

        let report = &manifest.documents["site/index.html"];
        assert_eq!(report.bucket_keys, vec!["991", "all"]);
        assert_eq!(report.output_path.as_deref(), Some("out/index.html"));
        assert_eq!(manifest.documents["site/plain.html"].rules_emitted, 0);
    }

    #[test]
    fn test_json_serialization() {
        let manifest = ManifestBuilder::new()
            .with_document("a.html".to_string(), None, None)
            .build();
        let json = manifest.to_json();

        assert!(json["metadata"].is_object());
        assert_eq!(json["metadata"]["version"], "1.0.0");
        assert!(json["documents"]["a.html"].is_object());
        assert!(json["documents"]["a.html"].get("output_path").is_none());

        let text = manifest.to_pretty_json().unwrap();
        let parsed: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.documents.len(), 1);
    }
}
