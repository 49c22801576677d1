//! Document sinks: a directory writer and an in-memory capture

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::render::{to_html, Document};
use crate::traits::{DeliveredDocument, DocumentSink, SinkResult};
use crate::types::SinkError;

/// Writes the HTML rendering of each document into a directory.
///
/// The suggested name keeps its stem; the extension becomes `.html`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a suggested file name
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string());
        self.output_dir.join(format!("{}.html", stem))
    }
}

#[async_trait]
impl DocumentSink for DirectorySink {
    async fn deliver(&self, document: &Document, file_name: &str) -> SinkResult<DeliveredDocument> {
        let path = self.target_path(file_name);
        let html = to_html(document);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| SinkError::Write {
                path: self.output_dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, html.as_bytes())
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;

        info!(?path, bytes = html.len(), "Document written");
        Ok(DeliveredDocument {
            file_name: file_name.to_string(),
            location: Some(path),
            bytes: html.len(),
        })
    }
}

/// Captures deliveries in memory. With no target it refuses every delivery.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    delivered: Arc<Mutex<Vec<(String, Document)>>>,
    unavailable: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that behaves like a device without any share target
    pub fn unavailable() -> Self {
        Self {
            delivered: Arc::default(),
            unavailable: true,
        }
    }

    /// File names delivered so far, in order
    pub fn file_names(&self) -> Vec<String> {
        self.delivered
            .lock()
            .map(|items| items.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.delivered
            .lock()
            .map(|items| items.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn deliver(&self, document: &Document, file_name: &str) -> SinkResult<DeliveredDocument> {
        if self.unavailable {
            return Err(SinkError::NoTarget);
        }

        let bytes = to_html(document).len();
        self.delivered
            .lock()
            .map_err(|_| SinkError::NoTarget)?
            .push((file_name.to_string(), document.clone()));

        Ok(DeliveredDocument {
            file_name: file_name.to_string(),
            location: None,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DocumentKind;

    fn doc() -> Document {
        Document::new(DocumentKind::GstReport, "GST Tax Liability", "GST_Report_MARCH_2024.pdf")
    }

    #[test]
    fn test_target_path_swaps_extension() {
        let sink = DirectorySink::new("/tmp/out");
        assert_eq!(
            sink.target_path("Invoice__INV-2024-03-15-001.pdf"),
            PathBuf::from("/tmp/out/Invoice__INV-2024-03-15-001.html")
        );
        assert_eq!(sink.target_path(""), PathBuf::from("/tmp/out/document.html"));
    }

    #[tokio::test]
    async fn test_directory_sink_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("docs"));

        let delivered = sink.deliver(&doc(), "GST_Report_MARCH_2024.pdf").await.unwrap();
        let path = delivered.location.unwrap();
        assert_eq!(path, dir.path().join("docs").join("GST_Report_MARCH_2024.html"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<title>GST Tax Liability</title>"));
        assert_eq!(written.len(), delivered.bytes);
    }

    #[tokio::test]
    async fn test_directory_sink_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let sink = DirectorySink::new(&blocker);
        let result = sink.deliver(&doc(), "x.pdf").await;
        assert!(matches!(result, Err(SinkError::Write { .. })));
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.deliver(&doc(), "a.pdf").await.unwrap();
        assert_eq!(sink.file_names(), vec!["a.pdf".to_string()]);

        let offline = MemorySink::unavailable();
        assert!(matches!(
            offline.deliver(&doc(), "a.pdf").await,
            Err(SinkError::NoTarget)
        ));
    }
}
