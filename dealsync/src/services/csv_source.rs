//! Local deal source backed by a CSV export, optionally gzip-compressed

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::core::FieldMapping;
use crate::error::{SyncError, SyncResult};
use crate::traits::LocalDealSource;
use crate::types::{FieldDiagnostic, LocalDataset};

/// Reads deals from a delimited file on local disk
#[derive(Debug, Clone)]
pub struct CsvDealSource {
    path: PathBuf,
    mapping: FieldMapping,
    has_headers: bool,
}

impl CsvDealSource {
    /// Create a source that skips the first row as a header
    pub fn new(path: impl Into<PathBuf>, mapping: FieldMapping) -> Self {
        Self {
            path: path.into(),
            mapping,
            has_headers: true,
        }
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_gzip(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
    }

    /// Blocking read of the whole file
    pub fn read_dataset(&self) -> SyncResult<LocalDataset> {
        let file = File::open(&self.path).map_err(|e| SyncError::ingestion(&self.path, e.to_string()))?;

        let input: Box<dyn Read> = if self.is_gzip() {
            // Concatenated exports carry one gzip member per chunk
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(input);

        let mut dataset = LocalDataset::default();
        for (row, record) in reader.byte_records().enumerate() {
            let record = record.map_err(|e| SyncError::ingestion(&self.path, e.to_string()))?;

            let mut fields = Vec::with_capacity(record.len());
            for (column, raw) in record.iter().enumerate() {
                let text = String::from_utf8_lossy(raw);
                if let (Cow::Owned(replaced), Some(field)) = (&text, self.mapping.field_for_column(column)) {
                    dataset.diagnostics.push(FieldDiagnostic {
                        row,
                        field,
                        raw: Some(replaced.clone()),
                        reason: "invalid UTF-8 replaced".to_string(),
                    });
                }
                fields.push(text);
            }

            let (deal, diagnostics) = self.mapping.normalize_row(row, &fields);
            dataset.deals.push(deal);
            dataset.diagnostics.extend(diagnostics);
        }

        debug!(
            "Read {} deal(s) from {} ({} defaulted field(s))",
            dataset.deals.len(),
            self.path.display(),
            dataset.diagnostics.len()
        );
        Ok(dataset)
    }
}

#[async_trait]
impl LocalDealSource for CsvDealSource {
    async fn load_deals(&self) -> SyncResult<LocalDataset> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.read_dataset()).await?
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}
